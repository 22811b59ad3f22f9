use crate::store::{PageStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Read,
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub method: Method,
    pub body: Vec<u8>,
}

impl Request {
    pub fn read(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Read,
            body: Vec::new(),
        }
    }

    pub fn write(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            method: Method::Write,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    InvalidInput,
    Forbidden,
    InternalError,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::InvalidInput => "invalid-input",
            Self::Forbidden => "forbidden",
            Self::InternalError => "internal-error",
        }
    }

    pub fn http_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::InvalidInput => 406,
            Self::Forbidden => 403,
            Self::InternalError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub body: Vec<u8>,
}

impl Response {
    fn ok(body: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            body,
        }
    }
}

impl From<StoreError> for Response {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidMarkup(_) => Self {
                status: Status::InvalidInput,
                body: Vec::new(),
            },
            StoreError::Forbidden { .. } => Self {
                status: Status::Forbidden,
                body: Vec::new(),
            },
            StoreError::Io { .. } => Self {
                status: Status::InternalError,
                body: err.to_string().into_bytes(),
            },
        }
    }
}

impl PageStore {
    pub fn handle(&self, request: &Request) -> Response {
        match request.method {
            Method::Read => self.handle_read(&request.path),
            Method::Write => self.handle_write(&request.path, &request.body),
        }
    }

    fn handle_write(&self, request_path: &str, body: &[u8]) -> Response {
        let result = self
            .resolve(request_path)
            .and_then(|file_path| self.write(&file_path, body));
        match result {
            Ok(()) => Response::ok(Vec::new()),
            Err(err) => err.into(),
        }
    }

    fn handle_read(&self, request_path: &str) -> Response {
        let file_path = if self.settings().create_dirs_on_read {
            match self.resolve(request_path) {
                Ok(file_path) => file_path,
                Err(err) => {
                    log::warn!("continuing read of {request_path}: {err}");
                    self.resolve_path(request_path)
                }
            }
        } else {
            self.resolve_path(request_path)
        };

        let view = match self.read(&file_path) {
            Ok(view) => view,
            Err(err) => return err.into(),
        };
        let mut body = Vec::new();
        match view.write_to(&mut body) {
            Ok(_) => Response::ok(body),
            Err(source) => StoreError::Io {
                path: file_path,
                source,
            }
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{Request, Response, Status};
    use crate::config::WikiConfig;
    use crate::store::PageStore;

    #[test]
    fn status_codes_match_http_semantics() {
        assert_eq!(Status::Ok.http_code(), 200);
        assert_eq!(Status::InvalidInput.http_code(), 406);
        assert_eq!(Status::Forbidden.http_code(), 403);
        assert_eq!(Status::InternalError.http_code(), 500);
        assert_eq!(Status::InvalidInput.as_str(), "invalid-input");
    }

    #[test]
    fn write_then_read_composes_page() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("header.html"), "<header/>").expect("header");
        fs::write(temp.path().join("footer.html"), "<footer/>").expect("footer");
        let store = PageStore::new(temp.path());

        let written = store.handle(&Request::write("/wiki/Notes/Today", "<p>hi<br>there</p>"));
        assert_eq!(written.status, Status::Ok);
        assert!(temp.path().join("Notes").join("Today.part").is_file());

        let read = store.handle(&Request::read("/wiki/Notes/Today"));
        assert_eq!(
            read,
            Response {
                status: Status::Ok,
                body: b"<header/><p>hi<br />there</p><footer/>".to_vec(),
            }
        );
    }

    #[test]
    fn invalid_markup_is_invalid_input() {
        let temp = tempdir().expect("tempdir");
        let store = PageStore::new(temp.path());
        let response = store.handle(&Request::write("/wiki/Bad", "<b>unterminated"));
        assert_eq!(response.status, Status::InvalidInput);
        assert!(response.body.is_empty());
        assert!(!temp.path().join("Bad.part").exists());
    }

    #[test]
    fn unopenable_page_is_forbidden() {
        let temp = tempdir().expect("tempdir");
        let store = PageStore::new(temp.path());
        fs::write(temp.path().join("Plain"), "not a directory").expect("write blocker");

        let response = store.handle(&Request::read("/wiki/Plain/Child"));
        assert_eq!(response.status, Status::Forbidden);
    }

    #[test]
    fn write_io_failure_is_internal_error_with_detail() {
        let temp = tempdir().expect("tempdir");
        let store = PageStore::new(temp.path());
        fs::write(temp.path().join("Plain"), "not a directory").expect("write blocker");

        let response = store.handle(&Request::write("/wiki/Plain/Child", "<p>x</p>"));
        assert_eq!(response.status, Status::InternalError);
        let detail = String::from_utf8(response.body).expect("utf-8 detail");
        assert!(detail.contains("i/o failure on"), "got {detail}");
    }

    #[test]
    fn read_without_directory_creation_leaves_tree_alone() {
        let temp = tempdir().expect("tempdir");
        let mut config = WikiConfig::default();
        config.store.create_dirs_on_read = false;
        let store = PageStore::with_config(temp.path(), &config);

        let response = store.handle(&Request::read("/wiki/deep/nested/page"));
        assert_eq!(response.status, Status::Ok);
        assert!(response.body.is_empty());
        assert!(!temp.path().join("deep").exists());
    }
}
