use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use thiserror::Error;

use crate::config::{StoreSection, WikiConfig};
use crate::filesystem::{display_path, ensure_parent_dir, logical_page_path, normalize_pathbuf};
use crate::markup::{self, MarkupError, MarkupOptions};
use crate::rewrite;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("submitted markup rejected: {0}")]
    InvalidMarkup(#[source] MarkupError),
    #[error("i/o failure on {}: {source}", display_path(.path))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot open {}: {source}", display_path(.path))]
    Forbidden {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug)]
pub struct PageStore {
    root: PathBuf,
    settings: StoreSection,
    markup: MarkupOptions,
    lock: RwLock<()>,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, &WikiConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: &WikiConfig) -> Self {
        Self {
            root: normalize_pathbuf(&root.into()),
            settings: config.store.clone(),
            markup: config.markup_options(),
            lock: RwLock::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &StoreSection {
        &self.settings
    }

    pub fn header_path(&self) -> PathBuf {
        self.root.join(&self.settings.header)
    }

    pub fn footer_path(&self) -> PathBuf {
        self.root.join(&self.settings.footer)
    }

    /// Maps a request path to its page file without touching the filesystem.
    pub fn resolve_path(&self, request_path: &str) -> PathBuf {
        let prefix = self.settings.url_prefix.as_str();
        let logical = match request_path.strip_prefix(prefix) {
            Some(rest) => rest,
            None if request_path == prefix.trim_end_matches('/') => "",
            None => request_path,
        };
        let mut relative = logical_page_path(logical);
        if relative.as_os_str().is_empty() {
            relative = PathBuf::from(&self.settings.index_page);
        }
        let mut file_name = relative.into_os_string();
        file_name.push(&self.settings.suffix);
        self.root.join(file_name)
    }

    /// Maps a request path to its page file and makes sure the parent
    /// directory exists.
    pub fn resolve(&self, request_path: &str) -> Result<PathBuf, StoreError> {
        let file_path = self.resolve_path(request_path);
        ensure_parent_dir(&file_path).map_err(|source| StoreError::io(&file_path, source))?;
        log::debug!("resolved {request_path} to {}", file_path.display());
        Ok(file_path)
    }

    /// Normalizes `body` and, if it is well formed, replaces the page at
    /// `file_path` with it. Rejected bodies leave the page untouched.
    pub fn write<R: BufRead>(&self, file_path: &Path, body: R) -> Result<(), StoreError> {
        let mut normalized = Vec::new();
        if let Err(err) = markup::normalize(body, &mut normalized, self.markup) {
            log::warn!("rejected write to {}: {err}", file_path.display());
            return Err(StoreError::InvalidMarkup(err));
        }
        let content = rewrite::apply_rewrites(&normalized);

        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!("writing {} bytes to {}", content.len(), file_path.display());
        if self.settings.atomic_writes {
            replace_file(file_path, &content)
        } else {
            overwrite_file(file_path, &content)
        }
    }

    /// Opens the page at `file_path` together with the header and footer.
    ///
    /// The returned view keeps the shared lock until it is dropped, so copy it
    /// out before releasing it. A missing page is not an error; any other
    /// failure to open it is [`StoreError::Forbidden`].
    pub fn read(&self, file_path: &Path) -> Result<PageView<'_>, StoreError> {
        let guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        log::debug!("reading {}", file_path.display());
        let content = match File::open(file_path) {
            Ok(file) => Some(file),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                log::warn!("cannot open {}: {source}", file_path.display());
                return Err(StoreError::Forbidden {
                    path: file_path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(PageView {
            _guard: guard,
            header: open_segment(&self.header_path()),
            content,
            footer: open_segment(&self.footer_path()),
        })
    }
}

/// Header, page content and footer of one read, held under the shared lock.
pub struct PageView<'a> {
    _guard: RwLockReadGuard<'a, ()>,
    header: Option<File>,
    content: Option<File>,
    footer: Option<File>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSegments {
    pub header: Vec<u8>,
    pub content: Option<Vec<u8>>,
    pub footer: Vec<u8>,
}

impl PageSegments {
    pub fn compose(&self) -> Vec<u8> {
        let content = self.content.as_deref().unwrap_or_default();
        let mut out = Vec::with_capacity(self.header.len() + content.len() + self.footer.len());
        out.extend_from_slice(&self.header);
        out.extend_from_slice(content);
        out.extend_from_slice(&self.footer);
        out
    }
}

impl PageView<'_> {
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Streams header, content and footer into `out`, then releases the lock.
    pub fn write_to<W: Write + ?Sized>(mut self, out: &mut W) -> io::Result<u64> {
        let mut written = 0;
        for segment in [&mut self.header, &mut self.content, &mut self.footer]
            .into_iter()
            .flatten()
        {
            written += io::copy(segment, out)?;
        }
        out.flush()?;
        Ok(written)
    }

    pub fn into_segments(mut self) -> io::Result<PageSegments> {
        Ok(PageSegments {
            header: read_segment(self.header.as_mut())?,
            content: self.content.as_mut().map(read_all).transpose()?,
            footer: read_segment(self.footer.as_mut())?,
        })
    }
}

fn open_segment(path: &Path) -> Option<File> {
    match File::open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            if err.kind() != io::ErrorKind::NotFound {
                log::warn!("serving without {}: {err}", path.display());
            }
            None
        }
    }
}

fn read_segment(file: Option<&mut File>) -> io::Result<Vec<u8>> {
    file.map(read_all).transpose().map(Option::unwrap_or_default)
}

fn read_all(file: &mut File) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    io::Read::read_to_end(file, &mut bytes)?;
    Ok(bytes)
}

fn overwrite_file(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let mut file = File::create(path).map_err(|source| StoreError::io(path, source))?;
    file.write_all(content)
        .map_err(|source| StoreError::io(path, source))?;
    file.sync_all()
        .map_err(|source| StoreError::io(path, source))?;
    Ok(())
}

fn replace_file(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{file_name}.tmp"));
    if let Err(err) = overwrite_file(&staging, content) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    fs::rename(&staging, path).map_err(|source| {
        let _ = fs::remove_file(&staging);
        StoreError::io(path, source)
    })
}
