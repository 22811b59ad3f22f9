pub mod config;
pub mod filesystem;
pub mod handler;
pub mod markup;
pub mod rewrite;
pub mod runtime;
pub mod store;

pub use handler::{Method, Request, Response, Status};
pub use markup::{MarkupError, MarkupOptions};
pub use store::{PageSegments, PageStore, PageView, StoreError};
