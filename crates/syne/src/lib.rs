// syne library exports

pub mod api;
pub mod article;
pub mod config;
pub mod format;
pub mod notice;
pub mod reader;
pub mod router;
pub mod seed;
pub mod storage;
pub mod store;
pub mod text_width;
pub mod theme;

pub use api::{ApiClient, ApiError, ArticleApi};
pub use article::{Article, PaginationParams, PaginationResult};
pub use config::Config;
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use reader::Reader;
pub use router::Route;
pub use store::ArticleStore;
pub use theme::{ThemeColor, ThemeMode, ThemeStore};
