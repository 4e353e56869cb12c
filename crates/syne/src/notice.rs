use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        }
    }

    fn default_duration(&self) -> Duration {
        match self {
            NoticeKind::Info => Duration::from_secs(3),
            NoticeKind::Success => Duration::from_secs(2),
            NoticeKind::Warning => Duration::from_secs(5),
            NoticeKind::Error => Duration::from_secs(7),
        }
    }
}

/// A transient message shown to the reader.
#[derive(Debug, Clone)]
pub struct Notice {
    pub content: String,
    pub kind: NoticeKind,
    pub created_at: Instant,
    pub auto_clear_duration: Option<Duration>,
}

impl Notice {
    pub fn new(content: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            content: content.into(),
            kind,
            created_at: Instant::now(),
            auto_clear_duration: Some(kind.default_duration()),
        }
    }

    pub fn with_duration(content: impl Into<String>, kind: NoticeKind, duration: Duration) -> Self {
        Self {
            auto_clear_duration: Some(duration),
            ..Self::new(content, kind)
        }
    }

    pub fn permanent(content: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            auto_clear_duration: None,
            ..Self::new(content, kind)
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.auto_clear_duration {
            Some(duration) => self.created_at.elapsed() >= duration,
            None => false,
        }
    }
}

/// Collects notices in arrival order. Nothing pushed here is fatal; expired
/// notices are dropped on [`NoticeBoard::prune`].
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => log::error!("{}", notice.content),
            NoticeKind::Warning => log::warn!("{}", notice.content),
            _ => log::debug!("{}: {}", notice.kind.label(), notice.content),
        }
        self.notices.push_back(notice);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notice::new(message, NoticeKind::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notice::new(message, NoticeKind::Success));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notice::new(message, NoticeKind::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notice::new(message, NoticeKind::Error));
    }

    /// Shows the user-facing text of a failed request.
    pub fn api_error(&mut self, err: &ApiError) {
        self.error(err.user_message());
    }

    pub fn prune(&mut self) {
        self.notices.retain(|notice| !notice.is_expired());
    }

    pub fn active(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|notice| !notice.is_expired())
    }

    /// Removes and returns everything, expired or not.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}
