//! Transient user-facing notifications.
//!
//! Views push a notice for every outcome the operator should see; the
//! front end (the CLI here) drains and renders them.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        match &self.detail {
            Some(detail) => write!(f, "[{tag}] {}: {detail}", self.title),
            None => write!(f, "[{tag}] {}", self.title),
        }
    }
}

#[derive(Debug, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    pub fn success(&mut self, title: impl Into<String>) {
        let title = title.into();
        info!(notice = %title, "success");
        self.pending.push(Notice {
            level: NoticeLevel::Success,
            title,
            detail: None,
        });
    }

    pub fn warning(&mut self, title: impl Into<String>) {
        let title = title.into();
        warn!(notice = %title, "rejected before send");
        self.pending.push(Notice {
            level: NoticeLevel::Warning,
            title,
            detail: None,
        });
    }

    pub fn error(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        let title = title.into();
        let detail = detail.into();
        warn!(notice = %title, error = %detail, "operation failed");
        self.pending.push(Notice {
            level: NoticeLevel::Error,
            title,
            detail: Some(detail),
        });
    }

    pub fn pending(&self) -> &[Notice] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }
}
