//! Transient user-facing notices.
//!
//! At most one notice is visible. Showing a new one replaces the current
//! one, and each notice auto-dismisses after [`NOTICE_TTL`].

use std::time::Duration;

pub const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub fn css_class(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: Level,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), level: Level::Info }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), level: Level::Success }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), level: Level::Error }
    }
}

/// Holds the visible notice. Ids only grow, so a stale dismiss timer can
/// never clear a newer notice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeBoard {
    current: Option<(u64, Notice)>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn show(&mut self, notice: Notice) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some((id, notice));
        id
    }

    /// Clear the notice if `id` is still the one on display.
    pub fn expire(&mut self, id: u64) -> bool {
        match self.current {
            Some((current, _)) if current == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref().map(|(_, notice)| notice)
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current.as_ref().map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_notice_replaces_current() {
        let mut board = NoticeBoard::default();
        board.show(Notice::info("Placing bet..."));
        board.show(Notice::error("Failed to place bet: reverted"));

        let current = board.current().unwrap();
        assert_eq!(current.level, Level::Error);
        assert_eq!(current.message, "Failed to place bet: reverted");
    }

    #[test]
    fn test_stale_expiry_keeps_newer_notice() {
        let mut board = NoticeBoard::default();
        let first = board.show(Notice::info("Creating market..."));
        let second = board.show(Notice::success("Market created successfully"));

        assert!(!board.expire(first));
        assert_eq!(board.current_id(), Some(second));

        assert!(board.expire(second));
        assert!(board.current().is_none());
    }
}
