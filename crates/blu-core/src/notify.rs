//! Notification sink for transient user-facing messages.

use std::fmt;

/// Severity hint for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget message sink. The engine never looks at the outcome.
pub trait Notifier {
    fn notify(&self, message: &str, level: NoticeLevel);
}

impl<F> Notifier for F
where
    F: Fn(&str, NoticeLevel),
{
    fn notify(&self, message: &str, level: NoticeLevel) {
        self(message, level)
    }
}

/// Sends notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, level: NoticeLevel) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => log::info!("{message}"),
            NoticeLevel::Warning => log::warn!("{message}"),
            NoticeLevel::Error => log::error!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closure_notifier() {
        let seen = RefCell::new(Vec::new());
        let sink = |msg: &str, level: NoticeLevel| seen.borrow_mut().push((msg.to_string(), level));
        sink.notify("hello", NoticeLevel::Success);
        assert_eq!(seen.into_inner(), vec![("hello".to_string(), NoticeLevel::Success)]);
    }
}
