//! Activity Log: bounded, most-recent-first record of blocked requests.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Category;
use crate::url::{truncate_for_log, MAX_LOGGED_URL_LEN};

/// Maximum number of events kept.
pub const MAX_LOG_ENTRIES: usize = 200;

/// One suppressed request. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEvent {
    time: DateTime<Utc>,
    #[serde(rename = "type")]
    category: Category,
    url: String,
}

impl BlockEvent {
    /// The URL is stored as given, cut to [`MAX_LOGGED_URL_LEN`] bytes.
    pub fn new(time: DateTime<Utc>, category: Category, url: &str) -> Self {
        Self {
            time,
            category,
            url: truncate_for_log(url, MAX_LOGGED_URL_LEN).to_string(),
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Newest-first ring of [`BlockEvent`]s, never longer than its capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<BlockEvent>", into = "Vec<BlockEvent>")]
pub struct ActivityLog {
    events: VecDeque<BlockEvent>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOG_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Build from a newest-first list, dropping anything past the capacity.
    pub fn from_events(events: Vec<BlockEvent>) -> Self {
        let mut log = Self::new();
        log.events.extend(events.into_iter().take(log.capacity));
        log
    }

    /// Insert at the front and evict the oldest entry past capacity.
    pub fn record(&mut self, event: BlockEvent) {
        self.events.push_front(event);
        if self.events.len() > self.capacity {
            self.events.pop_back();
        }
    }

    /// Read-only view, newest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &BlockEvent> + '_ {
        self.events.iter()
    }

    /// Owned copy for reporting, newest first.
    pub fn snapshot(&self) -> Vec<BlockEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&BlockEvent> {
        self.events.front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<BlockEvent>> for ActivityLog {
    fn from(events: Vec<BlockEvent>) -> Self {
        Self::from_events(events)
    }
}

impl From<ActivityLog> for Vec<BlockEvent> {
    fn from(log: ActivityLog) -> Self {
        log.events.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(n: usize) -> BlockEvent {
        BlockEvent::new(Utc::now(), Category::Bloat, &format!("https://x.com/store/{n}"))
    }

    #[test]
    fn test_newest_first() {
        let mut log = ActivityLog::new();
        log.record(event(1));
        log.record(event(2));
        assert_eq!(log.latest().unwrap().url(), "https://x.com/store/2");
        let urls: Vec<_> = log.iter().map(|e| e.url().to_string()).collect();
        assert_eq!(urls, vec!["https://x.com/store/2", "https://x.com/store/1"]);
    }

    #[test]
    fn test_bounded_at_capacity() {
        let mut log = ActivityLog::new();
        for n in 1..=201 {
            log.record(event(n));
        }
        assert_eq!(log.len(), MAX_LOG_ENTRIES);
        assert_eq!(log.latest().unwrap().url(), "https://x.com/store/201");
        // event 1 was the oldest and is gone, event 2 is now the tail
        assert!(log.iter().all(|e| e.url() != "https://x.com/store/1"));
        assert_eq!(log.iter().last().unwrap().url(), "https://x.com/store/2");
    }

    #[test]
    fn test_long_url_truncated() {
        let url = format!("https://x.com/track/{}", "a".repeat(2000));
        let e = BlockEvent::new(Utc::now(), Category::Telemetry, &url);
        assert_eq!(e.url().len(), MAX_LOGGED_URL_LEN);
    }

    #[test]
    fn test_serialized_shape() {
        let mut log = ActivityLog::new();
        log.record(event(7));
        let value = serde_json::to_value(&log).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["type"], "Bloat");
        assert_eq!(first["url"], "https://x.com/store/7");
        assert!(first["time"].is_string());
    }

    #[test]
    fn test_oversized_persisted_log_is_trimmed() {
        let events: Vec<_> = (0..250).map(event).collect();
        let value = serde_json::to_value(&events).unwrap();
        let log: ActivityLog = serde_json::from_value(value).unwrap();
        assert_eq!(log.len(), MAX_LOG_ENTRIES);
        assert_eq!(log.latest().unwrap().url(), "https://x.com/store/0");
    }
}
