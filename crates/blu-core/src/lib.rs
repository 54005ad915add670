//! BluBlock Core Library
//!
//! This crate provides the request classification and interception engine
//! for BluBlock. It sits in front of an application's outbound requests,
//! classifies each URL against a fixed rule table, and either suppresses
//! the request or lets it through, keeping running stats and a bounded
//! activity log.
//!
//! # Architecture
//!
//! Outbound call → [`Interceptor`] → [`Classifier`] (rule table + module
//! state). On a match the [`Engine`] updates [`Stats`] and the
//! [`ActivityLog`], persists, and the interceptor returns a synthetic empty
//! success. Otherwise the original call is forwarded unchanged.
//!
//! Host collaborators (persistence, network primitives, notifications) are
//! injected; nothing is looked up from global state.
//!
//! # Modules
//!
//! - `types`: Category and Preset
//! - `rules`: the rule table
//! - `modules`: per-category enable flags
//! - `prefs`: persisted preferences
//! - `classifier`: first-match-wins URL classification
//! - `preset`: preset definitions and application
//! - `activity`: bounded block event log
//! - `stats`: aggregate counters
//! - `store`: persistence boundary
//! - `notify`: notification boundary
//! - `engine`: global state, mutators and the request path
//! - `interceptor`: fetch and open/send adapters
//! - `url`: URL normalization helpers

pub mod activity;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod interceptor;
pub mod modules;
pub mod notify;
pub mod prefs;
pub mod preset;
pub mod rules;
pub mod stats;
pub mod store;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use activity::{ActivityLog, BlockEvent, MAX_LOG_ENTRIES};
pub use classifier::{Classifier, RuleMatch};
pub use engine::{Dashboard, Engine, EngineBuilder, EngineHandle, Verdict};
pub use error::{Error, Result};
pub use interceptor::{
    EmptyResponse, FetchRequest, FetchTransport, InterceptedXhr, Interceptor, RequestDescriptor, XhrTransport,
};
pub use modules::ModuleState;
pub use notify::{LogNotifier, NoticeLevel, Notifier};
pub use prefs::Preferences;
pub use preset::apply_preset;
pub use rules::{Rule, RuleTable, DEFAULT_RULES};
pub use stats::Stats;
pub use store::{MemoryStore, Store, StoreError};
pub use types::{Category, Preset};
