//! Engine
//!
//! Owns the global engine state (preferences, stats, activity log) and is
//! the only place it is mutated. Every mutation is a single step followed
//! by a best-effort write to the store, so readers only ever see committed
//! state and a storage failure never reaches the request path.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::activity::{ActivityLog, BlockEvent};
use crate::classifier::Classifier;
use crate::error::Result;
use crate::modules::ModuleState;
use crate::notify::{LogNotifier, NoticeLevel, Notifier};
use crate::prefs::Preferences;
use crate::preset::apply_preset;
use crate::rules::DEFAULT_RULES;
use crate::stats::Stats;
use crate::store::{Store, StoreError, LOG_KEY, NAMESPACE, PREFS_KEY, STATS_KEY};
use crate::types::{Category, Preset};
use crate::url::normalize;

/// Outcome of screening one outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward the request unchanged
    Allow,
    /// Suppress the request; it was recorded under this category
    Block(Category),
}

impl Verdict {
    pub fn is_blocked(self) -> bool {
        matches!(self, Self::Block(_))
    }
}

/// Everything a dashboard needs, read in one go.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub enabled: bool,
    pub mode: Preset,
    pub modules: ModuleState,
    pub stats: Stats,
    pub log: Vec<BlockEvent>,
}

// =============================================================================
// Builder
// =============================================================================

/// Collects the engine's collaborators, then loads persisted state.
pub struct EngineBuilder {
    store: Box<dyn Store>,
    notifier: Box<dyn Notifier>,
    namespace: String,
    seed: Option<u64>,
}

impl EngineBuilder {
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Seed for the data-saved estimate. Defaults to the current time.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load persisted state (falling back to defaults) and announce start-up.
    pub fn build(self) -> Engine {
        let store = self.store;
        let namespace = self.namespace;

        let prefs: Preferences = load_or_default(store.as_ref(), &namespace, PREFS_KEY);
        let stats: Stats = load_or_default(store.as_ref(), &namespace, STATS_KEY);
        let activity: ActivityLog = load_or_default(store.as_ref(), &namespace, LOG_KEY);

        let seed = self
            .seed
            .unwrap_or_else(|| Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64);

        log::debug!(
            "Engine loaded: mode={}, enabled={}, {} log entries",
            prefs.mode,
            prefs.enabled,
            activity.len()
        );

        let engine = Engine {
            prefs,
            stats,
            log: activity,
            classifier: Classifier::new(DEFAULT_RULES),
            store,
            notifier: self.notifier,
            namespace,
            rng: SmallRng::seed_from_u64(seed),
        };
        engine.notifier.notify("BLUBLOCK ONLINE", NoticeLevel::Success);
        engine
    }
}

fn load_or_default<T: DeserializeOwned + Default>(store: &dyn Store, namespace: &str, key: &str) -> T {
    match store.load(namespace, key) {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Discarding malformed '{key}': {e}");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Failed to load '{key}', using defaults: {e}");
            T::default()
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The classification-and-interception engine.
pub struct Engine {
    prefs: Preferences,
    stats: Stats,
    log: ActivityLog,
    classifier: Classifier,
    store: Box<dyn Store>,
    notifier: Box<dyn Notifier>,
    namespace: String,
    rng: SmallRng,
}

impl Engine {
    pub fn builder(store: impl Store + 'static) -> EngineBuilder {
        EngineBuilder {
            store: Box::new(store),
            notifier: Box::new(LogNotifier),
            namespace: NAMESPACE.to_string(),
            seed: None,
        }
    }

    // -------------------------------------------------------------------------
    // Read-only accessors
    // -------------------------------------------------------------------------

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn modules(&self) -> ModuleState {
        self.prefs.modules
    }

    pub fn mode(&self) -> Preset {
        self.prefs.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.prefs.enabled
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.log
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn snapshot(&self) -> Dashboard {
        Dashboard {
            enabled: self.prefs.enabled,
            mode: self.prefs.mode,
            modules: self.prefs.modules,
            stats: self.stats,
            log: self.log.snapshot(),
        }
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Turn one module on or off. The current preset id is left as is.
    pub fn toggle(&mut self, category: Category, enabled: bool) {
        self.prefs.modules.set(category, enabled);
        log::info!("Module {} {}", category.module_key(), if enabled { "on" } else { "off" });
        self.persist(PREFS_KEY, &self.prefs);
    }

    /// Replace the module state with a preset's. Unknown ids leave state untouched.
    pub fn apply_preset(&mut self, id: &str) -> Result<Preset> {
        self.prefs = apply_preset(id, self.prefs)?;
        let preset = self.prefs.mode;
        log::info!("Preset applied: {preset}");
        self.persist(PREFS_KEY, &self.prefs);
        self.notifier.notify(
            &format!("Mode Set: {}", preset.label()),
            NoticeLevel::Info,
        );
        Ok(preset)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.prefs.enabled = enabled;
        log::info!("Blocking {}", if enabled { "enabled" } else { "disabled" });
        self.persist(PREFS_KEY, &self.prefs);
    }

    // -------------------------------------------------------------------------
    // Request path
    // -------------------------------------------------------------------------

    /// Pure classification against the current state. Records nothing.
    pub fn classify(&self, url: Option<&str>) -> Option<Category> {
        self.classifier.classify(url, &self.prefs)
    }

    /// Classify and, on a match, record the block.
    pub fn intercept(&mut self, url: Option<&str>) -> Verdict {
        if !self.prefs.enabled {
            return Verdict::Allow;
        }
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return Verdict::Allow;
        };
        let normalized = normalize(url);
        match self.classifier.explain_normalized(&normalized, &self.prefs) {
            Some(m) => {
                log::debug!("Blocked {} request (trigger '{}'): {}", m.category, m.trigger, normalized);
                self.record_block(m.category, &normalized);
                Verdict::Block(m.category)
            }
            None => Verdict::Allow,
        }
    }

    /// Update stats and the activity log for one blocked request.
    pub fn record_block(&mut self, category: Category, url: &str) -> BlockEvent {
        let event = BlockEvent::new(Utc::now(), category, url);
        self.stats.on_block(category, &mut self.rng);
        self.log.record(event.clone());
        self.persist(STATS_KEY, &self.stats);
        self.persist(LOG_KEY, &self.log);
        event
    }

    /// Write the whole state back to the store.
    pub fn save(&self) {
        self.persist(PREFS_KEY, &self.prefs);
        self.persist(STATS_KEY, &self.stats);
        self.persist(LOG_KEY, &self.log);
    }

    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_value(value)
            .map_err(StoreError::from)
            .and_then(|value| self.store.save(&self.namespace, key, &value));
        if let Err(e) = result {
            log::warn!("Failed to save '{key}': {e}");
        }
    }

    pub fn into_handle(self) -> EngineHandle {
        EngineHandle::new(self)
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Shared single-owner handle to an [`Engine`].
///
/// The host is single-threaded; the handle only guards against re-entry.
/// [`EngineHandle::screen`] treats a busy engine as "allow" instead of
/// failing the request. `read` and `update` must not be nested.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Rc<RefCell<Engine>>,
}

impl EngineHandle {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Rc::new(RefCell::new(engine)),
        }
    }

    /// Decide one request. Never fails.
    pub fn screen(&self, url: Option<&str>) -> Verdict {
        match self.inner.try_borrow_mut() {
            Ok(mut engine) => engine.intercept(url),
            Err(_) => {
                log::warn!("Engine busy, allowing request");
                Verdict::Allow
            }
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&Engine) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}
