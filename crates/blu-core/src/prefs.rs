//! Persisted user preferences: power flag, current preset and module state.

use serde::{Deserialize, Serialize};

use crate::modules::ModuleState;
use crate::types::{Category, Preset};

/// The preference half of the global engine state.
///
/// `modules` carries no serde default: a persisted value without it is
/// malformed and gets replaced by [`Preferences::default`] as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub mode: Preset,
    pub enabled: bool,
    pub modules: ModuleState,
}

impl Preferences {
    #[inline]
    pub fn is_module_enabled(&self, category: Category) -> bool {
        self.modules.is_enabled(category)
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            mode: Preset::Normal,
            enabled: true,
            modules: ModuleState::default(),
        }
    }
}
