//! Module State: one enable flag per category.

use serde::{Deserialize, Serialize};

use crate::types::Category;

bitflags::bitflags! {
    /// Enabled-module bit set, one bit per category.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModuleFlags: u8 {
        const TELEMETRY = 1 << 0;
        const ANALYTICS = 1 << 1;
        const BLOAT = 1 << 2;
        const STICKERS = 1 << 3;
        const TYPING = 1 << 4;
        const EMBEDS = 1 << 5;
    }
}

impl From<Category> for ModuleFlags {
    fn from(category: Category) -> Self {
        match category {
            Category::Telemetry => Self::TELEMETRY,
            Category::Analytics => Self::ANALYTICS,
            Category::Bloat => Self::BLOAT,
            Category::Sticker => Self::STICKERS,
            Category::Typing => Self::TYPING,
            Category::Embed => Self::EMBEDS,
        }
    }
}

/// Which categories are currently suppressed.
///
/// Serialized as an object with all six module keys. Every key is required:
/// a persisted value missing any of them fails to deserialize, so the caller
/// replaces it wholesale instead of merging a partial set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ModuleRepr", into = "ModuleRepr")]
pub struct ModuleState {
    flags: ModuleFlags,
}

impl ModuleState {
    /// Every module off.
    pub const fn none() -> Self {
        Self { flags: ModuleFlags::empty() }
    }

    /// Every module on.
    pub const fn all() -> Self {
        Self { flags: ModuleFlags::all() }
    }

    pub const fn from_flags(flags: ModuleFlags) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> ModuleFlags {
        self.flags
    }

    #[inline]
    pub fn is_enabled(&self, category: Category) -> bool {
        self.flags.contains(ModuleFlags::from(category))
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        self.flags.set(ModuleFlags::from(category), enabled);
    }

    /// Copy with one module changed.
    #[must_use]
    pub fn with(mut self, category: Category, enabled: bool) -> Self {
        self.set(category, enabled);
        self
    }

    /// Enabled categories in priority order.
    pub fn enabled(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.is_enabled(*c))
    }
}

impl Default for ModuleState {
    /// First-run defaults: everything except typing and embeds.
    fn default() -> Self {
        Self::from_flags(
            ModuleFlags::TELEMETRY | ModuleFlags::ANALYTICS | ModuleFlags::BLOAT | ModuleFlags::STICKERS,
        )
    }
}

#[derive(Serialize, Deserialize)]
struct ModuleRepr {
    telemetry: bool,
    analytics: bool,
    bloat: bool,
    typing: bool,
    embeds: bool,
    stickers: bool,
}

impl From<ModuleRepr> for ModuleState {
    fn from(repr: ModuleRepr) -> Self {
        let mut flags = ModuleFlags::empty();
        flags.set(ModuleFlags::TELEMETRY, repr.telemetry);
        flags.set(ModuleFlags::ANALYTICS, repr.analytics);
        flags.set(ModuleFlags::BLOAT, repr.bloat);
        flags.set(ModuleFlags::TYPING, repr.typing);
        flags.set(ModuleFlags::EMBEDS, repr.embeds);
        flags.set(ModuleFlags::STICKERS, repr.stickers);
        Self { flags }
    }
}

impl From<ModuleState> for ModuleRepr {
    fn from(state: ModuleState) -> Self {
        Self {
            telemetry: state.is_enabled(Category::Telemetry),
            analytics: state.is_enabled(Category::Analytics),
            bloat: state.is_enabled(Category::Bloat),
            typing: state.is_enabled(Category::Typing),
            embeds: state.is_enabled(Category::Embed),
            stickers: state.is_enabled(Category::Sticker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = ModuleState::default();
        assert!(state.is_enabled(Category::Telemetry));
        assert!(state.is_enabled(Category::Analytics));
        assert!(state.is_enabled(Category::Bloat));
        assert!(state.is_enabled(Category::Sticker));
        assert!(!state.is_enabled(Category::Typing));
        assert!(!state.is_enabled(Category::Embed));
    }

    #[test]
    fn test_toggle() {
        let mut state = ModuleState::none();
        state.set(Category::Typing, true);
        assert!(state.is_enabled(Category::Typing));
        state.set(Category::Typing, false);
        assert_eq!(state, ModuleState::none());
    }

    #[test]
    fn test_enabled_in_priority_order() {
        let state = ModuleState::none()
            .with(Category::Embed, true)
            .with(Category::Telemetry, true);
        let enabled: Vec<_> = state.enabled().collect();
        assert_eq!(enabled, vec![Category::Telemetry, Category::Embed]);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(ModuleState::default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "telemetry": true,
                "analytics": true,
                "bloat": true,
                "typing": false,
                "embeds": false,
                "stickers": true
            })
        );
    }

    #[test]
    fn test_missing_module_key_is_rejected() {
        let partial = serde_json::json!({ "telemetry": true, "analytics": false });
        assert!(serde_json::from_value::<ModuleState>(partial).is_err());
    }
}
