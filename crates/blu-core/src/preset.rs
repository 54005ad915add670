//! Preset Engine
//!
//! Each preset is a total assignment over all six modules. Applying one
//! replaces the module state outright; nothing from the previous state
//! survives. Telemetry and analytics are on in every preset.

use crate::error::Result;
use crate::modules::{ModuleFlags, ModuleState};
use crate::prefs::Preferences;
use crate::types::Preset;

const ALWAYS_ON: ModuleFlags = ModuleFlags::TELEMETRY.union(ModuleFlags::ANALYTICS);

impl Preset {
    /// The module state this preset assigns.
    pub const fn modules(self) -> ModuleState {
        let flags = match self {
            Self::Base => ALWAYS_ON,
            Self::Normal => ALWAYS_ON.union(ModuleFlags::BLOAT).union(ModuleFlags::STICKERS),
            Self::Strict => ALWAYS_ON
                .union(ModuleFlags::BLOAT)
                .union(ModuleFlags::STICKERS)
                .union(ModuleFlags::TYPING),
            Self::Titanium => ModuleFlags::all(),
        };
        ModuleState::from_flags(flags)
    }
}

/// Resolve a preset id and return the preferences it produces.
///
/// Mode and modules are replaced; only the power flag carries over from
/// `current`. An unknown id is an error and produces no new state.
pub fn apply_preset(id: &str, current: Preferences) -> Result<Preferences> {
    let preset: Preset = id.parse()?;
    Ok(Preferences {
        mode: preset,
        modules: preset.modules(),
        ..current
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Category;

    #[test]
    fn test_preset_table() {
        let expect = |p: Preset, on: &[Category]| {
            let state = p.modules();
            for c in Category::ALL {
                assert_eq!(state.is_enabled(c), on.contains(&c), "{p} / {c}");
            }
        };
        use Category::*;
        expect(Preset::Base, &[Telemetry, Analytics]);
        expect(Preset::Normal, &[Telemetry, Analytics, Bloat, Sticker]);
        expect(Preset::Strict, &[Telemetry, Analytics, Bloat, Sticker, Typing]);
        expect(Preset::Titanium, &Category::ALL);
    }

    #[test]
    fn test_tracking_always_on() {
        for preset in Preset::ALL {
            let state = preset.modules();
            assert!(state.is_enabled(Category::Telemetry));
            assert!(state.is_enabled(Category::Analytics));
        }
    }

    #[test]
    fn test_presets_overwrite_without_residue() {
        let titanium = apply_preset("titanium", Preferences::default()).unwrap();
        assert_eq!(titanium.mode, Preset::Titanium);
        assert_eq!(titanium.modules, ModuleState::all());

        let base = apply_preset("base", titanium).unwrap();
        assert_eq!(base.mode, Preset::Base);
        assert_eq!(
            base.modules.enabled().collect::<Vec<_>>(),
            vec![Category::Telemetry, Category::Analytics]
        );
    }

    #[test]
    fn test_power_flag_carries_over() {
        let off = Preferences {
            enabled: false,
            ..Preferences::default()
        };
        assert!(!apply_preset("strict", off).unwrap().enabled);
    }

    #[test]
    fn test_unknown_preset_errors() {
        let err = apply_preset("ultra", Preferences::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownPreset(ref id) if id == "ultra"));
    }
}
