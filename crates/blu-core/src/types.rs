//! Core type definitions for BluBlock
//!
//! Categories are the fixed classes of request the engine recognizes.
//! Their declaration order is the classification priority.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

// =============================================================================
// Category
// =============================================================================

/// A named class of request the engine can recognize and suppress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Category {
    /// Client telemetry and experiment beacons
    Telemetry = 0,
    /// Crash reporting and analytics pipelines
    Analytics = 1,
    /// Store, billing and promotional surfaces
    Bloat = 2,
    /// Sticker packs
    Sticker = 3,
    /// Typing indicators
    Typing = 4,
    /// Link embeds and previews
    Embed = 5,
}

impl Category {
    /// All categories, in classification priority order.
    pub const ALL: [Category; 6] = [
        Self::Telemetry,
        Self::Analytics,
        Self::Bloat,
        Self::Sticker,
        Self::Typing,
        Self::Embed,
    ];

    /// Human-readable label, as written to the activity log.
    pub fn label(self) -> &'static str {
        match self {
            Self::Telemetry => "Telemetry",
            Self::Analytics => "Analytics",
            Self::Bloat => "Bloat",
            Self::Sticker => "Sticker",
            Self::Typing => "Typing",
            Self::Embed => "Embed",
        }
    }

    /// Module key used in persisted preferences.
    pub fn module_key(self) -> &'static str {
        match self {
            Self::Telemetry => "telemetry",
            Self::Analytics => "analytics",
            Self::Bloat => "bloat",
            Self::Sticker => "stickers",
            Self::Typing => "typing",
            Self::Embed => "embeds",
        }
    }

    /// Whether a block in this category counts as a prevented threat.
    #[inline]
    pub fn is_threat(self) -> bool {
        matches!(self, Self::Telemetry | Self::Analytics)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Accepts either the module key (`stickers`) or the label (`Sticker`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.module_key().eq_ignore_ascii_case(needle) || c.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

// =============================================================================
// Preset
// =============================================================================

/// Named, total assignment of every module flag.
///
/// Serialized as its lower-case id; read back through [`FromStr`], so any
/// casing of a known id is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Base,
    Normal,
    Strict,
    Titanium,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Self::Base, Self::Normal, Self::Strict, Self::Titanium];

    /// Persisted identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Normal => "normal",
            Self::Strict => "strict",
            Self::Titanium => "titanium",
        }
    }

    /// Display title, as shown on the mode buttons.
    pub fn label(self) -> &'static str {
        match self {
            Self::Base => "BASE",
            Self::Normal => "NORMAL",
            Self::Strict => "STRICT",
            Self::Titanium => "TITANIUM",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Base => "Min protection. Blocks only tracking.",
            Self::Normal => "Standard. Blocks bloat & tracking.",
            Self::Strict => "Fast. Blocks typing & heavy assets.",
            Self::Titanium => "MAX SPEED. No embeds/media. Text only.",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.id())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::UnknownPreset(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_priority_order() {
        assert_eq!(Category::ALL[0], Category::Telemetry);
        assert_eq!(Category::ALL[5], Category::Embed);
        assert!(Category::Telemetry < Category::Analytics);
        assert!(Category::Sticker < Category::Typing);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("stickers".parse::<Category>().unwrap(), Category::Sticker);
        assert_eq!("Sticker".parse::<Category>().unwrap(), Category::Sticker);
        assert_eq!("EMBEDS".parse::<Category>().unwrap(), Category::Embed);
        assert!(matches!("voice".parse::<Category>(), Err(Error::UnknownCategory(_))));
    }

    #[test]
    fn test_threat_categories() {
        let threats: Vec<_> = Category::ALL.into_iter().filter(|c| c.is_threat()).collect();
        assert_eq!(threats, vec![Category::Telemetry, Category::Analytics]);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("titanium".parse::<Preset>().unwrap(), Preset::Titanium);
        assert_eq!("Strict".parse::<Preset>().unwrap(), Preset::Strict);
        assert!(matches!("ultra".parse::<Preset>(), Err(Error::UnknownPreset(id)) if id == "ultra"));
    }

    #[test]
    fn test_preset_label_is_upper_case_id() {
        for preset in Preset::ALL {
            assert_eq!(preset.label(), preset.id().to_uppercase());
        }
    }

    #[test]
    fn test_serde_shapes() {
        assert_eq!(serde_json::to_string(&Category::Sticker).unwrap(), "\"Sticker\"");
        assert_eq!(serde_json::to_string(&Preset::Titanium).unwrap(), "\"titanium\"");
        assert_eq!(serde_json::from_str::<Preset>("\"base\"").unwrap(), Preset::Base);
    }

    #[test]
    fn test_preset_deserializes_case_insensitively() {
        assert_eq!(serde_json::from_str::<Preset>("\"Normal\"").unwrap(), Preset::Normal);
        assert_eq!(serde_json::from_str::<Preset>("\" TITANIUM \"").unwrap(), Preset::Titanium);
        assert!(serde_json::from_str::<Preset>("\"ultra\"").is_err());
        assert!(serde_json::from_str::<Preset>("3").is_err());
    }
}
