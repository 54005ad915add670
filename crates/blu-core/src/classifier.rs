//! Classifier
//!
//! This is the hot path - every intercepted request goes through here.
//! Classification is pure: it never touches stats or the activity log.

use crate::prefs::Preferences;
use crate::rules::{RuleTable, DEFAULT_RULES};
use crate::types::Category;
use crate::url::normalize;

/// A positive classification and the trigger that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub category: Category,
    pub trigger: &'static str,
}

// =============================================================================
// Classifier
// =============================================================================

/// First-match-wins evaluation of a [`RuleTable`] against a URL.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    table: RuleTable,
}

impl Classifier {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Category of the first enabled rule with a trigger in `url`.
    ///
    /// Returns `None` without evaluating any rule when the engine is
    /// switched off or the URL is missing or empty.
    #[inline]
    pub fn classify(&self, url: Option<&str>, prefs: &Preferences) -> Option<Category> {
        self.explain(url, prefs).map(|m| m.category)
    }

    /// Like [`Classifier::classify`], also reporting the trigger that fired.
    pub fn explain(&self, url: Option<&str>, prefs: &Preferences) -> Option<RuleMatch> {
        if !prefs.enabled {
            return None;
        }
        let url = url.filter(|u| !u.is_empty())?;
        self.explain_normalized(&normalize(url), prefs)
    }

    /// Evaluate an already lower-cased URL.
    pub fn explain_normalized(&self, normalized_url: &str, prefs: &Preferences) -> Option<RuleMatch> {
        if !prefs.enabled {
            return None;
        }
        self.table
            .rules()
            .iter()
            .filter(|rule| prefs.is_module_enabled(rule.category))
            .find_map(|rule| {
                rule.find_trigger(normalized_url).map(|trigger| RuleMatch {
                    category: rule.category,
                    trigger,
                })
            })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES)
    }
}
