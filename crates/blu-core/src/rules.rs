//! Rule Table: category to URL substring triggers.
//!
//! The table is declarative and ordered. Rule order is classification
//! priority, so a URL containing both "track" and "sticker" is Telemetry.
//! Triggers are plain lower-case substrings; this is a heuristic and will
//! over-match (any URL containing "library" is Bloat).

use crate::types::Category;

/// Triggers for one category.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub category: Category,
    pub triggers: &'static [&'static str],
}

/// Immutable, ordered rule set.
#[derive(Debug, Clone, Copy)]
pub struct RuleTable {
    rules: &'static [Rule],
}

/// Built-in rules, one per category, in priority order.
pub static DEFAULT_RULES: RuleTable = RuleTable::new(&[
    Rule {
        category: Category::Telemetry,
        triggers: &["/science", "track", "metrics", "tracing", "experiments"],
    },
    Rule {
        category: Category::Analytics,
        triggers: &["analytics", "sentry", "crash", "reporting"],
    },
    Rule {
        category: Category::Bloat,
        triggers: &[
            "billing",
            "premium",
            "payment",
            "promotion",
            "gift",
            "store",
            "quests",
            "inventory",
            "family-center",
            "activities",
            "pomelo",
            "library",
        ],
    },
    Rule {
        category: Category::Sticker,
        triggers: &["sticker", "pack", "sticker-packs"],
    },
    Rule {
        category: Category::Typing,
        triggers: &["typing"],
    },
    Rule {
        category: Category::Embed,
        triggers: &["embed", "preview", "og"],
    },
]);

impl RuleTable {
    pub const fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Triggers for a category, empty if the table has no rule for it.
    pub fn triggers(&self, category: Category) -> &'static [&'static str] {
        self.rules
            .iter()
            .find(|rule| rule.category == category)
            .map(|rule| rule.triggers)
            .unwrap_or(&[])
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        DEFAULT_RULES
    }
}

impl Rule {
    /// First trigger contained in an already lower-cased URL.
    #[inline]
    pub fn find_trigger(&self, normalized_url: &str) -> Option<&'static str> {
        self.triggers
            .iter()
            .copied()
            .find(|trigger| normalized_url.contains(trigger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_follow_priority_order() {
        let order: Vec<_> = DEFAULT_RULES.rules().iter().map(|r| r.category).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_triggers_are_lower_case() {
        for rule in DEFAULT_RULES.rules() {
            for trigger in rule.triggers {
                assert_eq!(*trigger, trigger.to_lowercase(), "trigger {trigger:?} is not lower-case");
                assert!(!trigger.is_empty());
            }
        }
    }

    #[test]
    fn test_find_trigger() {
        let bloat = DEFAULT_RULES.rules()[2];
        assert_eq!(bloat.find_trigger("https://x.com/store/gift"), Some("gift"));
        assert_eq!(bloat.find_trigger("https://x.com/messages/42"), None);
    }

    #[test]
    fn test_triggers_lookup() {
        assert_eq!(DEFAULT_RULES.triggers(Category::Typing), &["typing"]);
    }
}
