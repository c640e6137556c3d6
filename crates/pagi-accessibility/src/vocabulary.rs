//! Spoken phrases for host on/off state, chosen by variable-name pattern.
//!
//! Whether `true` means "on" or "off" depends on how a game names its variables (lever
//! flags are stored inverted, door flags are not). The mapping lives in this table so it
//! can be corrected in config per game instead of in code.

use serde::{Deserialize, Serialize};

/// One pattern and the phrases for each boolean value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRule {
    /// Case-insensitive substring of the variable name.
    pub pattern: String,
    pub when_true: String,
    pub when_false: String,
}

impl StateRule {
    pub fn new(
        pattern: impl Into<String>,
        when_true: impl Into<String>,
        when_false: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            when_true: when_true.into(),
            when_false: when_false.into(),
        }
    }

    fn matches(&self, lowered_name: &str) -> bool {
        !self.pattern.is_empty() && lowered_name.contains(&self.pattern.to_lowercase())
    }

    fn phrase(&self, value: bool) -> &str {
        if value {
            &self.when_true
        } else {
            &self.when_false
        }
    }
}

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateVocabulary {
    #[serde(default)]
    pub rules: Vec<StateRule>,
    /// Phrases for names that match no rule. `None` means stay silent.
    #[serde(default)]
    pub fallback: Option<StateRule>,
}

impl Default for StateVocabulary {
    fn default() -> Self {
        Self {
            rules: vec![
                StateRule::new("lever", "off (red)", "on (green)"),
                StateRule::new("open", "open (unlocked)", "locked (closed)"),
                StateRule::new("cage", "open (unlocked)", "locked (closed)"),
            ],
            fallback: Some(StateRule::new("", "on (green)", "off (red)")),
        }
    }
}

impl StateVocabulary {
    /// An empty table that never produces a phrase.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            fallback: None,
        }
    }

    pub fn with_rule(mut self, rule: StateRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Phrase for a boolean state variable.
    pub fn describe(&self, variable_name: &str, value: bool) -> Option<&str> {
        let lowered = variable_name.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.matches(&lowered))
            .or(self.fallback.as_ref())
            .map(|r| r.phrase(value))
    }

    /// Phrase for an integer state variable; any positive level counts as `true`.
    pub fn describe_level(&self, variable_name: &str, level: i64) -> Option<&str> {
        self.describe(variable_name, level > 0)
    }
}
