//! Structural rules that flag a token without any configured term.

use crate::RedactionConfig;

/// Tokens shorter than this are never redacted by heuristics.
pub const MIN_HEURISTIC_TOKEN_CHARS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicRule {
    /// At least one letter and at least one digit.
    AlphanumericMix,
    /// At least one letter and a non-alphanumeric character that is neither
    /// the first nor the last character.
    InteriorSpecial,
    /// At least one digit and no letters.
    NumericCode,
}

impl HeuristicRule {
    /// Evaluation order.
    pub const ALL: [HeuristicRule; 3] = [
        HeuristicRule::AlphanumericMix,
        HeuristicRule::InteriorSpecial,
        HeuristicRule::NumericCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeuristicRule::AlphanumericMix => "alphanumeric",
            HeuristicRule::InteriorSpecial => "letters-special",
            HeuristicRule::NumericCode => "numeric-code",
        }
    }

    pub fn matches(&self, token: &str) -> bool {
        let has_letter = token.chars().any(char::is_alphabetic);
        let has_digit = token.chars().any(char::is_numeric);
        match self {
            HeuristicRule::AlphanumericMix => has_letter && has_digit,
            HeuristicRule::InteriorSpecial => has_letter && has_interior_special(token),
            HeuristicRule::NumericCode => has_digit && !has_letter,
        }
    }
}

impl std::fmt::Display for HeuristicRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn has_interior_special(token: &str) -> bool {
    let count = token.chars().count();
    if count < 3 {
        return false;
    }
    token
        .chars()
        .skip(1)
        .take(count - 2)
        .any(|ch| !ch.is_alphanumeric())
}

#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    rules: Vec<HeuristicRule>,
    replacement: String,
}

impl HeuristicClassifier {
    pub fn new(rules: Vec<HeuristicRule>, replacement: impl Into<String>) -> Self {
        Self {
            rules,
            replacement: replacement.into(),
        }
    }

    pub fn from_config(config: &RedactionConfig) -> Self {
        Self::new(config.enabled_rules(), config.replacement.clone())
    }

    pub fn is_enabled(&self) -> bool {
        !self.rules.is_empty()
    }

    pub fn rules(&self) -> &[HeuristicRule] {
        &self.rules
    }

    /// First enabled rule that flags `token`, if any.
    pub fn matching_rule(&self, token: &str) -> Option<HeuristicRule> {
        if token.chars().count() < MIN_HEURISTIC_TOKEN_CHARS || token == self.replacement {
            return None;
        }
        self.rules.iter().copied().find(|rule| rule.matches(token))
    }

    pub fn should_redact(&self, token: &str) -> bool {
        self.matching_rule(token).is_some()
    }
}
