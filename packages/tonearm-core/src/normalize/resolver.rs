//! Ordered fallback resolution over loosely-typed JSON.
//!
//! A [`Resolver`] holds a list of extraction strategies. Each strategy
//! returns an optional string; the first non-blank result wins. This
//! replaces deep conditional field access with a flat, testable list.

use serde_json::Value;

/// A single extraction attempt.
pub type Strategy = fn(&Value) -> Option<String>;

/// First-non-empty-wins chain of [`Strategy`] functions.
#[derive(Clone, Default)]
pub struct Resolver {
    strategies: Vec<Strategy>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a strategy to the end of the chain.
    #[must_use]
    pub fn then(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Runs the chain and returns the first non-blank value, trimmed.
    pub fn resolve(&self, subject: &Value) -> Option<String> {
        self.strategies.iter().find_map(|strategy| non_blank(strategy(subject)))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Field Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Follows `path` through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

/// Reads a string (or a number rendered as a string) at `path`.
pub fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    match lookup(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Concatenates `runs[].text` at `path`.
///
/// Returns `None` when there are no runs or every run is textless.
pub fn runs_text(value: &Value, path: &[&str]) -> Option<String> {
    let runs = lookup(value, path)?.get("runs")?.as_array()?;
    let joined: String = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();
    (!joined.is_empty()).then_some(joined)
}

/// Reads a `{ "simpleText": ... }` node at `path`.
pub fn simple_text(value: &Value, path: &[&str]) -> Option<String> {
    text_at(lookup(value, path)?, &["simpleText"])
}
