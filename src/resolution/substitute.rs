//! `${name}` template substitution.
//!
//! Names consist of letters, digits, the namespace delimiter characters,
//! `-`, `_`, `.` and `$`. The placeholder `${$}` produces a literal `$`.
//! Unresolved names become `MISSING_VAR:<name>`. Malformed placeholders are
//! copied through untouched.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::VariableHelper;
use crate::core::Value;
use crate::resolver::NAMESPACE_DELIMITER;

/// Prefix of the text inserted for names that could not be resolved.
pub const MISSING_VAR_PREFIX: &str = "MISSING_VAR:";

const ESCAPED_DOLLAR: &str = "$";

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let mut delimiter: Vec<char> = NAMESPACE_DELIMITER.chars().collect();
        delimiter.dedup();
        let delimiter: String = delimiter
            .iter()
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        Regex::new(&format!(r"\$\{{([$a-zA-Z0-9{}\-_.]+)\}}", delimiter))
            .expect("variable pattern must be a valid regex")
    })
}

/// Replaces every `${name}` in `text` with the value `helper` resolves for it.
pub fn substitute(text: &str, helper: &VariableHelper) -> String {
    variable_pattern()
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            if name == ESCAPED_DOLLAR {
                return ESCAPED_DOLLAR.to_string();
            }
            let missing = Value::String(format!("{}{}", MISSING_VAR_PREFIX, name));
            helper.resolve(name, missing).to_string()
        })
        .into_owned()
}
