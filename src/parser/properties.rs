//! MSBuild property table and `$(Var)` expansion.

use std::collections::HashMap;

/// Properties visible while evaluating one project for one pair.
///
/// Names are case-insensitive. Lookups fall back to the process
/// environment, and unknown names expand to the empty string.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: HashMap<String, String>,
    use_environment: bool,
}

impl Properties {
    /// An empty table that does not consult the environment.
    pub fn new() -> Self {
        Properties::default()
    }

    /// An empty table that falls back to environment variables.
    pub fn with_environment() -> Self {
        Properties {
            values: HashMap::new(),
            use_environment: true,
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        if let Some(value) = self.values.get(&name.to_ascii_lowercase()) {
            return Some(value.clone());
        }
        if self.use_environment {
            return std::env::var(name).ok();
        }
        None
    }

    /// Replace every `$(Name)` in `raw`.
    pub fn expand(&self, raw: &str) -> String {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'(') {
                chars.next();
                let name: String = chars.by_ref().take_while(|&ch| ch != ')').collect();
                if let Some(value) = self.get(name.trim()) {
                    result.push_str(&value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }
}
