//! Access-code gating.
//!
//! [`AccessCodes`] maps short numeric codes to greetings and checks a code
//! as a pure lookup. [`Session`] holds the result: the first accepted code
//! authorizes the session for its whole lifetime. There is no lockout; a
//! rejected code can be retried any number of times.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Outcome of checking one code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// The code matched; carries its greeting.
    Granted(String),
    /// Non-empty input that matched nothing.
    Rejected,
    /// Nothing entered yet.
    Empty,
}

/// Table of valid codes, all the same length and all ASCII digits.
#[derive(Debug, Clone, Default)]
pub struct AccessCodes {
    codes: HashMap<String, String>,
}

impl AccessCodes {
    /// Build a table from `(code, greeting)` pairs.
    pub fn from_pairs<I, C, G>(pairs: I) -> Result<Self, ConvertError>
    where
        I: IntoIterator<Item = (C, G)>,
        C: Into<String>,
        G: Into<String>,
    {
        let mut codes = HashMap::new();
        let mut width: Option<usize> = None;

        for (code, greeting) in pairs {
            let code = code.into();
            if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ConvertError::InvalidConfig(format!(
                    "Access code '{code}' must be numeric"
                )));
            }
            match width {
                Some(w) if w != code.len() => {
                    return Err(ConvertError::InvalidConfig(format!(
                        "Access codes must all be {w} digits, got '{code}'"
                    )));
                }
                _ => width = Some(code.len()),
            }
            codes.insert(code, greeting.into());
        }

        Ok(Self { codes })
    }

    /// Load a JSON object of `"code": "greeting"` pairs.
    pub fn from_json_file(path: &Path) -> Result<Self, ConvertError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::InvalidConfig(format!(
                "Cannot read access codes from {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConvertError> {
        let map: HashMap<String, String> = serde_json::from_str(text)
            .map_err(|e| ConvertError::InvalidConfig(format!("Invalid access code table: {e}")))?;
        Self::from_pairs(map)
    }

    /// Look `code` up. Surrounding whitespace is ignored.
    pub fn check(&self, code: &str) -> AuthResult {
        let code = code.trim();
        if code.is_empty() {
            return AuthResult::Empty;
        }
        match self.codes.get(code) {
            Some(greeting) => AuthResult::Granted(greeting.clone()),
            None => AuthResult::Rejected,
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// A granted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub greeting: String,
}

/// Per-session authorization state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    grant: Option<AccessGrant>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `code` and record the first grant.
    ///
    /// Once authorized, later calls return the original grant without
    /// consulting the table, whatever they are passed.
    pub fn authorize(&mut self, codes: &AccessCodes, code: &str) -> AuthResult {
        if let Some(grant) = &self.grant {
            return AuthResult::Granted(grant.greeting.clone());
        }
        let result = codes.check(code);
        if let AuthResult::Granted(greeting) = &result {
            self.grant = Some(AccessGrant {
                greeting: greeting.clone(),
            });
        }
        result
    }

    pub fn is_authorized(&self) -> bool {
        self.grant.is_some()
    }

    pub fn grant(&self) -> Option<&AccessGrant> {
        self.grant.as_ref()
    }
}
