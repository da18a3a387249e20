//! Search form state: the query and max-attempts inputs.

use crate::errors::InputError;

/// Longest query the server accepts.
pub const MAX_QUERY_CHARS: usize = 500;
pub const MIN_ATTEMPTS: u8 = 1;
pub const MAX_ATTEMPTS: u8 = 5;
/// Used when the max-attempts input is left blank.
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

/// Key presses delivered while focus is in the query input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Backspace,
}

/// Raw values of the search inputs, read on demand at submission time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchForm {
    query: String,
    max_attempts: String,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS.to_string(),
        }
    }
}

impl SearchForm {
    pub fn new(query: impl Into<String>, max_attempts: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_attempts: max_attempts.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_attempts(&self) -> &str {
        &self.max_attempts
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_max_attempts(&mut self, value: impl Into<String>) {
        self.max_attempts = value.into();
    }

    /// Applies a text-editing key to the query input. Returns `true` for Enter.
    pub fn type_key(&mut self, key: Key) -> bool {
        match key {
            Key::Enter => true,
            Key::Char(c) => {
                self.query.push(c);
                false
            }
            Key::Backspace => {
                self.query.pop();
                false
            }
        }
    }

    /// Validates the inputs into a request. The query is sent as typed.
    pub fn validate(&self) -> Result<SearchRequest, InputError> {
        if self.query.trim().is_empty() {
            return Err(InputError::EmptyQuery);
        }
        if self.query.chars().count() > MAX_QUERY_CHARS {
            return Err(InputError::QueryTooLong {
                max: MAX_QUERY_CHARS,
            });
        }
        let raw = self.max_attempts.trim();
        let max_attempts = if raw.is_empty() {
            DEFAULT_MAX_ATTEMPTS
        } else {
            raw.parse::<u8>()
                .ok()
                .filter(|n| (MIN_ATTEMPTS..=MAX_ATTEMPTS).contains(n))
                .ok_or(InputError::InvalidMaxAttempts {
                    min: MIN_ATTEMPTS,
                    max: MAX_ATTEMPTS,
                })?
        };
        Ok(SearchRequest {
            query: self.query.clone(),
            max_attempts,
        })
    }
}

/// A validated search submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub max_attempts: u8,
}

impl SearchRequest {
    /// Query-string pairs for the stream request.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("query", self.query.clone()),
            ("max_attempts", self.max_attempts.to_string()),
        ]
    }
}
