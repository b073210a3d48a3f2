//! Structured intent extracted from a single user turn

use serde::{Deserialize, Serialize};

/// What the user asked for, before any resolution
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ParsedIntent {
    /// Place phrase, absent when the turn relies on context
    pub location_text: Option<String>,
    /// Day expression, absent means today
    pub date_expression: Option<String>,
}

impl ParsedIntent {
    #[must_use]
    pub fn new(location_text: Option<&str>, date_expression: Option<&str>) -> Self {
        Self {
            location_text: location_text.map(str::to_string),
            date_expression: date_expression.map(str::to_string),
        }
    }
}
