//! Request DTOs for the conditional cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Maximum widget name length in characters
pub const MAX_NAME_LENGTH: usize = 128;

/// Request body for creating or replacing a widget
/// (POST /widgets, PUT /widgets/:id)
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetRequest {
    /// Display name
    pub name: String,
    /// Units in stock
    #[serde(default)]
    pub quantity: u32,
}

impl WidgetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if self.name.chars().count() > MAX_NAME_LENGTH {
            return Some(format!(
                "Name exceeds maximum length of {} characters",
                MAX_NAME_LENGTH
            ));
        }
        None
    }
}
