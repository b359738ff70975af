//! Engine failure -> typed error translation.
//!
//! The engine's `"<Category>, <detail>"` string is carried verbatim as the error message.

use crate::{
    engine::{EngineFailure, ErrorCategory},
    foundation::error::RastreeError,
};

/// Translate a structured engine failure.
pub fn translate_failure(failure: EngineFailure) -> RastreeError {
    let message = failure.to_string();
    match failure.category {
        ErrorCategory::InvalidArg => RastreeError::Deserialize(message),
        ErrorCategory::GenericFailure => RastreeError::Engine(message),
    }
}

/// Translate an engine error that crossed a message boundary as a plain string.
pub fn translate_message(message: impl Into<String>) -> RastreeError {
    let message = message.into();
    match EngineFailure::parse(&message) {
        Some(f) if f.category == ErrorCategory::InvalidArg => RastreeError::Deserialize(message),
        _ => RastreeError::Engine(message),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/translate.rs"]
mod tests;
