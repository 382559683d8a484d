//! Request and response bodies.

pub mod request;
pub mod response;

use validator::Validate;

use warden_core::error::AppError;

/// Runs `validator` rules on a request body, as a validation error.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}
