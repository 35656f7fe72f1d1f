//! Failure classification and structured error responses

pub mod classifier;
pub mod codes;
pub mod failure;
pub mod response;
pub mod translate;

pub use classifier::ErrorClassifier;
pub use codes::ErrorCode;
pub use failure::{Failure, FieldViolation, ObjectViolation, ValidationErrors};
pub use response::{ErrorResponse, FieldError};
pub use translate::{error_translation, not_found_fallback, request_locale};
