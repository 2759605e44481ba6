//! Structured error types for service and HTTP responses.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,
    InvalidState,

    // Not found errors
    UserNotFound,
    TaskNotFound,
    ParentNotFound,

    // Identity errors
    Unauthorized,
    Forbidden,

    // Conflict errors
    AlreadyExists,

    // Internal errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// True for every "referenced entity is absent or invisible" code.
    pub fn is_not_found(self) -> bool {
        matches!(
            self,
            ErrorCode::UserNotFound | ErrorCode::TaskNotFound | ErrorCode::ParentNotFound
        )
    }

    /// True for malformed or missing input.
    pub fn is_invalid_input(self) -> bool {
        matches!(
            self,
            ErrorCode::MissingRequiredField | ErrorCode::InvalidFieldValue
        )
    }
}

/// Structured error returned by the services.
#[derive(Debug, Serialize)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn user_not_found(user_id: &str) -> Self {
        Self::new(ErrorCode::UserNotFound, "User not found").with_details(user_id)
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn parent_not_found(parent_id: &str) -> Self {
        Self::new(
            ErrorCode::ParentNotFound,
            format!("Parent task not found: {}", parent_id),
        )
        .with_field("parent_task_id")
    }

    pub fn foreign_parent(parent_id: &str) -> Self {
        Self::new(
            ErrorCode::Forbidden,
            "Parent task belongs to a different user",
        )
        .with_field("parent_task_id")
        .with_details(parent_id)
    }

    pub fn not_owner(task_id: &str, user_id: &str) -> Self {
        Self::new(
            ErrorCode::Forbidden,
            format!("User {} cannot modify task {}", user_id, task_id),
        )
    }

    pub fn deleted_task(task_id: &str) -> Self {
        Self::new(
            ErrorCode::InvalidState,
            format!("Cannot modify deleted task {}", task_id),
        )
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, reason)
    }

    pub fn already_exists(what: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyExists,
            format!("{} already exists: {}", what, value),
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

// Stores report through anyhow; a ServiceError raised inside a store survives the trip.
impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ServiceError>() {
            Ok(service_err) => service_err,
            Err(err) => match err.downcast_ref::<rusqlite::Error>() {
                Some(_) => ServiceError::database(format!("{:#}", err)),
                None => ServiceError::internal(format!("{:#}", err)),
            },
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
