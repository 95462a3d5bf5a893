use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use std::fmt;

/// Error types for lab workflow validation and application errors
#[derive(Debug, Clone)]
pub enum BusinessError {
    /// Validation errors for user input (400 Bad Request)
    ValidationError { field: String, message: String },
    /// No signed-in identity on a route that needs one (401 Unauthorized)
    Unauthenticated,
    /// Business rule violations (422 Unprocessable Entity)
    BusinessRuleViolation { rule: String, message: String },
    /// Resource not found (404 Not Found)
    NotFound { resource: String, id: String },
    /// Duplicate resource (409 Conflict)
    Duplicate { resource: String, field: String },
    /// Permission denied (403 Forbidden)
    Forbidden { action: String, resource: String },
    /// A multi-step workflow stopped after committing some of its steps.
    /// The committed steps are not rolled back (500 Internal Server Error)
    IncompleteOperation {
        operation: String,
        completed_steps: Vec<String>,
        failed_step: String,
        message: String,
    },
    /// External service errors (502 Bad Gateway)
    ExternalServiceError { service: String, message: String },
    /// Generic application error (500 Internal Server Error)
    InternalError { message: String },
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::ValidationError { field, message } => {
                write!(f, "Validation error in field '{field}': {message}")
            }
            BusinessError::Unauthenticated => write!(f, "No signed-in user"),
            BusinessError::BusinessRuleViolation { rule, message } => {
                write!(f, "Business rule '{rule}' violated: {message}")
            }
            BusinessError::NotFound { resource, id } => {
                write!(f, "{resource} with id '{id}' not found")
            }
            BusinessError::Duplicate { resource, field } => {
                write!(f, "{resource} with this {field} already exists")
            }
            BusinessError::Forbidden { action, resource } => {
                write!(f, "Not authorized to {action} {resource}")
            }
            BusinessError::IncompleteOperation {
                operation,
                completed_steps,
                failed_step,
                message,
            } => write!(
                f,
                "{operation} stopped at step '{failed_step}' after completing [{}]: {message}",
                completed_steps.join(", ")
            ),
            BusinessError::ExternalServiceError { service, message } => {
                write!(f, "External service '{service}' error: {message}")
            }
            BusinessError::InternalError { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for BusinessError {}

/// Convert `BusinessError` to HTTP responses
impl IntoResponse for BusinessError {
    fn into_response(self) -> Response {
        let status = match &self {
            BusinessError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            BusinessError::Unauthenticated => StatusCode::UNAUTHORIZED,
            BusinessError::BusinessRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BusinessError::NotFound { .. } => StatusCode::NOT_FOUND,
            BusinessError::Duplicate { .. } => StatusCode::CONFLICT,
            BusinessError::Forbidden { .. } => StatusCode::FORBIDDEN,
            BusinessError::ExternalServiceError { .. } => StatusCode::BAD_GATEWAY,
            BusinessError::IncompleteOperation { .. } | BusinessError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut error = json!({
            "code": self.code(),
            "message": self.to_string(),
            "type": format!("{self:?}").split([' ', '{']).next().unwrap_or("Unknown")
        });

        // The operator needs to know which steps already landed
        if let BusinessError::IncompleteOperation {
            completed_steps,
            failed_step,
            ..
        } = &self
        {
            error["completed_steps"] = json!(completed_steps);
            error["failed_step"] = json!(failed_step);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl BusinessError {
    pub fn code(&self) -> &'static str {
        match self {
            BusinessError::ValidationError { .. } => "VALIDATION_ERROR",
            BusinessError::Unauthenticated => "UNAUTHENTICATED",
            BusinessError::BusinessRuleViolation { .. } => "BUSINESS_RULE_VIOLATION",
            BusinessError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            BusinessError::Duplicate { .. } => "DUPLICATE_RESOURCE",
            BusinessError::Forbidden { .. } => "FORBIDDEN",
            BusinessError::IncompleteOperation { .. } => "INCOMPLETE_OPERATION",
            BusinessError::ExternalServiceError { .. } => "EXTERNAL_SERVICE_ERROR",
            BusinessError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Maps store errors onto business errors
pub struct ErrorMapper;

impl ErrorMapper {
    /// Map `DbErr` to the matching business error, `context` names the resource
    pub fn map_db_error(err: DbErr, context: &str) -> BusinessError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                return BusinessError::Duplicate {
                    resource: Self::extract_resource_from_context(context),
                    field: Self::extract_field_from_constraint(&detail),
                };
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                return BusinessError::BusinessRuleViolation {
                    rule: "referential_integrity".to_string(),
                    message: format!("{} is still referenced: {detail}", Self::extract_resource_from_context(context)),
                };
            }
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(msg) => BusinessError::NotFound {
                resource: Self::extract_resource_from_context(context),
                id: Self::extract_id_from_message(&msg),
            },
            DbErr::Custom(msg) => {
                if msg.starts_with("Validation failed:") {
                    let field = Self::extract_field_from_validation(&msg);
                    let message = msg.replace("Validation failed:", "").trim().to_string();
                    BusinessError::ValidationError { field, message }
                } else if msg.contains("already exists") || msg.contains("duplicate") {
                    BusinessError::Duplicate {
                        resource: Self::extract_resource_from_context(context),
                        field: Self::extract_field_from_constraint(&msg),
                    }
                } else {
                    BusinessError::InternalError { message: msg }
                }
            }
            DbErr::Conn(conn_err) => BusinessError::ExternalServiceError {
                service: "database".to_string(),
                message: conn_err.to_string(),
            },
            DbErr::Exec(exec_err) => {
                let err_msg = exec_err.to_string();
                if Self::is_unique_violation(&err_msg) {
                    BusinessError::Duplicate {
                        resource: Self::extract_resource_from_context(context),
                        field: Self::extract_field_from_constraint(&err_msg),
                    }
                } else {
                    BusinessError::InternalError { message: err_msg }
                }
            }
            DbErr::Query(query_err) => {
                let err_msg = query_err.to_string();
                if Self::is_unique_violation(&err_msg) {
                    BusinessError::Duplicate {
                        resource: Self::extract_resource_from_context(context),
                        field: Self::extract_field_from_constraint(&err_msg),
                    }
                } else {
                    BusinessError::InternalError { message: err_msg }
                }
            }
            _ => BusinessError::InternalError {
                message: err.to_string(),
            },
        }
    }

    fn is_unique_violation(msg: &str) -> bool {
        msg.contains("UNIQUE constraint") || msg.contains("duplicate key")
    }

    /// "tank_note" -> "tank note"
    fn extract_resource_from_context(context: &str) -> String {
        context.replace('_', " ")
    }

    /// Helper to extract ID from error messages
    fn extract_id_from_message(msg: &str) -> String {
        if let Some(start_pos) = msg.find(" id '") {
            let after_id = &msg[start_pos + 5..];
            if let Some(end_pos) = after_id.find('\'') {
                return after_id[..end_pos].to_string();
            }
        }

        // Fallback: first UUID-looking word
        msg.split_whitespace()
            .find_map(|word| {
                let cleaned = word.trim_matches('\'').trim_matches('"');
                if cleaned.len() == 36 && cleaned.matches('-').count() == 4 {
                    Some(cleaned.to_string())
                } else {
                    None
                }
            })
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Helper to extract field name from validation error
    fn extract_field_from_validation(msg: &str) -> String {
        msg.split(':')
            .nth(1)
            .and_then(|part| part.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string()
    }

    /// Helper to extract field from constraint violation
    fn extract_field_from_constraint(msg: &str) -> String {
        if msg.contains("tank_id") {
            "tank_id".to_string()
        } else if msg.contains("email") {
            "email".to_string()
        } else if msg.contains("name") {
            "name".to_string()
        } else {
            "field".to_string()
        }
    }
}

/// Convenience macros for creating business errors
#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::BusinessError::ValidationError {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! business_rule_violation {
    ($rule:expr, $message:expr) => {
        $crate::common::errors::BusinessError::BusinessRuleViolation {
            rule: $rule.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! not_found {
    ($resource:expr, $id:expr) => {
        $crate::common::errors::BusinessError::NotFound {
            resource: $resource.to_string(),
            id: $id.to_string(),
        }
    };
}

#[macro_export]
macro_rules! duplicate_resource {
    ($resource:expr, $field:expr) => {
        $crate::common::errors::BusinessError::Duplicate {
            resource: $resource.to_string(),
            field: $field.to_string(),
        }
    };
}

/// Extension trait to add business error conversion to `DbErr`
pub trait DbErrorExt {
    fn to_business_error(self, context: &str) -> BusinessError;
}

impl DbErrorExt for DbErr {
    fn to_business_error(self, context: &str) -> BusinessError {
        ErrorMapper::map_db_error(self, context)
    }
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;
