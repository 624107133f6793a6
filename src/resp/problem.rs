use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

/// A single failed field check, reported inside the `errors` array of a
/// validation [`Problem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl ToString, message: impl ToString) -> FieldError {
        FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

fn internal_server_error() -> Status {
    Status::InternalServerError
}

/// Error half of the response envelope. Every handler failure is converted
/// into this shape: `{success: false, message, error?, errors?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Problem {
    #[serde(skip, default = "internal_server_error")]
    pub status: Status,

    pub success: bool,
    pub message: String,

    /// Raw underlying error message, when one is worth passing through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Per-field validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<FieldError>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            success: false,
            message: "Something went wrong!".to_string(),
            error: None,
            errors: vec![],
        }
    }
}

impl Problem {
    pub fn new(status: Status, message: impl ToString) -> Problem {
        Problem {
            status,
            message: message.to_string(),
            ..Default::default()
        }
    }

    pub fn error(mut self, value: impl ToString) -> Problem {
        self.error = Some(value.to_string());
        self
    }

    pub fn field(mut self, field: impl ToString, message: impl ToString) -> Problem {
        self.errors.push(FieldError::new(field, message));
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let body = serde_json::to_string(&self)
            .expect("problem envelope must be JSON serializable");

        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

pub mod problems {
    use super::{FieldError, Problem};
    use rocket::http::Status;

    #[inline]
    pub fn not_found(what: &str) -> Problem {
        Problem::new(Status::NotFound, format!("{} not found", what))
    }

    #[inline]
    pub fn invalid_id() -> Problem {
        Problem::new(Status::BadRequest, "Invalid ID format")
    }

    #[inline]
    pub fn invalid_status() -> Problem {
        Problem::new(Status::BadRequest, "Invalid status value")
    }

    #[inline]
    pub fn validation(errors: Vec<FieldError>) -> Problem {
        let mut p = Problem::new(Status::BadRequest, "Validation Error");
        p.errors = errors;
        p
    }
}

/// Duplicate writes surface as MongoDB error code 11000, on both single and
/// bulk writes.
pub fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
        ErrorKind::BulkWrite(bulk) => bulk
            .write_errors
            .as_ref()
            .map(|errs| errs.iter().any(|we| we.code == 11000))
            .unwrap_or(false),
        _ => false,
    }
}

impl From<mongodb::error::Error> for Problem {
    fn from(e: mongodb::error::Error) -> Self {
        if is_duplicate_key(&e) {
            return Problem::new(Status::BadRequest, "Duplicate entry");
        }

        Problem::new(
            Status::InternalServerError,
            "Database error while processing request",
        )
        .error(e.to_string())
    }
}

impl From<bson::de::Error> for Problem {
    fn from(e: bson::de::Error) -> Self {
        Problem::new(
            Status::InternalServerError,
            "An error occurred while processing stored data",
        )
        .error(e.to_string())
    }
}

impl From<bson::ser::Error> for Problem {
    fn from(e: bson::ser::Error) -> Self {
        Problem::new(
            Status::InternalServerError,
            "An error occurred while processing stored data",
        )
        .error(e.to_string())
    }
}

impl From<serde_json::Error> for Problem {
    fn from(e: serde_json::Error) -> Self {
        Problem::new(
            Status::InternalServerError,
            "An error occurred while processing JSON data",
        )
        .error(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        Problem::new(Status::Unauthorized, "Token is invalid or expired")
    }
}

impl From<std::io::Error> for Problem {
    fn from(e: std::io::Error) -> Self {
        Problem::new(Status::InternalServerError, "Server IO error").error(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_always_reports_failure() {
        let p = Problem::new(Status::NotFound, "Student not found");
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Student not found");
        assert!(json.get("error").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn field_errors_are_included_when_present() {
        let p = problems::validation(vec![
            FieldError::new("email", "Valid email is required"),
            FieldError::new("phone", "Valid phone number is required"),
        ]);
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["message"], "Validation Error");
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
        assert_eq!(json["errors"][0]["field"], "email");
    }

    #[test]
    fn raw_error_is_passed_through() {
        let p = Problem::new(Status::InternalServerError, "Registration failed")
            .error("connection reset");
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["error"], "connection reset");
    }
}
