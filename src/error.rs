use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use std::env;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    ServiceError,
    NoRoute,
    ReconciliationMismatch,
    NotFound,
    Rejected,
    NotEnoughPoints,
    InvalidInput,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn code(&self) -> i32 {
        match self.kind {
            ErrorKind::Configuration => 1,
            ErrorKind::ServiceError => 2,
            ErrorKind::NoRoute => 3,
            ErrorKind::ReconciliationMismatch => 4,
            ErrorKind::NotFound => 100,
            ErrorKind::Rejected => 101,
            ErrorKind::NotEnoughPoints => 102,
            ErrorKind::InvalidInput => 103,
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::ServiceError | ErrorKind::NoRoute | ErrorKind::ReconciliationMismatch => {
                StatusCode::BAD_GATEWAY
            }
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Rejected => StatusCode::CONFLICT,
            ErrorKind::NotEnoughPoints | ErrorKind::InvalidInput => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code())
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self.kind {
            ErrorKind::Configuration => "Internal Server Error",
            _ => self.message.as_str(),
        };

        let body = Json(json!({
            "code": self.code(),
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn not_found_error() -> Error {
    Error {
        kind: ErrorKind::NotFound,
        message: "waypoint or address not found".into(),
    }
}

pub fn rejected_error() -> Error {
    Error {
        kind: ErrorKind::Rejected,
        message: "start and end waypoints cannot be moved".into(),
    }
}

pub fn invalid_order_error() -> Error {
    Error {
        kind: ErrorKind::Rejected,
        message: "new order must list every intermediate waypoint exactly once".into(),
    }
}

pub fn not_enough_points_error() -> Error {
    Error {
        kind: ErrorKind::NotEnoughPoints,
        message: "at least three points are needed: start, one or more stops, and end".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        kind: ErrorKind::InvalidInput,
        message: "enter an address or a coordinate pair".into(),
    }
}

pub fn invalid_coordinates_error() -> Error {
    Error {
        kind: ErrorKind::InvalidInput,
        message: "invalid coordinates".into(),
    }
}

pub fn no_route_error() -> Error {
    Error {
        kind: ErrorKind::NoRoute,
        message: "no route could be computed for these waypoints".into(),
    }
}

pub fn reconciliation_mismatch_error() -> Error {
    Error {
        kind: ErrorKind::ReconciliationMismatch,
        message: "optimized order does not match the current waypoints".into(),
    }
}

pub fn upstream_error(service: &str) -> Error {
    Error {
        kind: ErrorKind::ServiceError,
        message: format!("{} returned an unusable response", service),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        kind: ErrorKind::Configuration,
        message: "environment variable error".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::warn!("request failed: {}", err);

    let host = err
        .url()
        .and_then(|url| url.host_str())
        .unwrap_or("external service")
        .to_string();

    Error {
        kind: ErrorKind::ServiceError,
        message: format!("request to {} failed", host),
    }
}

#[test]
fn error_codes_are_distinct() {
    let errors = vec![
        env_var_error(env::VarError::NotPresent),
        upstream_error("routing service"),
        no_route_error(),
        reconciliation_mismatch_error(),
        not_found_error(),
        rejected_error(),
        not_enough_points_error(),
        invalid_input_error(),
    ];

    let mut codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
    codes.sort();
    codes.dedup();

    assert_eq!(codes.len(), errors.len());
}

#[test]
fn error_messages_name_the_cause() {
    assert_eq!(
        upstream_error("geocoding service").message,
        "geocoding service returned an unusable response"
    );
    assert_ne!(invalid_order_error().message, rejected_error().message);
    assert!(invalid_order_error().is(ErrorKind::Rejected));
}

#[test]
fn error_statuses() {
    assert_eq!(not_found_error().status(), StatusCode::NOT_FOUND);
    assert_eq!(rejected_error().status(), StatusCode::CONFLICT);
    assert_eq!(
        not_enough_points_error().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        upstream_error("routing service").status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(invalid_order_error().status(), StatusCode::CONFLICT);
    assert!(invalid_coordinates_error().is(ErrorKind::InvalidInput));
}
