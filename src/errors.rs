use crate::filters::{FilterKind, Role};
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("statistics payload must be a JSON object")]
    NotAnObject,
    #[error("series `{series}` has {labels} labels but {values} values")]
    LengthMismatch {
        series: String,
        labels: usize,
        values: usize,
    },
    #[error("series `{series}` repeats label `{label}`")]
    DuplicateLabel { series: String, label: String },
    #[error("series `{series}` holds a non-numeric value")]
    NonNumeric { series: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("statistics request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("statistics endpoint answered HTTP {0}")]
    Status(u16),
    #[error("statistics payload rejected: {0}")]
    Decode(#[from] SnapshotError),
    #[error("statistics source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("render target `{target}` is not on the page")]
    MissingTarget { target: String },
    #[error("series `{series}` is missing from the snapshot")]
    MissingSeries { series: String },
    #[error("series `{series}` is {found}, expected {expected}")]
    WrongShape {
        series: String,
        found: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("the {filter} filter is fixed for this role")]
    Locked { filter: FilterKind },
    #[error("`{value}` is not an option of the {filter} filter")]
    UnknownOption { filter: FilterKind, value: String },
    #[error("unknown filter `{0}`")]
    UnknownFilter(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("the {role} role requires an assigned {filter}")]
    MissingAssignment { role: Role, filter: FilterKind },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("invalid value for {key}: `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
