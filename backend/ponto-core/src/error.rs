// src/error.rs
use axum::http::StatusCode as AxumStatusCode;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::messages;
use crate::record_store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    // Request parameter errors
    #[error("Missing \"momento\" parameter")]
    MissingParameter,
    #[error("\"momento\" is not a YYYY-MM-DDTHH:mm:ss timestamp")]
    InvalidFormat,
    #[error("Punches are not accepted on Saturday or Sunday")]
    WeekendNotAllowed,
    #[error("Month parameter is not a YYYY-MM string")]
    InvalidMonthFormat,

    // Business rules
    #[error("Hour already punched for this day")]
    DuplicatePunch,
    #[error("Hour is not later than the last punch of the day")]
    OutOfOrderPunch,
    #[error("Day already has 4 punches")]
    MaxPunchesReached,
    #[error("Lunch break shorter than one hour")]
    LunchTooShort,
    #[error("Day record changed while the punch was being recorded")]
    ConcurrentModification,

    // Infrastructure
    #[error("Stored record is corrupt: {0}")]
    CorruptRecord(String),
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> AxumStatusCode {
        match self {
            AppError::MissingParameter
            | AppError::InvalidFormat
            | AppError::WeekendNotAllowed
            | AppError::InvalidMonthFormat
            | AppError::OutOfOrderPunch
            | AppError::MaxPunchesReached
            | AppError::LunchTooShort => AxumStatusCode::BAD_REQUEST,
            AppError::DuplicatePunch | AppError::ConcurrentModification => {
                AxumStatusCode::CONFLICT
            }
            AppError::CorruptRecord(_) | AppError::Store(_) => {
                AxumStatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// User-facing text. Server errors get a generic message so internals never leak.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::MissingParameter => messages::punch::MISSING_PARAMETER,
            AppError::InvalidFormat => messages::punch::INVALID_FORMAT,
            AppError::WeekendNotAllowed => messages::punch::WEEKEND_NOT_ALLOWED,
            AppError::InvalidMonthFormat => messages::report::INVALID_MONTH,
            AppError::DuplicatePunch => messages::punch::DUPLICATE,
            AppError::OutOfOrderPunch => messages::punch::OUT_OF_ORDER,
            AppError::MaxPunchesReached => messages::punch::MAX_PUNCHES,
            AppError::LunchTooShort => messages::punch::LUNCH_TOO_SHORT,
            AppError::ConcurrentModification => messages::punch::CONCURRENT_UPDATE,
            AppError::CorruptRecord(_) => messages::report::FAILED_TO_BUILD,
            AppError::Store(_) => messages::UNEXPECTED_FAILURE,
        }
    }

    /// Errors about the `momento` request parameter answer under `mensagem`,
    /// everything else under `message`.
    pub fn body_key(&self) -> &'static str {
        match self {
            AppError::MissingParameter | AppError::InvalidFormat | AppError::WeekendNotAllowed => {
                "mensagem"
            }
            _ => "message",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status();
        if status_code.is_server_error() {
            error!("Request failed: {:?}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let mut body = serde_json::Map::new();
        body.insert(
            self.body_key().to_string(),
            serde_json::Value::from(self.user_message()),
        );
        (status_code, Json(serde_json::Value::Object(body))).into_response()
    }
}
