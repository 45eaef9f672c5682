use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::{ApiResponse, CustomizationError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Data source error: {0}")]
    DataSourceError(String),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl From<CustomizationError> for AppError {
    fn from(err: CustomizationError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::ImportError(msg) => {
                log::warn!("Import error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "IMPORT_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::DataSourceError(msg) => {
                log::error!("Data source error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "DATA_SOURCE_ERROR",
                    msg.clone(),
                )
            }
            AppError::StorageError(err) => {
                log::error!("Storage error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Storage error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(ApiResponse::error(error_code, message))
    }
}
