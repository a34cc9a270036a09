use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder, ResponseError};
use ph_error::Error;
use serde::Serialize;

pub mod file;
pub mod member;
pub mod project;
pub mod user;

pub struct Response;

impl Response {
    pub fn data<T: Serialize>(status_code: &StatusCode, data: &T) -> HttpResponse {
        match serde_json::to_value(data) {
            Ok(data) => HttpResponseBuilder::new(*status_code).json(data),
            Err(err) => Self::error(&Error::BackendFailure(format!(
                "Failed to serialize response: {err}"
            ))),
        }
    }

    pub fn error(err: &Error) -> HttpResponse {
        Self::error_raw(&status_code(err), err.message())
    }

    pub fn error_raw(status_code: &StatusCode, message: &str) -> HttpResponse {
        if status_code.is_server_error() {
            ph_log::error(None, message);
        } else {
            ph_log::warn(None, message);
        }

        HttpResponseBuilder::new(*status_code).json(ErrorRes {
            error: message.to_owned(),
        })
    }
}

fn status_code(err: &Error) -> StatusCode {
    match err {
        Error::BadInput(_) => StatusCode::BAD_REQUEST,
        Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        Error::Forbidden(_) => StatusCode::FORBIDDEN,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::BackendFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[derive(Serialize)]
pub struct ErrorRes {
    error: String,
}

#[derive(Serialize)]
pub struct MessageResJson {
    message: String,
}

impl MessageResJson {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Lets extractors fail with the shared taxonomy and still render the usual
/// error body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_code(&self.0)
    }

    fn error_response(&self) -> HttpResponse {
        Response::error(&self.0)
    }
}
