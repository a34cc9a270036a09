use actix_multipart::MultipartError;
use actix_web::{
    body::{to_bytes, MessageBody},
    dev::ServiceResponse,
    error::{InternalError, JsonPayloadError, PathError},
    http::header,
    middleware::ErrorHandlerResponse,
    HttpRequest, Result,
};
use futures::executor;
use ph_error::Error;

use crate::model::Response;

/// Rewrites any error response that is not already JSON into the
/// `{"error": ...}` body, keeping its status.
pub fn default_error_handler<B: MessageBody>(
    svc_res: ServiceResponse<B>,
) -> Result<ErrorHandlerResponse<B>> {
    if let Some(content_type) = svc_res.response().headers().get(header::CONTENT_TYPE) {
        if let Ok(content_type) = content_type.to_str() {
            if content_type.to_lowercase().starts_with("application/json") {
                return Ok(ErrorHandlerResponse::Response(svc_res.map_into_left_body()));
            }
        }
    }

    let (req, res) = svc_res.into_parts();

    let status_code = res.status();
    let body = executor::block_on(async {
        match to_bytes(res.into_body()).await {
            Ok(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(str) if !str.is_empty() => str,
                Ok(_) => status_code
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_owned(),
                Err(err) => err.to_string(),
            },
            Err(err) => err.into().to_string(),
        }
    });

    let res = Response::error_raw(&status_code, &body);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, res).map_into_right_body(),
    ))
}

fn bad_input<E>(err: E, message: String) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    InternalError::from_response(err, Response::error(&Error::BadInput(message))).into()
}

pub fn path_error_handler(err: PathError, _: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid path parameter: {err}");
    bad_input(err, message)
}

pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid request body: {err}");
    bad_input(err, message)
}

pub fn multipart_error_handler(err: MultipartError, _: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid multipart form: {err}");
    bad_input(err, message)
}
