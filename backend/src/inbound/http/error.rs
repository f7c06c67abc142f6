//! HTTP mapping for domain errors.
//!
//! Every failure is rendered as an [`ApiEnvelope`] with `success: false` and
//! the error message, plus the `trace-id` header when one is known.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use super::envelope::ApiEnvelope;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::AlreadyExists => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(trace_id = self.trace_id(), message = self.message(), "request failed");
        } else {
            warn!(trace_id = self.trace_id(), message = self.message(), "request rejected");
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ApiEnvelope::<()>::failure(
            self.message(),
            self.details().cloned(),
        ))
    }
}
