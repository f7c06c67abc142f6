//! Parsing and rejection helpers shared by the HTTP handlers.

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use serde_json::json;

use crate::domain::{Error, RecordId};

fn invalid_id(raw: &str) -> Error {
    Error::invalid_request(format!("invalid id format: {raw}"))
        .with_details(json!({ "field": "id", "code": "invalid_id", "value": raw }))
}

/// Parse an id taken from the request path.
pub(crate) fn parse_path_id(raw: &str) -> Result<RecordId, Error> {
    raw.parse::<RecordId>().map_err(|_| invalid_id(raw))
}

/// Parse the comma separated `ids` query parameter.
///
/// The parameter is required; every element must be an integer.
pub(crate) fn parse_id_list(raw: Option<&str>) -> Result<Vec<RecordId>, Error> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(Error::invalid_request("ids parameter is required")
            .with_details(json!({ "field": "ids", "code": "missing_field" })));
    }
    raw.split(',')
        .map(|part| part.parse::<RecordId>().map_err(|_| invalid_id(part.trim())))
        .collect()
}

/// Turn body deserialisation failures into enveloped 400 responses.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid request body: {err}")).into()
}

/// Turn query deserialisation failures into enveloped 400 responses.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query parameters: {err}")).into()
}
