//! HTTP inbound adapter exposing the REST and internal endpoints.

pub mod envelope;
pub mod error;
pub mod info;
pub mod records;
pub mod state;
pub mod validation;

pub use envelope::ApiEnvelope;
pub use error::ApiResult;

use actix_web::web;

use info::internal_scope;
use records::record_scope;
use state::HttpState;
use validation::{json_error_handler, query_error_handler};

/// Register every route and the extractor error handlers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use idm::Trace;
/// use idm::inbound::http::{configure, state::HttpState};
///
/// fn app(state: HttpState) {
///     let _app = App::new().wrap(Trace).configure(configure(state));
/// }
/// ```
pub fn configure(state: HttpState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let HttpState {
            employees,
            roles,
            probe,
            info,
        } = state;
        cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .service(
                web::scope("/api/v1")
                    .service(record_scope("/employees", employees))
                    .service(record_scope("/roles", roles)),
            )
            .service(internal_scope(info, probe));
    }
}
