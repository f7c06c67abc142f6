//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::{AppSettings, SettingsError};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer};
use tracing::info;

use idm::Trace;
use idm::inbound::http::configure;
use idm::inbound::http::state::HttpState;

fn build_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().wrap(Trace).configure(configure(state))
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// Actix installs its own SIGINT/SIGTERM handling; on a stop signal the
/// listener closes and in-flight requests get `shutdown_timeout` to finish.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let bind_addr = config.bind_addr();
    let shutdown_secs = config.shutdown_timeout.as_secs();

    let server = HttpServer::new(move || build_app(http_state.clone()))
        .shutdown_timeout(shutdown_secs)
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "http server listening");
    Ok(server)
}
