//! Internal endpoints: application identity and database health.

use std::sync::Arc;

use actix_web::{HttpResponse, Scope, http::header, web};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::state::AppInfo;
use crate::domain::ports::ConnectionProbe;

/// Body of `GET /internal/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
}

/// Probe handle stored as app data.
#[derive(Clone)]
pub struct HealthProbe(pub Arc<dyn ConnectionProbe>);

/// Build the `/internal` scope.
pub fn internal_scope(info: AppInfo, probe: Arc<dyn ConnectionProbe>) -> Scope {
    web::scope("/internal")
        .app_data(web::Data::new(info))
        .app_data(web::Data::new(HealthProbe(probe)))
        .route("/info", web::get().to(get_info))
        .route("/health", web::get().to(get_health))
}

pub async fn get_info(info: web::Data<AppInfo>) -> HttpResponse {
    HttpResponse::Ok().json(InfoResponse {
        name: info.name.clone(),
        version: info.version.clone(),
    })
}

/// `200 Healthy` when the database answers, `500 Unhealthy` otherwise.
pub async fn get_health(probe: web::Data<HealthProbe>) -> HttpResponse {
    let (mut response, body) = match probe.0.ping().await {
        Ok(()) => (HttpResponse::Ok(), "Healthy"),
        Err(err) => {
            warn!(error = %err, "health probe failed");
            (HttpResponse::InternalServerError(), "Unhealthy")
        }
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .content_type("text/plain; charset=utf-8")
        .body(body)
}
