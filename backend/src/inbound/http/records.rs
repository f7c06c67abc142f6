//! Employee and role HTTP handlers.
//!
//! ```text
//! POST   /api/v1/{resource}            create, returns the new id
//! GET    /api/v1/{resource}            list all
//! GET    /api/v1/{resource}/id/{id}    find one
//! GET    /api/v1/{resource}/ids?ids=   find many
//! DELETE /api/v1/{resource}/id/{id}    delete one
//! DELETE /api/v1/{resource}/ids?ids=   delete many
//! ```
//!
//! The same handlers serve both resources; each scope carries its own
//! [`RecordPorts`] as app data.

use actix_web::{HttpResponse, Scope, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::envelope::ApiEnvelope;
use super::error::ApiResult;
use super::state::RecordPorts;
use super::validation::{parse_id_list, parse_path_id};
use crate::domain::{CreateRecordRequest, Error};

/// Create payload. Snake-case timestamp names are accepted as aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordBody {
    pub name: Option<String>,
    #[serde(alias = "create_at", alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "update_at", alias = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CreateRecordBody> for CreateRecordRequest {
    fn from(body: CreateRecordBody) -> Self {
        Self {
            name: body.name,
            created_at: body.created_at,
            updated_at: body.updated_at,
        }
    }
}

/// `?ids=1,2,3`
#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    pub ids: Option<String>,
}

/// Build the scope for one resource.
pub fn record_scope(path: &str, ports: RecordPorts) -> Scope {
    web::scope(path)
        .app_data(web::Data::new(ports))
        .route("", web::post().to(create_record))
        .route("", web::get().to(list_records))
        .route("/id/{id}", web::get().to(find_record))
        .route("/id/{id}", web::delete().to(delete_record))
        .route("/ids", web::get().to(find_records))
        .route("/ids", web::delete().to(delete_records))
}

pub async fn create_record(
    ports: web::Data<RecordPorts>,
    body: web::Json<CreateRecordBody>,
) -> ApiResult<HttpResponse> {
    let id = ports
        .command
        .create(body.into_inner().into())
        .await
        .map_err(Error::from)?;
    Ok(HttpResponse::Ok().json(ApiEnvelope::success(id)))
}

pub async fn list_records(ports: web::Data<RecordPorts>) -> ApiResult<HttpResponse> {
    let records = ports.query.list_all().await?;
    Ok(HttpResponse::Ok().json(ApiEnvelope::success(records)))
}

pub async fn find_record(
    ports: web::Data<RecordPorts>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_path_id(&path)?;
    let record = ports.query.find_by_id(id).await?;
    Ok(HttpResponse::Ok().json(ApiEnvelope::success(record)))
}

pub async fn find_records(
    ports: web::Data<RecordPorts>,
    query: web::Query<IdsQuery>,
) -> ApiResult<HttpResponse> {
    let ids = parse_id_list(query.ids.as_deref())?;
    let records = ports.query.find_by_ids(ids).await?;
    Ok(HttpResponse::Ok().json(ApiEnvelope::success(records)))
}

pub async fn delete_record(
    ports: web::Data<RecordPorts>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_path_id(&path)?;
    ports.command.delete_by_id(id).await?;
    Ok(HttpResponse::Ok().json(ApiEnvelope::empty()))
}

pub async fn delete_records(
    ports: web::Data<RecordPorts>,
    query: web::Query<IdsQuery>,
) -> ApiResult<HttpResponse> {
    let ids = parse_id_list(query.ids.as_deref())?;
    ports.command.delete_by_ids(ids).await?;
    Ok(HttpResponse::Ok().json(ApiEnvelope::empty()))
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
