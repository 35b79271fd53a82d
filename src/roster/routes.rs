use actix_web::{web, HttpResponse, Responder};

use super::model::{AddNameRequest, AddNameResponse, BulkAddRequest, BulkAddResponse, RosterResponse};
use super::store::RosterError;
use crate::{AppState, ConfirmQuery, ErrorResponse};

#[utoipa::path(
    get,
    path = "/api/roster",
    tag = "Roster",
    responses(
        (status = 200, description = "Registered teacher names", body = RosterResponse)
    )
)]
pub async fn get_roster(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.roster.response())
}

#[utoipa::path(
    post,
    path = "/api/roster",
    tag = "Roster",
    request_body = AddNameRequest,
    responses(
        (status = 200, description = "Name registered, or ignored when blank or duplicate", body = AddNameResponse)
    )
)]
pub async fn add_name(
    state: web::Data<AppState>,
    item: web::Json<AddNameRequest>,
) -> impl Responder {
    let added = state.roster.add_name(&item.name);
    HttpResponse::Ok().json(AddNameResponse {
        added,
        roster: state.roster.response(),
    })
}

#[utoipa::path(
    post,
    path = "/api/roster/bulk",
    tag = "Roster",
    request_body = BulkAddRequest,
    responses(
        (status = 200, description = "Names registered", body = BulkAddResponse)
    )
)]
pub async fn add_names_bulk(
    state: web::Data<AppState>,
    item: web::Json<BulkAddRequest>,
) -> impl Responder {
    let added = state.roster.add_names_bulk(&item.names);
    HttpResponse::Ok().json(BulkAddResponse {
        added,
        message: format!("{} nama guru telah didaftarkan ke dalam sistem.", added),
        roster: state.roster.response(),
    })
}

#[utoipa::path(
    delete,
    path = "/api/roster/{name}",
    tag = "Roster",
    params(
        ("name" = String, Path, description = "Exact registered name")
    ),
    responses(
        (status = 200, description = "Roster after removal", body = RosterResponse)
    )
)]
pub async fn remove_name(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let name = path.into_inner();
    if !state.roster.remove_name(&name) {
        log::debug!("Remove requested for unknown teacher '{}'", name);
    }
    HttpResponse::Ok().json(state.roster.response())
}

#[utoipa::path(
    delete,
    path = "/api/roster",
    tag = "Roster",
    params(
        ("confirm" = bool, Query, description = "Must be true; the clear cannot be undone")
    ),
    responses(
        (status = 200, description = "Roster cleared", body = RosterResponse),
        (status = 400, description = "Confirmation missing", body = ErrorResponse)
    )
)]
pub async fn clear_roster(
    state: web::Data<AppState>,
    query: web::Query<ConfirmQuery>,
) -> impl Responder {
    match state.roster.clear_all(query.confirm) {
        Ok(()) => HttpResponse::Ok().json(state.roster.response()),
        Err(e @ RosterError::ConfirmationRequired) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/roster")
            .route(web::get().to(get_roster))
            .route(web::post().to(add_name))
            .route(web::delete().to(clear_roster)),
    )
    .service(web::resource("/roster/bulk").route(web::post().to(add_names_bulk)))
    .service(web::resource("/roster/{name}").route(web::delete().to(remove_name)));
}
