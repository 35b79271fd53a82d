use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::ToSchema;

use super::model::{FormStateResponse, Report};
use super::update::ReportUpdate;
use crate::{AppState, ConfirmQuery, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReportRequest {
    /// Field updates, e.g. `{"minggu": "7"}` or `{"namaGuru": {"slot": 0, "value": "AHMAD BIN ALI"}}`.
    #[schema(value_type = Vec<Object>)]
    pub updates: Vec<ReportUpdate>,
}

#[utoipa::path(
    get,
    path = "/api/report",
    tag = "Report",
    responses(
        (status = 200, description = "Current report and roster", body = FormStateResponse)
    )
)]
pub async fn get_report(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(FormStateResponse {
        report: state.report.snapshot(),
        roster: state.roster.response(),
    })
}

#[utoipa::path(
    patch,
    path = "/api/report",
    tag = "Report",
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Updated report", body = Report),
        (status = 400, description = "Invalid update; nothing was applied", body = ErrorResponse)
    )
)]
pub async fn update_report(
    state: web::Data<AppState>,
    item: web::Json<UpdateReportRequest>,
) -> impl Responder {
    let roster = state.roster.snapshot();
    match state.report.apply_all(item.into_inner().updates, &roster) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            log::debug!("Rejected report update: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/report",
    tag = "Report",
    params(
        ("confirm" = bool, Query, description = "Must be true; registered teachers are kept")
    ),
    responses(
        (status = 200, description = "Blank report", body = Report),
        (status = 400, description = "Confirmation missing", body = ErrorResponse)
    )
)]
pub async fn clear_report(
    state: web::Data<AppState>,
    query: web::Query<ConfirmQuery>,
) -> impl Responder {
    if !query.confirm {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "clearing the form requires explicit confirmation",
        ));
    }
    HttpResponse::Ok().json(state.report.reset())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/report")
            .route(web::get().to(get_report))
            .route(web::patch().to(update_report))
            .route(web::delete().to(clear_report)),
    );
}
