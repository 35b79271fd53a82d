use actix_files::NamedFile;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::ToSchema;

use super::pipeline::{MSG_FAILED, MSG_NOT_READY};
use super::{ExportAction, ExportError, ExportOutcome, StatusSnapshot};
use crate::{metrics, AppState, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub action: ExportAction,
}

fn error_response(e: &ExportError) -> HttpResponse {
    match e {
        ExportError::NotReady(detail) => HttpResponse::ServiceUnavailable().json(
            ErrorResponse::new("NotReady", &format!("{} ({})", MSG_NOT_READY, detail)),
        ),
        ExportError::Pipeline(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(MSG_FAILED))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/export",
    tag = "Export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Report exported", body = ExportOutcome),
        (status = 409, description = "Another export is in progress", body = ErrorResponse),
        (status = 500, description = "Export failed; see status for the notice", body = ErrorResponse),
        (status = 503, description = "Renderer, layout or submission endpoint unavailable", body = ErrorResponse)
    )
)]
pub async fn start_export(
    state: web::Data<AppState>,
    item: web::Json<ExportRequest>,
) -> impl Responder {
    let action = item.into_inner().action;

    // Only one run at a time; a second click while Busy is refused.
    let _guard = match state.export_gate.try_lock() {
        Ok(guard) if !state.pipeline.status().is_busy() => guard,
        _ => {
            log::info!("Export ({}) rejected, another export is in progress", action);
            return HttpResponse::Conflict().json(ErrorResponse::new(
                "Busy",
                "Eksport sedang berjalan. Sila tunggu sehingga selesai.",
            ));
        }
    };

    let report = state.report.snapshot();
    match state.pipeline.export(action, &report).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/export/status",
    tag = "Export",
    responses(
        (status = 200, description = "Current export status", body = StatusSnapshot)
    )
)]
pub async fn get_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.pipeline.status().snapshot())
}

#[utoipa::path(
    get,
    path = "/api/report/preview",
    tag = "Report",
    responses(
        (status = 200, description = "Current report as PDF", content_type = "application/pdf"),
        (status = 500, description = "Rendering failed", body = ErrorResponse),
        (status = 503, description = "Renderer or layout unavailable", body = ErrorResponse)
    )
)]
pub async fn preview_report(state: web::Data<AppState>) -> impl Responder {
    let report = state.report.snapshot();
    match state.pipeline.preview(&report).await {
        Ok(artifact) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", artifact.filename),
            ))
            .body(artifact.bytes),
        Err(e) => {
            log::error!("Preview failed: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/exports/{filename}",
    tag = "Export",
    params(
        ("filename" = String, Path, description = "File name returned by a save export")
    ),
    responses(
        (status = 200, description = "Saved PDF", content_type = "application/pdf"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "No such export", body = ErrorResponse)
    )
)]
pub async fn download_export(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let filename = path.into_inner();
    if sanitize_filename::sanitize(&filename) != filename || !filename.ends_with(".pdf") {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Invalid export file name"));
    }

    let file_path = state.config.export_dir.join(&filename);
    match NamedFile::open_async(&file_path).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .into_response(&req),
        Err(e) => {
            log::debug!("Export {} not served: {}", file_path.display(), e);
            HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
                "Export '{}' not found",
                filename
            )))
        }
    }
}

/// Export counters in Prometheus text format.
pub async fn export_metrics() -> impl Responder {
    match metrics::render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(
                "Failed to encode metrics",
            ))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/export").route(web::post().to(start_export)))
        .service(web::resource("/export/status").route(web::get().to(get_status)))
        .service(web::resource("/export/metrics").route(web::get().to(export_metrics)))
        .service(web::resource("/exports/{filename}").route(web::get().to(download_export)))
        .service(web::resource("/report/preview").route(web::get().to(preview_report)));
}
