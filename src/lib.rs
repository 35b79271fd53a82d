use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod export;
pub mod metrics;
pub mod report;
pub mod roster;
pub mod state;
pub mod storage;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

/// `?confirm=true` for destructive actions.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::report::routes::get_report,
        crate::report::routes::update_report,
        crate::report::routes::clear_report,
        crate::export::routes::preview_report,
        crate::roster::routes::get_roster,
        crate::roster::routes::add_name,
        crate::roster::routes::add_names_bulk,
        crate::roster::routes::remove_name,
        crate::roster::routes::clear_roster,
        crate::export::routes::start_export,
        crate::export::routes::get_status,
        crate::export::routes::download_export
    ),
    components(
        schemas(
            report::model::Report,
            report::model::FormStateResponse,
            report::routes::UpdateReportRequest,
            roster::model::RosterResponse,
            roster::model::AddNameRequest,
            roster::model::AddNameResponse,
            roster::model::BulkAddRequest,
            roster::model::BulkAddResponse,
            export::routes::ExportRequest,
            export::ExportAction,
            export::ExportOutcome,
            export::StatusSnapshot,
            export::ExportStatus,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Report", description = "Daily duty-teacher report form."),
        (name = "Roster", description = "Registered teacher names."),
        (name = "Export", description = "PDF export, submission and status.")
    )
)]
pub struct ApiDoc;

/// Register every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(report::routes::config)
            .configure(roster::routes::config)
            .configure(export::routes::config),
    );
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let bind = (config.host.clone(), config.port);
    let allowed_origins = config.allowed_origins.clone();

    let app_state = web::Data::new(AppState::new_with_config(config)?);

    let prometheus = PrometheusMetricsBuilder::new("laporan_guru_bertugas")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
