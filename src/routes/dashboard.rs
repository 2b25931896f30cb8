use axum::{
    body::Body,
    extract::{Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, Response, StatusCode,
    },
    response::IntoResponse,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    repository::dashboard_rows::load_snapshot,
    schemas::{DashboardQuery, ExportFormat, ViewMode},
    services::{
        export::{render_document, ExportContext, RenderedDocument},
        metrics::build_dashboard,
        period::{resolve_window, WindowRequest},
    },
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/dashboardData", axum::routing::get(dashboard_data))
}

async fn dashboard_data(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Response<Body>> {
    let view_mode = ViewMode::parse(query.view_mode.as_deref(), state.config.default_view_mode)?;
    let export = ExportFormat::parse(query.export.as_deref())?;
    let today = state.config.today();

    let periods = resolve_window(&WindowRequest {
        start_date: query.start_date.as_deref(),
        end_date: query.end_date.as_deref(),
        view_mode,
        today,
        daily_respects_dates: state.config.daily_view_respects_dates,
    })?;

    tracing::info!(
        start = %periods.current.start,
        end = %periods.current.end,
        previous_start = %periods.previous.start,
        previous_end = %periods.previous.end,
        view_mode = view_mode.as_str(),
        "Computing dashboard data"
    );

    let pool = db_pool(&state)?;
    let snapshot = load_snapshot(pool, periods.span()).await?;
    let data = build_dashboard(&snapshot, &periods);

    if export == ExportFormat::Json {
        return Ok(Json(data).into_response());
    }

    let context = ExportContext {
        venue_name: state.config.venue_name.clone(),
        currency_symbol: state.config.currency_symbol.clone(),
        generated_on: today,
    };
    let document = tokio::task::spawn_blocking(move || render_document(export, &data, &context))
        .await
        .map_err(|error| {
            tracing::error!(error = %error, "Dashboard export task failed");
            export_failed()
        })?
        .map_err(|error| {
            tracing::error!(error = %error, "Could not render dashboard export");
            export_failed()
        })?;

    attachment_response(document)
}

fn attachment_response(document: RenderedDocument) -> AppResult<Response<Body>> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        document.filename
    ))
    .map_err(|error| {
        tracing::error!(error = %error, "Invalid attachment filename");
        export_failed()
    })?;

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .body(Body::from(document.bytes))
        .map_err(|error| {
            tracing::error!(error = %error, "Could not build export response");
            export_failed()
        })?;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(document.content_type));
    headers.insert(CONTENT_DISPOSITION, disposition);
    Ok(response)
}

fn export_failed() -> AppError {
    AppError::Internal("An error occurred while exporting dashboard data".to_string())
}

fn db_pool(state: &AppState) -> AppResult<&sqlx::PgPool> {
    state.db_pool.as_ref().ok_or_else(|| {
        tracing::error!("Dashboard requested but DATABASE_URL is not configured");
        AppError::Internal("An error occurred while fetching dashboard data".to_string())
    })
}
