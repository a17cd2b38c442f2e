//! HTTP request handlers

use super::state::AppState;
use super::templates::markdown_to_html;
use crate::report::{ReportEntry, ReportError};
use crate::research::{CompletedRun, ResearchOutput};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tera::Context;

/// Form body for the research page
#[derive(Debug, Deserialize)]
pub struct ResearchForm {
    #[serde(default)]
    pub q: String,
}

/// JSON body for the research API
#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    #[serde(default)]
    pub query: String,
}

/// JSON reply of the research API
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResearchResponse {
    Advisory {
        advisory: String,
    },
    Completed {
        report: String,
        saved_path: String,
        findings: usize,
        searches: usize,
    },
}

impl From<ResearchOutput> for ResearchResponse {
    fn from(output: ResearchOutput) -> Self {
        match output {
            ResearchOutput::Advisory(advisory) => ResearchResponse::Advisory { advisory },
            ResearchOutput::Completed(run) => ResearchResponse::Completed {
                saved_path: run.saved_path.display().to_string(),
                findings: run.findings,
                searches: run.searches,
                report: run.report.markdown_report,
            },
        }
    }
}

fn base_context(state: &AppState) -> Context {
    let mut ctx = Context::new();
    ctx.insert("instance_name", state.instance_name());
    ctx
}

fn render_page(state: &AppState, template: &str, ctx: &Context) -> Response {
    match state.templates.render_with_context(template, ctx) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

fn error_page(state: &AppState, status: StatusCode, message: &str) -> Response {
    let mut ctx = base_context(state);
    ctx.insert("message", message);
    let mut response = render_page(state, "error.html", &ctx);
    if response.status().is_success() {
        *response.status_mut() = status;
    }
    response
}

fn saved_name(run: &CompletedRun) -> String {
    run.saved_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// "New Research" page
pub async fn index(State(state): State<AppState>) -> Response {
    let mut ctx = base_context(&state);
    ctx.insert("query", "");
    render_page(&state, "index.html", &ctx)
}

/// Form-post research; renders the finished report
pub async fn research_form(
    State(state): State<AppState>,
    Form(form): Form<ResearchForm>,
) -> Response {
    match state.manager.run(&form.q).await {
        Ok(ResearchOutput::Advisory(advisory)) => {
            let mut ctx = base_context(&state);
            ctx.insert("query", &form.q);
            ctx.insert("advisory", &advisory);
            render_page(&state, "index.html", &ctx)
        }
        Ok(ResearchOutput::Completed(run)) => {
            let mut ctx = base_context(&state);
            ctx.insert("name", &saved_name(&run));
            ctx.insert("query", &run.query);
            ctx.insert("summary", &run.report.short_summary);
            ctx.insert("report_html", &markdown_to_html(&run.report.markdown_report));
            render_page(&state, "report.html", &ctx)
        }
        Err(e) => {
            tracing::error!("Research failed: {}", e);
            error_page(&state, StatusCode::BAD_GATEWAY, &format!("❌ Error: {}", e))
        }
    }
}

/// "Past Reports" page
pub async fn reports_list(State(state): State<AppState>) -> Response {
    let entries = match state.reports().list().await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Listing reports failed: {}", e);
            return error_page(&state, StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    #[derive(Serialize)]
    struct Row {
        name: String,
        modified: String,
    }
    let rows: Vec<Row> = entries
        .into_iter()
        .map(|e| Row {
            modified: e.modified.format("%Y-%m-%d %H:%M:%S").to_string(),
            name: e.name,
        })
        .collect();

    let mut ctx = base_context(&state);
    ctx.insert("reports", &rows);
    render_page(&state, "reports.html", &ctx)
}

fn not_found_message(name: &str) -> String {
    ReportError::NotFound(name.to_string()).to_string()
}

/// Report viewer, markdown rendered as HTML
pub async fn report_view(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.reports().read(&name).await {
        Ok(markdown) => {
            let mut ctx = base_context(&state);
            ctx.insert("name", &name);
            ctx.insert("report_html", &markdown_to_html(&markdown));
            render_page(&state, "report.html", &ctx)
        }
        Err(ReportError::NotFound(_)) | Err(ReportError::InvalidName(_)) => {
            error_page(&state, StatusCode::NOT_FOUND, &not_found_message(&name))
        }
        Err(e) => {
            tracing::error!("Reading report {} failed: {}", name, e);
            error_page(&state, StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// JSON research endpoint
pub async fn api_research(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Response {
    match state.manager.run(&request.query).await {
        Ok(output) => Json(ResearchResponse::from(output)).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// JSON list of saved reports
pub async fn api_reports(State(state): State<AppState>) -> Response {
    match state.reports().list().await {
        Ok(entries) => Json::<Vec<ReportEntry>>(entries).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Raw markdown of one saved report
pub async fn api_report_raw(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.reports().read(&name).await {
        Ok(markdown) => (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            markdown,
        )
            .into_response(),
        Err(ReportError::NotFound(_)) | Err(ReportError::InvalidName(_)) => {
            (StatusCode::NOT_FOUND, not_found_message(&name)).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Stats page handler
pub async fn stats(State(state): State<AppState>) -> Response {
    let mut ctx = base_context(&state);
    let snapshot = state.metrics().snapshot();
    ctx.insert(
        "reliability",
        &format!("{:.1}%", snapshot.search_reliability),
    );
    ctx.insert("stats", &snapshot);
    ctx.insert("output_dir", &state.reports().dir().display().to_string());
    ctx.insert("search_backend", &format!("{:?}", state.settings.research.search_backend));
    ctx.insert("search_count", &state.settings.research.search_count);
    render_page(&state, "stats.html", &ctx)
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// Favicon handler
pub async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
