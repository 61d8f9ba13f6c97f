use std::io::ErrorKind;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use pdfplum::TemplateSource;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, Result},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/preview", get(preview_template).post(render_preview))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub template_path: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewQuery {
    pub template_path: Option<String>,
}

pub async fn preview_template(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<Html<String>> {
    materialize_index(&state, query.template_path, None).await
}

pub async fn render_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Html<String>> {
    materialize_index(&state, request.template_path, request.data).await
}

/// Materialize the template and return its rendered `index.html`.
///
/// The materialized directory is removed once the page has been read.
async fn materialize_index(
    state: &AppState,
    template_path: Option<String>,
    data: Option<Value>,
) -> Result<Html<String>> {
    let template_path = template_path
        .or_else(|| state.config.template_path.clone())
        .ok_or_else(|| ApiError::bad_request("No templatePath given and no TEMPLATE_PATH configured"))?;

    if let Some(data) = &data {
        if !data.is_object() {
            return Err(ApiError::bad_request("'data' should be an object"));
        }
    }

    let source = TemplateSource::parse(&template_path)?;
    let template = state.materializer.materialize(&source, data.as_ref()).await?;

    let html = match tokio::fs::read_to_string(template.index_path()).await {
        Ok(html) => html,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ApiError::Unprocessable(format!(
                "Template {} has no index.html",
                source
            )));
        }
        Err(e) => return Err(e.into()),
    };

    info!(template = %source, bytes = html.len(), "Rendered template preview");
    Ok(Html(html))
}
