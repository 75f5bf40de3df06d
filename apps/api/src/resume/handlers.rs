use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{GithubProject, ResumeDocument, Section};
use crate::resume::markdown::{export_markdown, ExportOutcome};
use crate::resume::normalize::{add_raw_entry, normalize};
use crate::resume::recommendations::{build_report, RecommendationReport};
use crate::resume::store::{load_document, update_document, LoadedResume};
use crate::resume::templates::{all_templates, TemplateInfo};
use crate::resume::validation::{validate_document, ValidationReport};
use crate::resume::view::{build_view, ResumeView};
use crate::state::AppState;

/// Either part may be omitted; an omitted part keeps its stored value.
#[derive(Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Deserialize)]
pub struct AboutRequest {
    pub about: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub title: String,
    pub document: ResumeDocument,
    pub updated_at: Option<DateTime<Utc>>,
    pub report: RecommendationReport,
}

impl ResumeResponse {
    fn new(user_id: Uuid, loaded: LoadedResume) -> Self {
        Self {
            report: build_report(&loaded.document),
            id: loaded.id,
            user_id,
            title: loaded.title,
            document: loaded.document,
            updated_at: loaded.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(flatten)]
    pub report: ValidationReport,
}

#[derive(Serialize)]
pub struct EntryAdded {
    pub id: String,
    pub resume: ResumeResponse,
}

fn parse_section(raw: &str) -> Result<Section, AppError> {
    Section::parse(raw).ok_or_else(|| AppError::Validation(format!("Unknown section '{raw}'")))
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(all_templates())
}

/// POST /api/v1/resumes/normalize
pub async fn handle_normalize(Json(raw): Json<Value>) -> Json<ResumeDocument> {
    Json(normalize(&raw))
}

/// POST /api/v1/resumes/recommendations
pub async fn handle_recommendations(Json(raw): Json<Value>) -> Json<RecommendationReport> {
    Json(build_report(&normalize(&raw)))
}

/// POST /api/v1/resumes/validate
pub async fn handle_validate(Json(raw): Json<Value>) -> Json<ValidateResponse> {
    let report = validate_document(&normalize(&raw));
    Json(ValidateResponse {
        valid: report.is_valid(),
        report,
    })
}

/// POST /api/v1/resumes/preview
pub async fn handle_preview(Json(raw): Json<Value>) -> Json<ResumeView> {
    Json(build_view(&normalize(&raw)))
}

/// POST /api/v1/resumes/export/markdown
pub async fn handle_export_markdown(Json(raw): Json<Value>) -> Json<ExportOutcome> {
    Json(export_markdown(&normalize(&raw)))
}

/// GET /api/v1/resumes/:user_id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ResumeResponse>, AppError> {
    let loaded = load_document(state.store.as_ref(), user_id).await?;
    Ok(Json(ResumeResponse::new(user_id, loaded)))
}

/// PUT /api/v1/resumes/:user_id
pub async fn handle_save_resume(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<ResumeResponse>, AppError> {
    if req.title.is_none() && req.data.is_none() {
        return Err(AppError::Validation(
            "Request must carry `data`, `title` or both".to_string(),
        ));
    }
    let doc = req.data.as_ref().map(normalize);
    let title = req.title;

    let saved = update_document(
        state.store.as_ref(),
        user_id,
        Box::new(move |draft: &mut LoadedResume| {
            if let Some(doc) = doc {
                draft.document = doc;
            }
            if let Some(title) = title {
                draft.title = title;
            }
            Ok(())
        }),
    )
    .await?;
    Ok(Json(ResumeResponse::new(user_id, saved)))
}

/// PUT /api/v1/resumes/:user_id/about
pub async fn handle_set_about(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AboutRequest>,
) -> Result<Json<ResumeResponse>, AppError> {
    let saved = update_document(
        state.store.as_ref(),
        user_id,
        Box::new(|draft: &mut LoadedResume| {
            draft.document.set_about(&req.about);
            Ok(())
        }),
    )
    .await?;
    Ok(Json(ResumeResponse::new(user_id, saved)))
}

/// POST /api/v1/resumes/:user_id/entries/:section
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path((user_id, section)): Path<(Uuid, String)>,
    Json(raw): Json<Value>,
) -> Result<(StatusCode, Json<EntryAdded>), AppError> {
    let section = parse_section(&section)?;

    let mut added = None;
    let saved = update_document(
        state.store.as_ref(),
        user_id,
        Box::new(|draft: &mut LoadedResume| {
            let id = add_raw_entry(&mut draft.document, section, &raw).ok_or_else(|| {
                AppError::Validation("Entry has an unsupported shape".to_string())
            })?;
            added = Some(id);
            Ok(())
        }),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(EntryAdded {
            id: added.unwrap_or_default(),
            resume: ResumeResponse::new(user_id, saved),
        }),
    ))
}

/// DELETE /api/v1/resumes/:user_id/entries/:section/:entry_id
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((user_id, section, entry_id)): Path<(Uuid, String, String)>,
) -> Result<Json<ResumeResponse>, AppError> {
    let section = parse_section(&section)?;
    let saved = update_document(
        state.store.as_ref(),
        user_id,
        Box::new(|draft: &mut LoadedResume| {
            if draft.document.remove_entry(section, &entry_id) {
                Ok(())
            } else {
                Err(AppError::NotFound(format!("Entry {entry_id} not found")))
            }
        }),
    )
    .await?;
    Ok(Json(ResumeResponse::new(user_id, saved)))
}

/// POST /api/v1/resumes/:user_id/export/markdown
///
/// Exports the stored résumé. With an archive bucket configured the file is
/// also uploaded and a short-lived link is attached; an upload failure leaves
/// the inline content intact.
pub async fn handle_export_stored(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ExportOutcome>, AppError> {
    let loaded = load_document(state.store.as_ref(), user_id).await?;
    let resume_id = loaded
        .id
        .ok_or_else(|| AppError::NotFound(format!("No saved résumé for user {user_id}")))?;

    let mut outcome = export_markdown(&loaded.document);
    if let (true, Some(archive), Some(content)) =
        (outcome.success, &state.archive, outcome.content.as_deref())
    {
        match archive.store_markdown(user_id, resume_id, content).await {
            Ok(archived) => {
                info!("Archived export for user {user_id} at {}", archived.key);
                outcome.download_url = Some(archived.download_url);
            }
            Err(e) => warn!("Export archive unavailable for user {user_id}: {e}"),
        }
    }
    Ok(Json(outcome))
}

/// GET /api/v1/github/:username/repos
pub async fn handle_github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<GithubProject>>, AppError> {
    Ok(Json(state.github.fetch_recent_repos(&username).await?))
}

/// POST /api/v1/resumes/:user_id/import/github/:username
///
/// Replaces the stored GitHub section with the user's most recent repositories.
pub async fn handle_github_import(
    State(state): State<AppState>,
    Path((user_id, username)): Path<(Uuid, String)>,
) -> Result<Json<ResumeResponse>, AppError> {
    let repos = state.github.fetch_recent_repos(&username).await?;
    info!("Importing {} repositories from {username} for user {user_id}", repos.len());

    let saved = update_document(
        state.store.as_ref(),
        user_id,
        Box::new(move |draft: &mut LoadedResume| {
            draft.document.replace_github_projects(repos);
            Ok(())
        }),
    )
    .await?;
    Ok(Json(ResumeResponse::new(user_id, saved)))
}
