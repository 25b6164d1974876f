//! Axum route handlers for the outreach API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::outreach::extractor::extract_jobs;
use crate::outreach::mailer::{write_mail, write_mail_as};
use crate::outreach::models::{split_subject, JobPosting, PortfolioLink, SenderProfile};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractJobsRequest {
    pub page_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractJobsResponse {
    pub jobs: Vec<JobPosting>,
}

#[derive(Debug, Deserialize)]
pub struct WriteMailRequest {
    pub job: JobPosting,
    #[serde(default)]
    pub links: Vec<PortfolioLink>,
    /// Overrides the default sender persona for this draft only.
    pub sender: Option<SenderProfile>,
}

#[derive(Debug, Serialize)]
pub struct WriteMailResponse {
    /// The draft exactly as the model wrote it.
    pub email: String,
    /// Parsed from a leading `Subject:` line, when there is one.
    pub subject: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/extract
///
/// Extracts every job posting from cleaned careers-page text.
pub async fn handle_extract_jobs(
    State(state): State<AppState>,
    Json(request): Json<ExtractJobsRequest>,
) -> Result<Json<ExtractJobsResponse>, AppError> {
    if request.page_text.trim().is_empty() {
        return Err(AppError::Validation("page_text cannot be empty".to_string()));
    }

    let jobs = extract_jobs(state.llm.as_ref(), &request.page_text).await?;

    Ok(Json(ExtractJobsResponse { jobs }))
}

/// POST /api/v1/mail
///
/// Drafts a cold application email for one posting.
pub async fn handle_write_mail(
    State(state): State<AppState>,
    Json(request): Json<WriteMailRequest>,
) -> Result<Json<WriteMailResponse>, AppError> {
    let llm = state.llm.as_ref();
    let email = match &request.sender {
        Some(sender) => write_mail_as(llm, sender, &request.job, &request.links).await?,
        None => write_mail(llm, &request.job, &request.links).await?,
    };
    let subject = split_subject(&email).0.map(str::to_owned);

    Ok(Json(WriteMailResponse { email, subject }))
}
