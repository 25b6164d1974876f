//! Job extractor — turns scraped careers-page text into `JobPosting` records.

use serde::{de, Deserialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::llm_client::{strip_json_fences, CompletionModel};
use crate::outreach::models::JobPosting;
use crate::outreach::prompts::{fill_template, JOB_EXTRACT_PROMPT_TEMPLATE};
use crate::outreach::OutreachError;

/// Asks the model for every posting in `page_text`.
///
/// The whole reply is rejected if any part of it fails to parse; there is no
/// partial result.
pub async fn extract_jobs(
    llm: &dyn CompletionModel,
    page_text: &str,
) -> Result<Vec<JobPosting>, OutreachError> {
    let prompt = build_extract_prompt(page_text);
    debug!(
        "Extracting jobs: page_len={}, prompt_len={}",
        page_text.len(),
        prompt.len()
    );

    let reply = llm.complete(&prompt).await?;
    let jobs = parse_jobs(&reply)?;

    info!("Extracted {} job posting(s)", jobs.len());
    Ok(jobs)
}

fn build_extract_prompt(page_text: &str) -> String {
    fill_template(JOB_EXTRACT_PROMPT_TEMPLATE, &[("page_data", page_text)])
}

/// Parses a model reply into postings, wrapping a single object into a list.
pub fn parse_jobs(reply: &str) -> Result<Vec<JobPosting>, OutreachError> {
    // Parse to a Value first so a syntax error and a shape error are logged
    // differently; both surface as the same JobParse error.
    let value: Value =
        serde_json::from_str(strip_json_fences(reply)).map_err(|source| {
            warn!(
                "Model reply is not valid JSON (reply_len={}): {source}",
                reply.len()
            );
            OutreachError::JobParse { source }
        })?;

    normalize(value).map_err(|source| {
        warn!("Model reply has an unexpected shape: {source}");
        OutreachError::JobParse { source }
    })
}

/// A list becomes one posting per element, a lone object a one-element list.
/// Anything else is rejected.
fn normalize(value: Value) -> Result<Vec<JobPosting>, serde_json::Error> {
    match value {
        Value::Array(items) => items.into_iter().map(posting_from).collect(),
        Value::Object(_) => Ok(vec![posting_from(value)?]),
        other => Err(de::Error::custom(format!(
            "expected a list of job objects, found {other}"
        ))),
    }
}

fn posting_from(value: Value) -> Result<JobPosting, serde_json::Error> {
    if !value.is_object() {
        return Err(de::Error::custom("each job posting must be a JSON object"));
    }
    JobPosting::deserialize(value)
}
