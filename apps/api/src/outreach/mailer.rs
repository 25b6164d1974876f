//! Cold email drafting for a single job posting.

use serde::Serialize;
use tracing::{debug, info};

use crate::llm_client::CompletionModel;
use crate::outreach::models::{JobPosting, PortfolioLink, SenderProfile};
use crate::outreach::prompts::{fill_template, EMAIL_PROMPT_TEMPLATE};
use crate::outreach::OutreachError;

/// Drafts an application email for `job`, written as the default sender.
pub async fn write_mail(
    llm: &dyn CompletionModel,
    job: &JobPosting,
    links: &[PortfolioLink],
) -> Result<String, OutreachError> {
    write_mail_as(llm, &SenderProfile::default(), job, links).await
}

/// Drafts an application email for `job`, written as `sender`.
///
/// The model's reply is returned verbatim. Nothing checks that it starts with
/// a `Subject:` line or respects the requested length.
pub async fn write_mail_as(
    llm: &dyn CompletionModel,
    sender: &SenderProfile,
    job: &JobPosting,
    links: &[PortfolioLink],
) -> Result<String, OutreachError> {
    let prompt = build_email_prompt(sender, job, links);
    debug!(
        "Drafting email: role={:?}, links={}, prompt_len={}",
        job.role,
        links.len(),
        prompt.len()
    );

    let email = llm.complete(&prompt).await?;

    info!("Drafted email for role {:?} ({} chars)", job.role, email.len());
    Ok(email)
}

fn build_email_prompt(sender: &SenderProfile, job: &JobPosting, links: &[PortfolioLink]) -> String {
    let highlights = sender
        .highlights
        .iter()
        .map(|h| format!("- {h}"))
        .collect::<Vec<_>>()
        .join("\n");

    let link_list = to_prompt_json(links);
    let job_description = to_prompt_json(job);

    fill_template(
        EMAIL_PROMPT_TEMPLATE,
        &[
            ("sender_name", sender.name.as_str()),
            ("sender_headline", sender.headline.as_str()),
            ("sender_highlights", highlights.as_str()),
            ("link_list", link_list.as_str()),
            ("job_description", job_description.as_str()),
        ],
    )
}

/// Compact JSON rendering of a value for embedding in a prompt.
fn to_prompt_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Records of plain strings always serialize.
    serde_json::to_string(value).unwrap_or_default()
}
