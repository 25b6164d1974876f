// Job extraction and cold email drafting.
// Both operations talk to the model only through `CompletionModel`.

use thiserror::Error;

use crate::llm_client::LlmError;

pub mod extractor;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod prompts;

/// Message shown for every unparseable extraction reply.
pub const JOB_PARSE_MESSAGE: &str = "Context too big. Unable to parse jobs.";

#[derive(Debug, Error)]
pub enum OutreachError {
    /// The model call itself failed. Passed through unchanged.
    #[error(transparent)]
    Remote(#[from] LlmError),

    /// The model answered, but not with usable JSON.
    /// The parser's own diagnostic stays reachable through `source()`.
    #[error("{}", JOB_PARSE_MESSAGE)]
    JobParse {
        #[source]
        source: serde_json::Error,
    },
}
