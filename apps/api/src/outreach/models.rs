//! Records exchanged by the extraction and drafting operations.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Stand-in for any field the page text did not mention.
pub const NOT_SPECIFIED: &str = "Not specified";

/// One job posting extracted from a careers page.
///
/// Every field is always present. Gaps are filled with `NOT_SPECIFIED` while
/// deserializing, so downstream code never sees null or a missing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default = "not_specified", deserialize_with = "lenient_text")]
    pub role: String,
    /// Free-form, e.g. "2+ years".
    #[serde(default = "not_specified", deserialize_with = "lenient_text")]
    pub experience: String,
    /// Comma-separated list.
    #[serde(default = "not_specified", deserialize_with = "lenient_text")]
    pub skills: String,
    #[serde(default = "not_specified", deserialize_with = "lenient_text")]
    pub description: String,
}

impl Default for JobPosting {
    fn default() -> Self {
        Self {
            role: not_specified(),
            experience: not_specified(),
            skills: not_specified(),
            description: not_specified(),
        }
    }
}

fn not_specified() -> String {
    NOT_SPECIFIED.to_string()
}

/// Accepts whatever the model put in a field and turns it into text.
///
/// null / blank → sentinel, numbers and booleans → their literal form,
/// arrays → elements joined with ", ". Objects are rejected.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => {
            return Err(serde::de::Error::custom(
                "expected text, found a nested object",
            ))
        }
    };

    if text.trim().is_empty() {
        Ok(not_specified())
    } else {
        Ok(text)
    }
}

/// A portfolio link the applicant can point recruiters at.
/// Passed through to the prompt untouched; never validated or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioLink {
    pub url: String,
    #[serde(alias = "desc")]
    pub description: String,
}

/// The persona the drafted email is written as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    pub name: String,
    /// One line: role plus core skills.
    pub headline: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl Default for SenderProfile {
    fn default() -> Self {
        Self {
            name: "Rohith Reddy Rudraiah Gari".to_string(),
            headline: "a Data Analyst skilled in Python, SQL, Power BI, and data-driven solutions"
                .to_string(),
            highlights: vec![
                "AtliQ Mart supply-chain analytics (improved delivery KPI tracking with Power BI)"
                    .to_string(),
                "GoodCabs transportation insights".to_string(),
                "Sports analytics dashboards".to_string(),
                "A Gen-AI powered application for automated email drafting.".to_string(),
            ],
        }
    }
}

/// Splits a drafted email into its `Subject:` line and the remaining body.
///
/// Drafts are not validated, so a missing subject line is not an error: the
/// whole text comes back as the body.
pub fn split_subject(email: &str) -> (Option<&str>, &str) {
    let trimmed = email.trim_start();
    let (first, rest) = match trimmed.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (trimmed, ""),
    };

    match first.trim().strip_prefix("Subject:") {
        Some(subject) => (Some(subject.trim()), rest.trim_start_matches(['\r', '\n'])),
        None => (None, email),
    }
}
