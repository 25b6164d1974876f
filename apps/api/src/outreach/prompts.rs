// Prompt templates for job extraction and email drafting.
// Kept next to the operations that send them so a template change and the
// parsing that depends on it are reviewed together.

/// Job extraction prompt. Replace `{page_data}` before sending.
pub const JOB_EXTRACT_PROMPT_TEMPLATE: &str = r#"### SCRAPED TEXT FROM WEBSITE:
{page_data}

### INSTRUCTION:
You are an expert at extracting structured data from unstructured career-page text.

Your task:
- Identify all distinct job postings from the provided text.
- Return them strictly as a **valid JSON list**.
- Each job posting must be an object with the following keys:
  - "role": string
  - "experience": string (e.g., "2+ years" or "Not specified")
  - "skills": string (comma-separated list, or "Not specified")
  - "description": short plain-text summary of the role

Rules:
- Do NOT include any explanation, commentary, headings, or preamble.
- If multiple jobs are present, return all in a JSON list.
- If a field is missing in the source text, fill it with "Not specified".

### OUTPUT:
Return ONLY the JSON list of job postings."#;

/// Cold email prompt.
/// Replace: {job_description}, {link_list}, {sender_name}, {sender_headline},
///          {sender_highlights}
pub const EMAIL_PROMPT_TEMPLATE: &str = r#"### JOB DESCRIPTION:
{job_description}

### INSTRUCTION:
You are {sender_name}, {sender_headline}, with experience in:
{sender_highlights}

Your task is to write ONE professional job-application email for the above role.

STRICT RULES:
- DO NOT include, restate, or display the job-description text inside the email. Use it ONLY as context to tailor the message.
- Always use the provided job title EXACTLY as given in the job description when writing the Subject line and the opening sentence of the email.
- Select up to 3 most relevant items from {link_list}, and mention them briefly with a one-line result/outcome **without repeating your portfolio link after each project**.
- Include your portfolio link **only once, near the end of the email**, to invite the recruiter to learn more about your work.
- Start the email with a **Subject line** in the format:
  Subject: [A clear, short subject line that reflects applying for the specific job role]
- Then write the email body (120–150 words) in a polite, confident, and professional tone.
- Output ONLY ONE email — no variations, no extra notes.
- End with a courteous closing and an invitation for further discussion.

Remember you are {sender_name}.
Do not provide a preamble or explanation.

### EMAIL (NO PREAMBLE):"#;

/// Fills `{name}` placeholders in one left-to-right pass.
///
/// Substituted values are copied out verbatim and never scanned again, so a
/// value that itself contains `{name}` text stays as written. Braces that do
/// not form a known placeholder are kept.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];
        let value = candidate.find('}').and_then(|close| {
            let name = &candidate[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &candidate[close + 1..];
            }
            None => {
                out.push('{');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}
