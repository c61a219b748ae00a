//! Classification prompt template, shared by all provider strategies.

/// Build the prompt instructing the provider to answer with a bare two-key
/// JSON object drawn from the closed enumerations.
pub fn classification_prompt(description: &str) -> String {
    format!(
        r#"Analyze this support ticket description and classify it.

Description: {}

Respond with ONLY a JSON object (no markdown, no extra text):
{{"category": "billing|technical|account|general", "priority": "low|medium|high|critical"}}

Guidelines:
- billing: Payment, invoicing, subscription issues
- technical: Software bugs, feature requests, technical issues
- account: Profile, password, access issues
- general: Other questions
- priority: Critical if urgent/blocking, High if important, Medium if normal, Low if minor
"#,
        description
    )
}
