//! Summarize stage: cleaned page text in, structured analysis out.
//!
//! The completion is returned verbatim; it is requested as JSON but never
//! parsed here. Provider failures are folded into [`Analysis::Failed`].

use companyscout_crawler::CleanedDocument;
use companyscout_shared::{Analysis, LlmConfig, ResearchError};
use tracing::{info, instrument, warn};

use crate::completion::{ChatMessage, CompletionClient, CompletionRequest};

/// Upper bound on page text kept for analysis, in characters.
pub const MAX_CONTENT_CHARS: usize = 6000;

/// Portion of the kept text embedded in the prompt, in characters.
pub const PROMPT_CONTENT_CHARS: usize = 3000;

/// System message sent with every request.
pub const SYSTEM_PROMPT: &str = "Extract company info as JSON only.";

/// Truncate page text to [`MAX_CONTENT_CHARS`] characters.
pub fn prepare_content(text: &str) -> &str {
    take_chars(text, MAX_CONTENT_CHARS)
}

/// Prefix of `text` holding at most `n` characters.
fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// User prompt asking for the five pricing/market fields.
pub fn build_prompt(company_name: &str, content: &str) -> String {
    let excerpt = take_chars(content, PROMPT_CONTENT_CHARS);
    format!(
        r#"Extract these details from {company_name}'s website and return as JSON:

{{
    "cheapest_plan": "price or 'Not found'",
    "free_trial": "Yes/No/Not mentioned",
    "enterprise_plan": "Yes/No/Not mentioned",
    "api_availability": "Yes/No/Not mentioned",
    "market_type": "B2B/B2C/Not clear"
}}

Content: {excerpt}"#
    )
}

/// Assemble the full completion request for a page.
pub fn build_request(llm: &LlmConfig, company_name: &str, text: &str) -> CompletionRequest {
    let content = prepare_content(text);
    CompletionRequest {
        model: llm.model.clone(),
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(company_name, content)),
        ],
        temperature: llm.temperature,
        max_tokens: llm.max_tokens,
    }
}

/// Ask the completion provider to analyze `doc`. Never fails.
#[instrument(skip_all, fields(company = %company_name, client = client.name()))]
pub async fn summarize<C: CompletionClient>(
    client: &C,
    llm: &LlmConfig,
    company_name: &str,
    doc: &CleanedDocument,
) -> Analysis {
    let request = build_request(llm, company_name, &doc.text);

    match client.complete(&request).await {
        Ok(text) => {
            info!(chars = text.chars().count(), "analysis completed");
            Analysis::Completed(text)
        }
        Err(e) => {
            warn!(error = %e, "analysis failed");
            let message = match e {
                ResearchError::Completion(message) => message,
                other => other.to_string(),
            };
            Analysis::Failed(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companyscout_shared::Result;
    use std::sync::Mutex;

    /// Records the last request and replies with a fixed result.
    struct ScriptedClient {
        reply: std::result::Result<String, String>,
        seen: Mutex<Option<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn new(reply: std::result::Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                seen: Mutex::new(None),
            }
        }
    }

    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            *self.seen.lock().unwrap() = Some(request.clone());
            self.reply.clone().map_err(ResearchError::Completion)
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn doc(text: String) -> CleanedDocument {
        CleanedDocument {
            url: "https://acme.com/".into(),
            status: 200,
            title: None,
            text,
        }
    }

    #[test]
    fn truncates_by_characters() {
        let text = "é".repeat(7000);
        let kept = prepare_content(&text);
        assert_eq!(kept.chars().count(), MAX_CONTENT_CHARS);

        let short = "short page";
        assert_eq!(prepare_content(short), short);
    }

    #[test]
    fn prompt_embeds_first_3000_chars() {
        let content = format!("{}{}", "a".repeat(PROMPT_CONTENT_CHARS), "TAIL");
        let prompt = build_prompt("Acme", &content);
        assert!(prompt.starts_with("Extract these details from Acme's website"));
        assert!(prompt.contains(&"a".repeat(PROMPT_CONTENT_CHARS)));
        assert!(!prompt.contains("TAIL"));
        for field in [
            "cheapest_plan",
            "free_trial",
            "enterprise_plan",
            "api_availability",
            "market_type",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }

    #[tokio::test]
    async fn sends_configured_parameters() {
        let client = ScriptedClient::new(Ok(r#"{"market_type": "B2B"}"#));
        let analysis = summarize(
            &client,
            &LlmConfig::default(),
            "Acme",
            &doc("Pricing from $10/mo".into()),
        )
        .await;

        assert_eq!(
            analysis,
            Analysis::Completed(r#"{"market_type": "B2B"}"#.into())
        );

        let request = client.seen.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, 0.1);
        assert_eq!(request.max_tokens, 300);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert!(request.messages[1].content.contains("Pricing from $10/mo"));
    }

    #[tokio::test]
    async fn provider_error_becomes_failed_analysis() {
        let client = ScriptedClient::new(Err("HTTP 500 Internal Server Error"));
        let analysis = summarize(&client, &LlmConfig::default(), "Acme", &doc(String::new())).await;

        assert!(analysis.is_failed());
        let text = analysis.into_text();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(
            parsed["error"]
                .as_str()
                .unwrap()
                .starts_with("Analysis failed: HTTP 500")
        );
    }
}
