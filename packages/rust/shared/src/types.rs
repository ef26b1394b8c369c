//! Core domain types for CompanyScout research runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Lookup,
    Fetch,
    Summarize,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::Fetch => "fetch",
            Self::Summarize => "summarize",
            Self::Persist => "persist",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Outcome of the summarize stage.
///
/// Provider failures are captured here instead of being raised, so the
/// pipeline always has some text to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    /// Raw completion text. Nominally JSON, never validated.
    Completed(String),
    /// The provider call failed with this message.
    Failed(String),
}

impl Analysis {
    /// Text form stored and rendered downstream.
    ///
    /// `Failed` becomes `{"error": "Analysis failed: <message>"}`, which is
    /// always valid JSON.
    pub fn into_text(self) -> String {
        match self {
            Self::Completed(text) => text,
            Self::Failed(message) => serde_json::json!({
                "error": format!("Analysis failed: {message}"),
            })
            .to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Render stored analysis text for display.
///
/// Valid JSON is pretty-printed; anything else is returned unchanged.
pub fn pretty_analysis(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}

// ---------------------------------------------------------------------------
// ExtractionResult / CompanyRecord
// ---------------------------------------------------------------------------

/// Transient result of one pipeline run, before and after persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub company_name: String,
    /// Resolved company website link.
    pub domain: String,
    /// Professional-network company profile, if the search surfaced one.
    pub linkedin_url: Option<String>,
    /// Summarize output (opaque, nominally JSON).
    pub analysis: String,
}

/// One persisted row of the `companies` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Store-assigned, auto-incrementing identifier.
    pub id: i64,
    pub company_name: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    pub analysis: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

impl CompanyRecord {
    /// Timestamp as a UTC datetime, if representable.
    pub fn stored_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let micros = (self.timestamp * 1_000_000.0).round() as i64;
        chrono::DateTime::from_timestamp_micros(micros)
    }
}

// ---------------------------------------------------------------------------
// ExtractionOutcome
// ---------------------------------------------------------------------------

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// All four stages completed; `id` is the stored row id.
    Success { data: ExtractionResult, id: String },
    /// A stage failed; later stages did not run.
    Failure { stage: Option<Stage>, error: String },
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Tagged JSON form: `{"success": true, "data": .., "id": ..}` or
    /// `{"success": false, "error": ..}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Success { data, id } => serde_json::json!({
                "success": true,
                "data": data,
                "id": id,
            }),
            Self::Failure { error, .. } => serde_json::json!({
                "success": false,
                "error": error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_analysis_is_json_with_error_key() {
        let text = Analysis::Failed(r#"timeout "after" 60s"#.into()).into_text();
        let parsed: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(
            parsed["error"].as_str(),
            Some(r#"Analysis failed: timeout "after" 60s"#)
        );
    }

    #[test]
    fn completed_analysis_is_passed_through() {
        let raw = "not json at all";
        assert_eq!(Analysis::Completed(raw.into()).into_text(), raw);
        assert!(!Analysis::Completed(raw.into()).is_failed());
    }

    #[test]
    fn pretty_analysis_formats_json_only() {
        let pretty = pretty_analysis(r#"{"free_trial":"Yes"}"#);
        assert_eq!(pretty, "{\n  \"free_trial\": \"Yes\"\n}");
        assert_eq!(pretty_analysis("Sorry, no JSON"), "Sorry, no JSON");
    }

    #[test]
    fn success_outcome_json_shape() {
        let outcome = ExtractionOutcome::Success {
            data: ExtractionResult {
                company_name: "Acme".into(),
                domain: "https://acme.com".into(),
                linkedin_url: None,
                analysis: "{}".into(),
            },
            id: "1".into(),
        };
        let json = outcome.to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["id"], "1");
        assert_eq!(json["data"]["domain"], "https://acme.com");
        assert!(json["data"]["linkedin_url"].is_null());
    }

    #[test]
    fn failure_outcome_json_shape() {
        let outcome = ExtractionOutcome::Failure {
            stage: Some(Stage::Lookup),
            error: "No results found for: UnknownXyz123".into(),
        };
        assert_eq!(
            outcome.to_json(),
            serde_json::json!({
                "success": false,
                "error": "No results found for: UnknownXyz123",
            })
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn record_timestamp_converts() {
        let record = CompanyRecord {
            id: 1,
            company_name: "Acme".into(),
            domain: "https://acme.com".into(),
            linkedin_url: None,
            analysis: "{}".into(),
            timestamp: 1_700_000_000.5,
        };
        let at = record.stored_at().expect("valid timestamp");
        assert_eq!(at.timestamp(), 1_700_000_000);
        assert_eq!(at.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Lookup.to_string(), "lookup");
        assert_eq!(Stage::Persist.as_str(), "persist");
    }
}
