//! Gitcoin Passport scorer client.

use async_trait::async_trait;
use notabot_protocol::{Address, Evidence, Source};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{invalid_response, status_error, transport_error, EvidenceProvider};
use crate::error::OracleError;

pub const DEFAULT_BASE_URL: &str = "https://api.scorer.gitcoin.co";

pub struct GitcoinProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    scorer_id: String,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    /// The scorer returns a decimal string, older versions a number.
    score: Option<Value>,
    #[serde(default)]
    evidence: Option<ScoreEvidence>,
}

#[derive(Debug, Deserialize)]
struct ScoreEvidence {
    #[serde(rename = "rawScore")]
    raw_score: Option<Value>,
}

impl GitcoinProvider {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, scorer_id: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            scorer_id: scorer_id.to_string(),
        }
    }
}

/// String or number, rendered without quotes.
fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Floor a decimal score to an integer. Unparseable or negative is zero.
fn floor_score(text: &str) -> u64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| s.floor() as u64)
        .unwrap_or(0)
}

fn evidence_from(resp: ScoreResponse) -> Evidence {
    let score_text = resp.score.as_ref().and_then(value_text);
    let score = score_text.as_deref().map(floor_score).unwrap_or(0);
    let provider_datum = resp
        .evidence
        .and_then(|e| e.raw_score)
        .as_ref()
        .and_then(value_text)
        .or(score_text)
        .unwrap_or_else(|| score.to_string());
    Evidence {
        score: Some(score),
        provider_datum,
    }
}

#[async_trait]
impl EvidenceProvider for GitcoinProvider {
    fn source(&self) -> Source {
        Source::Gitcoin
    }

    async fn fetch_evidence(&self, subject: &Address) -> Result<Evidence, OracleError> {
        let url = format!(
            "{}/registry/score/{}/{}",
            self.base_url, self.scorer_id, subject
        );
        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| transport_error(Source::Gitcoin, e))?;

        if !response.status().is_success() {
            return Err(status_error(Source::Gitcoin, response.status()));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| invalid_response(Source::Gitcoin, e))?;
        let evidence = evidence_from(body);
        debug!(%subject, score = ?evidence.score, "gitcoin passport score fetched");
        Ok(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Evidence {
        evidence_from(serde_json::from_value(v).unwrap())
    }

    #[test]
    fn score_is_floored() {
        let ev = parse(json!({ "score": "42.97", "status": "DONE" }));
        assert_eq!(ev.score, Some(42));
        assert_eq!(ev.provider_datum, "42.97");
    }

    #[test]
    fn raw_score_is_preferred_datum() {
        let ev = parse(json!({ "score": "1.0", "evidence": { "rawScore": "31.5" } }));
        assert_eq!(ev.score, Some(1));
        assert_eq!(ev.provider_datum, "31.5");
    }

    #[test]
    fn numeric_fields_accepted() {
        let ev = parse(json!({ "score": 25.5, "evidence": { "rawScore": 25.5 } }));
        assert_eq!(ev.score, Some(25));
        assert_eq!(ev.provider_datum, "25.5");
    }

    #[test]
    fn missing_score_is_zero() {
        let ev = parse(json!({ "score": null }));
        assert_eq!(ev.score, Some(0));
        assert_eq!(ev.provider_datum, "0");
        assert_eq!(floor_score("garbage"), 0);
        assert_eq!(floor_score("-3"), 0);
    }
}
