//! BrightID node client.

use async_trait::async_trait;
use notabot_protocol::{Address, Evidence, Source};
use serde::Deserialize;
use tracing::debug;

use super::{invalid_response, status_error, transport_error, EvidenceProvider};
use crate::error::OracleError;

pub const DEFAULT_NODE_URL: &str = "https://app.brightid.org/node/v6";
pub const DEFAULT_CONTEXT: &str = "NotABot";

pub struct BrightIdProvider {
    client: reqwest::Client,
    node_url: String,
    context: String,
}

#[derive(Debug, Deserialize)]
struct VerificationResponse {
    data: Option<VerificationData>,
}

#[derive(Debug, Deserialize)]
struct VerificationData {
    #[serde(default)]
    unique: bool,
    #[serde(default, rename = "contextIds")]
    context_ids: Vec<String>,
}

impl BrightIdProvider {
    pub fn new(client: reqwest::Client, node_url: &str, context: &str) -> Self {
        Self {
            client,
            node_url: node_url.trim_end_matches('/').to_string(),
            context: context.to_string(),
        }
    }
}

fn evidence_from(resp: VerificationResponse, context_id: &str) -> Result<Evidence, OracleError> {
    match resp.data {
        Some(data) if data.unique => Ok(Evidence {
            score: None,
            provider_datum: data
                .context_ids
                .into_iter()
                .next()
                .unwrap_or_else(|| context_id.to_string()),
        }),
        _ => Err(OracleError::NoRecordFound(Source::BrightId)),
    }
}

#[async_trait]
impl EvidenceProvider for BrightIdProvider {
    fn source(&self) -> Source {
        Source::BrightId
    }

    async fn fetch_evidence(&self, subject: &Address) -> Result<Evidence, OracleError> {
        let context_id = subject.to_hex();
        let url = format!(
            "{}/verifications/{}/{}",
            self.node_url, self.context, context_id
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(Source::BrightId, e))?;

        if !response.status().is_success() {
            return Err(status_error(Source::BrightId, response.status()));
        }

        let parsed: VerificationResponse = response
            .json()
            .await
            .map_err(|e| invalid_response(Source::BrightId, e))?;
        let evidence = evidence_from(parsed, &context_id)?;
        debug!(%subject, "brightid verification found");
        Ok(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CTX: &str = "0x00000000000000000000000000000000000000aa";

    fn parse(v: serde_json::Value) -> Result<Evidence, OracleError> {
        evidence_from(serde_json::from_value(v).unwrap(), CTX)
    }

    #[test]
    fn first_context_id_is_datum() {
        let ev = parse(json!({ "data": { "unique": true, "contextIds": ["ctx-1", "ctx-0"] } })).unwrap();
        assert_eq!(ev.provider_datum, "ctx-1");
        assert_eq!(ev.score, None);
    }

    #[test]
    fn falls_back_to_address() {
        let ev = parse(json!({ "data": { "unique": true } })).unwrap();
        assert_eq!(ev.provider_datum, CTX);
    }

    #[test]
    fn not_unique_is_no_record() {
        assert!(matches!(
            parse(json!({ "data": { "unique": false } })),
            Err(OracleError::NoRecordFound(Source::BrightId))
        ));
        assert!(parse(json!({})).is_err());
    }
}
