//! Proof of Humanity registry client (GraphQL subgraph).

use async_trait::async_trait;
use notabot_protocol::{Address, Evidence, Source};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{invalid_response, status_error, transport_error, EvidenceProvider};
use crate::error::OracleError;

pub const DEFAULT_GRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/kleros/proof-of-humanity-mainnet";

const SUBMISSION_QUERY: &str =
    "query($id: ID!) { submission(id: $id) { id registered submissionTime } }";

pub struct PohProvider {
    client: reqwest::Client,
    graph_url: String,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<GraphData>,
}

#[derive(Debug, Deserialize)]
struct GraphData {
    submission: Option<Submission>,
}

#[derive(Debug, Deserialize)]
struct Submission {
    id: String,
    #[serde(default)]
    registered: bool,
}

impl PohProvider {
    pub fn new(client: reqwest::Client, graph_url: &str) -> Self {
        Self {
            client,
            graph_url: graph_url.to_string(),
        }
    }
}

/// Registered submission → evidence; anything else is "no record".
fn evidence_from(resp: GraphResponse) -> Result<Evidence, OracleError> {
    match resp.data.and_then(|d| d.submission) {
        Some(sub) if sub.registered => Ok(Evidence {
            score: None,
            provider_datum: sub.id,
        }),
        _ => Err(OracleError::NoRecordFound(Source::Poh)),
    }
}

#[async_trait]
impl EvidenceProvider for PohProvider {
    fn source(&self) -> Source {
        Source::Poh
    }

    async fn fetch_evidence(&self, subject: &Address) -> Result<Evidence, OracleError> {
        let body = json!({
            "query": SUBMISSION_QUERY,
            "variables": { "id": subject.to_hex() },
        });
        let response = self
            .client
            .post(&self.graph_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Source::Poh, e))?;

        if !response.status().is_success() {
            return Err(status_error(Source::Poh, response.status()));
        }

        let parsed: GraphResponse = response
            .json()
            .await
            .map_err(|e| invalid_response(Source::Poh, e))?;
        let evidence = evidence_from(parsed)?;
        debug!(%subject, "poh submission found");
        Ok(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(v: serde_json::Value) -> Result<Evidence, OracleError> {
        evidence_from(serde_json::from_value(v).unwrap())
    }

    #[test]
    fn registered_submission_uses_id() {
        let ev = parse(json!({
            "data": { "submission": { "id": "0xabc", "registered": true, "submissionTime": "1600000000" } }
        }))
        .unwrap();
        assert_eq!(ev.score, None);
        assert_eq!(ev.provider_datum, "0xabc");
    }

    #[test]
    fn unregistered_or_missing_is_no_record() {
        let unregistered = json!({ "data": { "submission": { "id": "0xabc", "registered": false } } });
        assert!(matches!(parse(unregistered), Err(OracleError::NoRecordFound(Source::Poh))));
        assert!(matches!(
            parse(json!({ "data": { "submission": null } })),
            Err(OracleError::NoRecordFound(Source::Poh))
        ));
    }
}
