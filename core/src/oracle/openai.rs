use crate::candidates::dependencies::DependencyGroup;
use crate::candidates::pairs::CandidatePair;
use crate::config::OracleConfig;
use crate::error::{CoreError, CoreResult};
use crate::oracle::endpoint::enforce_oracle_endpoint;
use crate::oracle::interface::{
    classify_oracle_error, ConflictOracle, OracleErrorCategory, OracleFailure, Verdict,
    DEPENDENCY_VERDICTS, ENDPOINT_VERDICTS,
};
use crate::oracle::prompt::{dependency_prompt, endpoint_prompt, ChatPrompt};
use crate::oracle::response::parse_verdict;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Production oracle: an OpenAI-compatible `chat/completions` endpoint.
pub struct ChatCompletionsOracle {
    client: reqwest::blocking::Client,
    config: OracleConfig,
}

impl ChatCompletionsOracle {
    pub fn new(config: OracleConfig) -> CoreResult<Self> {
        enforce_oracle_endpoint(&config.base_url)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Config(format!("cannot build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn complete(&self, prompt: &ChatPrompt) -> CoreResult<String> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "temperature": self.config.temperature,
        });
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        debug!("oracle request: {} prompt bytes", prompt.user.len());

        let res = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(transport_failure)?;
        let status = res.status();
        if !status.is_success() {
            let detail = res.text().unwrap_or_default();
            return Err(OracleFailure::new(
                OracleErrorCategory::HTTP_STATUS,
                format!("status {}: {}", status, truncate(&detail, 300)),
            )
            .into());
        }
        let payload: serde_json::Value = res.json().map_err(transport_failure)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                OracleFailure::new(
                    OracleErrorCategory::MALFORMED_RESPONSE,
                    "response has no choices[0].message.content",
                )
            })?;
        debug!("oracle response: {} bytes", content.len());
        Ok(content.to_string())
    }
}

impl ConflictOracle for ChatCompletionsOracle {
    fn classify_endpoints(&self, pair: &CandidatePair) -> CoreResult<Verdict> {
        let raw = self.complete(&endpoint_prompt(pair)?)?;
        parse_verdict(&raw, ENDPOINT_VERDICTS)
    }

    fn classify_dependency(&self, group: &DependencyGroup) -> CoreResult<Verdict> {
        let raw = self.complete(&dependency_prompt(group)?)?;
        parse_verdict(&raw, DEPENDENCY_VERDICTS)
    }
}

fn transport_failure(e: reqwest::Error) -> CoreError {
    if e.is_timeout() {
        return OracleFailure::new(OracleErrorCategory::TIMEOUT, e.to_string()).into();
    }
    if e.is_decode() {
        return OracleFailure::new(OracleErrorCategory::MALFORMED_RESPONSE, e.to_string()).into();
    }
    if e.is_connect() {
        return OracleFailure::new(OracleErrorCategory::TRANSPORT, e.to_string()).into();
    }
    classify_oracle_error(&e.to_string()).into()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
