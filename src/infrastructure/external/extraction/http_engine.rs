//! HTTP-only extraction engine.
//!
//! Fallback (and attempt-1) mode: walks the same iframe chain as the
//! browser engine using a plain `reqwest::Client` plus `scraper` for DOM
//! inspection instead of a live browser. Lower fidelity by design — it
//! cannot execute the page's own JavaScript, so the play button click is
//! synthesized from the static markup's `data-id` attribute rather than
//! a real click-and-wait. The controller is expected to retry with the
//! browser engine on the next attempt if this one fails.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::domain::entities::extraction_session::{
    ExtractionMode, IframeKind, IframeStep, StepOutcome,
};
use crate::interfaces::external_services::extraction_engine::{
    ExtractionEngine, ExtractionOutcome, ExtractionRequest,
};
use crate::shared::error::ExtractionError;

use super::selectors::{classify_stream_url, PLAY_BUTTON_SELECTORS};

pub struct HttpExtractionEngine {
    client: Client,
}

impl HttpExtractionEngine {
    pub fn new() -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ExtractionError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str, stealth_user_agent: &str) -> Result<(String, Duration), ExtractionError> {
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, stealth_user_agent)
            .send()
            .await?;

        if response.status().is_server_error() {
            return Err(ExtractionError::UpstreamServerError(response.status().as_u16()));
        }
        if !response.status().is_success() {
            return Err(ExtractionError::NotFound);
        }

        let body = response.text().await?;
        Ok((body, started.elapsed()))
    }

    fn first_iframe_src_containing(document: &Html, host_marker: &str) -> Option<String> {
        let selector = Selector::parse("iframe").ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("src").map(str::to_string))
            .find(|src| src.contains(host_marker))
    }
}

#[async_trait]
impl ExtractionEngine for HttpExtractionEngine {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Http
    }

    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionOutcome, ExtractionError> {
        let user_agent = &request.stealth.fingerprint.user_agent;
        let mut steps = Vec::new();

        // Stage: LoadingVidsrc
        let (vidsrc_body, elapsed) = self.fetch(&request.vidsrc_url, user_agent).await?;
        let vidsrc_doc = Html::parse_document(&vidsrc_body);
        let rcp_src = Self::first_iframe_src_containing(&vidsrc_doc, "cloudnestra.com/rcp").ok_or_else(|| {
            ExtractionError::StructureChanged("loadingVidsrc".to_string())
        })?;
        steps.push(IframeStep {
            index: 0,
            kind: IframeKind::Vidsrc,
            url: request.vidsrc_url.clone(),
            outcome: StepOutcome::Ok,
            duration_ms: elapsed.as_millis() as u64,
        });

        let rcp_url = make_absolute(&rcp_src);

        // Stage: LoadingRcp + FindingPlayButton
        let (rcp_body, elapsed) = self.fetch(&rcp_url, user_agent).await?;
        let rcp_doc = Html::parse_document(&rcp_body);
        let play_button_id = PLAY_BUTTON_SELECTORS.iter().find_map(|sel| {
            let selector = Selector::parse(sel).ok()?;
            rcp_doc.select(&selector).next().and_then(|el| el.value().attr("data-id")).map(str::to_string)
        });
        let Some(play_button_id) = play_button_id else {
            steps.push(IframeStep {
                index: 1,
                kind: IframeKind::Rcp,
                url: rcp_url.clone(),
                outcome: StepOutcome::ParseError { detail: "no play button element found".to_string() },
                duration_ms: elapsed.as_millis() as u64,
            });
            return Err(ExtractionError::StructureChanged("loadingRcp".to_string()));
        };
        steps.push(IframeStep {
            index: 1,
            kind: IframeKind::Rcp,
            url: rcp_url.clone(),
            outcome: StepOutcome::Ok,
            duration_ms: elapsed.as_millis() as u64,
        });

        // Stage: ClickingPlayButton -- synthesized from the static data-id
        // rather than a real click; the prorcp URL follows the same path
        // shape the provider's own JS would have navigated the frame to.
        let prorcp_url = format!("https://cloudnestra.com/prorcp/{play_button_id}");

        // Stage: LoadingProRcp
        let (prorcp_body, elapsed) = self.fetch(&prorcp_url, user_agent).await?;
        let prorcp_doc = Html::parse_document(&prorcp_body);
        steps.push(IframeStep {
            index: 2,
            kind: IframeKind::ProRcp,
            url: prorcp_url.clone(),
            outcome: StepOutcome::Ok,
            duration_ms: elapsed.as_millis() as u64,
        });

        let shadowlands_src = Self::first_iframe_src_containing(&prorcp_doc, "shadowlandschronicles.com");
        let manifest_url = match shadowlands_src {
            Some(src) => src,
            None => extract_m3u8_reference(&prorcp_body)
                .ok_or(ExtractionError::NoStreamUrlFound)?,
        };

        steps.push(IframeStep {
            index: 3,
            kind: IframeKind::Shadowlands,
            url: manifest_url.clone(),
            outcome: StepOutcome::Ok,
            duration_ms: 0,
        });

        let (requires_proxy, proxy_source) = classify_stream_url(&manifest_url, &request.server);

        Ok(ExtractionOutcome { final_url: manifest_url, requires_proxy, proxy_source, steps })
    }
}

fn make_absolute(src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else if let Some(stripped) = src.strip_prefix("//") {
        format!("https://{stripped}")
    } else {
        format!("https://cloudnestra.com{src}")
    }
}

fn extract_m3u8_reference(body: &str) -> Option<String> {
    let needle = ".m3u8";
    let start_of_needle = body.find(needle)?;
    let prefix = &body[..start_of_needle];
    let quote_start = prefix.rfind(['"', '\'']).map(|i| i + 1).unwrap_or(0);
    let url_start = &body[quote_start..];
    let end = url_start.find(['"', '\'']).unwrap_or(url_start.len().min(start_of_needle - quote_start + needle.len()));
    Some(url_start[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_absolute_handles_relative_and_protocol_relative() {
        assert_eq!(make_absolute("https://a.com/x"), "https://a.com/x");
        assert_eq!(make_absolute("//a.com/x"), "https://a.com/x");
        assert_eq!(make_absolute("/rcp/abc"), "https://cloudnestra.com/rcp/abc");
    }

    #[test]
    fn extract_m3u8_reference_finds_quoted_url() {
        let body = r#"<script>var src = "https://cdn.example/hls/index.m3u8";</script>"#;
        assert_eq!(extract_m3u8_reference(body).unwrap(), "https://cdn.example/hls/index.m3u8");
    }

    #[test]
    fn extract_m3u8_reference_returns_none_when_absent() {
        assert_eq!(extract_m3u8_reference("<html></html>"), None);
    }
}
