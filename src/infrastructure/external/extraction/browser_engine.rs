//! Headless-browser extraction engine (primary mode).
//!
//! Drives a real browser via WebDriver so the provider's own JavaScript
//! runs: this is what makes the play-button click and the iframe chain
//! it triggers behave exactly as a real visitor's would. Stealth
//! signals from the session's `SessionStealthContext` are applied via
//! CDP/JS injection before the first navigation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use thirtyfour::{By, WebDriver};
use tokio::time::timeout;

use crate::domain::entities::extraction_session::{
    ExtractionMode, IframeKind, IframeStep, StepOutcome,
};
use crate::interfaces::external_services::extraction_engine::{
    ExtractionEngine, ExtractionOutcome, ExtractionRequest,
};
use crate::shared::error::ExtractionError;

use super::selectors::{classify_stream_url, PLAY_BUTTON_SELECTORS};

const PLAY_BUTTON_WAIT: Duration = Duration::from_secs(5);
const NEW_IFRAME_WAIT: Duration = Duration::from_secs(5);
const PLAY_BUTTON_RETRY_SPACING: Duration = Duration::from_secs(1);
const MAX_PLAY_BUTTON_RETRIES: u32 = 2;

pub struct BrowserExtractionEngine {
    webdriver_url: String,
}

impl BrowserExtractionEngine {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self { webdriver_url: webdriver_url.into() }
    }

    async fn connect(&self, user_agent: &str, viewport: (u32, u32)) -> Result<WebDriver, ExtractionError> {
        let mut caps = thirtyfour::DesiredCapabilities::chrome();
        caps.add_arg(&format!("--user-agent={user_agent}")).ok();
        caps.add_arg(&format!("--window-size={},{}", viewport.0, viewport.1)).ok();
        caps.add_arg("--headless=new").ok();

        WebDriver::new(&self.webdriver_url, caps)
            .await
            .map_err(|e| ExtractionError::Network(format!("webdriver connect failed: {e}")))
    }

    /// Applies the session's stealth signals before the first navigation:
    /// seeded localStorage and navigator property overrides.
    async fn apply_stealth(&self, driver: &WebDriver, request: &ExtractionRequest) -> Result<(), ExtractionError> {
        for (key, value) in &request.stealth.local_storage {
            let script = format!(
                "window.localStorage.setItem('{}', '{}');",
                key.replace('\'', ""),
                value.replace('\'', "")
            );
            driver.execute(&script, vec![]).await.map_err(|e| ExtractionError::Network(e.to_string()))?;
        }
        for (prop, value) in &request.stealth.fingerprint.navigator_overrides {
            let script = format!(
                "Object.defineProperty(navigator, '{}', {{ get: () => '{}' }});",
                prop.replace('\'', ""),
                value.replace('\'', "")
            );
            driver.execute(&script, vec![]).await.map_err(|e| ExtractionError::Network(e.to_string()))?;
        }
        Ok(())
    }

    /// Runs the pre-click behavior plan: synthetic mouse moves, scroll
    /// events, and an optional Tab press, so automation detectors see
    /// plausible motion before the click that matters.
    async fn run_behavior_plan(&self, driver: &WebDriver, request: &ExtractionRequest) -> Result<(), ExtractionError> {
        let plan = &request.stealth.behavior_plan;
        for mv in &plan.mouse_moves {
            let script = format!(
                "window.dispatchEvent(new MouseEvent('mousemove', {{ clientX: {}, clientY: {} }}));",
                mv.x, mv.y
            );
            driver.execute(&script, vec![]).await.map_err(|e| ExtractionError::Network(e.to_string()))?;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        for scroll in &plan.scroll_events {
            let script = format!("window.scrollBy(0, {});", scroll.delta_y);
            driver.execute(&script, vec![]).await.map_err(|e| ExtractionError::Network(e.to_string()))?;
        }
        if plan.tab_before_click {
            driver.action_chain().send_keys("\u{E004}").perform().await.ok();
        }
        Ok(())
    }

    async fn find_iframe_src(
        &self,
        driver: &WebDriver,
        host_marker: &str,
        wait: Duration,
    ) -> Result<String, ExtractionError> {
        let deadline = Instant::now() + wait;
        loop {
            let elements = driver.find_all(By::Tag("iframe")).await.map_err(|e| ExtractionError::Network(e.to_string()))?;
            for el in &elements {
                if let Ok(Some(src)) = el.attr("src").await {
                    if src.contains(host_marker) {
                        return Ok(src);
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(ExtractionError::StructureChanged(format!("no iframe matching {host_marker}")));
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    async fn find_play_button(&self, driver: &WebDriver) -> Result<thirtyfour::WebElement, ExtractionError> {
        let deadline = Instant::now() + PLAY_BUTTON_WAIT;
        loop {
            for selector in PLAY_BUTTON_SELECTORS {
                if let Ok(el) = driver.find(By::Css(selector)).await {
                    return Ok(el);
                }
            }
            if Instant::now() >= deadline {
                return Err(ExtractionError::StructureChanged("loadingRcp".to_string()));
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }
}

#[async_trait]
impl ExtractionEngine for BrowserExtractionEngine {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Browser
    }

    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionOutcome, ExtractionError> {
        let fingerprint = &request.stealth.fingerprint;
        let driver = self.connect(&fingerprint.user_agent, (fingerprint.viewport_width, fingerprint.viewport_height)).await?;
        let mut steps = Vec::new();

        let result = self.run_chain(&driver, &request, &mut steps).await;

        let _ = driver.quit().await;
        result.map(|(final_url, requires_proxy, proxy_source)| ExtractionOutcome {
            final_url,
            requires_proxy,
            proxy_source,
            steps,
        })
    }
}

impl BrowserExtractionEngine {
    async fn run_chain(
        &self,
        driver: &WebDriver,
        request: &ExtractionRequest,
        steps: &mut Vec<IframeStep>,
    ) -> Result<(String, bool, Option<String>), ExtractionError> {
        self.apply_stealth(driver, request).await?;

        // Stage: LoadingVidsrc
        let started = Instant::now();
        driver
            .goto(&request.vidsrc_url)
            .await
            .map_err(|e| ExtractionError::Network(e.to_string()))?;
        let rcp_src = self.find_iframe_src(driver, "cloudnestra.com/rcp", NEW_IFRAME_WAIT).await?;
        steps.push(IframeStep {
            index: 0,
            kind: IframeKind::Vidsrc,
            url: request.vidsrc_url.clone(),
            outcome: StepOutcome::Ok,
            duration_ms: started.elapsed().as_millis() as u64,
        });

        // Stage: LoadingRcp
        let started = Instant::now();
        driver.goto(&rcp_src).await.map_err(|e| ExtractionError::Network(e.to_string()))?;
        self.run_behavior_plan(driver, request).await?;
        steps.push(IframeStep {
            index: 1,
            kind: IframeKind::Rcp,
            url: rcp_src.clone(),
            outcome: StepOutcome::Ok,
            duration_ms: started.elapsed().as_millis() as u64,
        });

        // Stage: FindingPlayButton + ClickingPlayButton, with up to two
        // retries at 1 s spacing if no new iframe appears.
        let prorcp_src = self.click_play_button_with_retries(driver).await?;

        // Stage: LoadingProRcp
        let started = Instant::now();
        driver.goto(&prorcp_src).await.map_err(|e| ExtractionError::Network(e.to_string()))?;
        steps.push(IframeStep {
            index: 2,
            kind: IframeKind::ProRcp,
            url: prorcp_src,
            outcome: StepOutcome::Ok,
            duration_ms: started.elapsed().as_millis() as u64,
        });

        // Stage: LoadingShadowlands / ExtractingUrl
        let shadowlands_result = self.find_iframe_src(driver, "shadowlandschronicles.com", Duration::from_secs(2)).await;
        let manifest_url = match shadowlands_result {
            Ok(src) => src,
            Err(_) => {
                let page_source = driver.source().await.map_err(|e| ExtractionError::Network(e.to_string()))?;
                extract_m3u8_from_source(&page_source).ok_or(ExtractionError::NoStreamUrlFound)?
            }
        };
        steps.push(IframeStep {
            index: 3,
            kind: IframeKind::Shadowlands,
            url: manifest_url.clone(),
            outcome: StepOutcome::Ok,
            duration_ms: 0,
        });

        let (requires_proxy, proxy_source) = classify_stream_url(&manifest_url, &request.server);
        Ok((manifest_url, requires_proxy, proxy_source))
    }

    async fn click_play_button_with_retries(&self, driver: &WebDriver) -> Result<String, ExtractionError> {
        for attempt in 0..=MAX_PLAY_BUTTON_RETRIES {
            let button = self.find_play_button(driver).await?;
            driver.action_chain().move_to_element(&button).perform().await.ok();
            tokio::time::sleep(Duration::from_millis(150)).await;
            button.click().await.map_err(|_| ExtractionError::PlayButtonClickFailed)?;

            match timeout(NEW_IFRAME_WAIT, self.find_iframe_src(driver, "cloudnestra.com/prorcp", NEW_IFRAME_WAIT)).await {
                Ok(Ok(src)) => return Ok(src),
                _ if attempt < MAX_PLAY_BUTTON_RETRIES => {
                    tokio::time::sleep(PLAY_BUTTON_RETRY_SPACING).await;
                    continue;
                }
                _ => return Err(ExtractionError::PlayButtonClickFailed),
            }
        }
        Err(ExtractionError::PlayButtonClickFailed)
    }
}

fn extract_m3u8_from_source(body: &str) -> Option<String> {
    let needle = ".m3u8";
    let start_of_needle = body.find(needle)?;
    let prefix = &body[..start_of_needle];
    let quote_start = prefix.rfind(['"', '\'']).map(|i| i + 1).unwrap_or(0);
    let url_start = &body[quote_start..];
    let end = url_start.find(['"', '\'']).unwrap_or(needle.len());
    Some(url_start[..end.max(needle.len())].to_string())
}
