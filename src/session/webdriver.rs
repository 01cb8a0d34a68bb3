//! WebDriver wire client
//!
//! Production implementation of [`SessionDriver`] speaking the W3C WebDriver
//! protocol to a locally running driver binary (chromedriver). Only the
//! handful of endpoints the extraction flow needs are implemented: session
//! lifecycle, navigation, element lookup, click, and text read. Waits are
//! implemented as bounded polling loops on top of element lookup.

use crate::session::driver::{
    DriverError, DriverFactory, DriverResult, Locator, SessionDriver,
};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// W3C element identifier key in find-element responses
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Default interval between element-lookup polls while waiting
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Browser arguments matching the headless server deployment
const BROWSER_ARGS: &[&str] = &[
    "--headless",
    "--disable-gpu",
    "--window-size=1920x1080",
    "--no-sandbox",
    "--disable-dev-shm-usage",
];

/// Builds the HTTP client used to talk to the driver binary
fn build_wire_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
}

/// Factory that opens WebDriver sessions against a driver endpoint
pub struct WebDriverFactory {
    client: Client,
    endpoint: String,
    poll_interval: Duration,
}

impl WebDriverFactory {
    /// Creates a factory for the given driver endpoint (e.g. `http://localhost:9515`)
    pub fn new(endpoint: impl Into<String>) -> DriverResult<Self> {
        let client = build_wire_client()
            .map_err(|e| DriverError::Transport(e.to_string()))?;
        let endpoint: String = endpoint.into();

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Overrides the element-poll interval (tests use a short one)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[async_trait]
impl DriverFactory for WebDriverFactory {
    async fn create(&self) -> DriverResult<Box<dyn SessionDriver>> {
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": BROWSER_ARGS }
                }
            }
        });

        let url = format!("{}/session", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DriverError::SessionCreate(e.to_string()))?;

        let value = read_wire_value(response)
            .await
            .map_err(|e| DriverError::SessionCreate(e.to_string()))?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DriverError::SessionCreate("response carried no sessionId".to_string())
            })?;

        tracing::debug!("Opened WebDriver session {}", session_id);

        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            session_url: format!("{}/session/{}", self.endpoint, session_id),
            poll_interval: self.poll_interval,
        }))
    }
}

/// One live WebDriver session
pub struct WebDriverSession {
    client: Client,
    session_url: String,
    poll_interval: Duration,
}

impl WebDriverSession {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> DriverResult<Value> {
        let url = format!("{}{}", self.session_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DriverError::Transport(e.to_string()))?;

        read_wire_value(response).await
    }

    /// Single find-element attempt; `ElementNotFound` when absent right now
    async fn find_element(&self, locator: &Locator) -> DriverResult<String> {
        let body = json!({ "using": "css selector", "value": locator.as_css() });
        let value = self.execute(Method::POST, "/element", Some(body)).await?;

        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DriverError::ElementNotFound(locator.to_string()))
    }

    /// Polls find-element until present or the timeout elapses
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> DriverResult<String> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find_element(locator).await {
                Ok(element_id) => return Ok(element_id),
                Err(DriverError::ElementNotFound(_)) => {
                    if Instant::now() >= deadline {
                        return Err(DriverError::WaitTimeout {
                            what: locator.to_string(),
                            timeout,
                        });
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[async_trait]
impl SessionDriver for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.execute(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn wait_for_element(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> DriverResult<()> {
        self.wait_for(locator, timeout).await?;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator, timeout: Duration) -> DriverResult<()> {
        let element_id = self.wait_for(locator, timeout).await?;
        self.execute(
            Method::POST,
            &format!("/element/{}/click", element_id),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn element_text(&mut self, locator: &Locator, timeout: Duration) -> DriverResult<String> {
        let element_id = self.wait_for(locator, timeout).await?;
        let value = self
            .execute(Method::GET, &format!("/element/{}/text", element_id), None)
            .await?;

        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::Protocol("text response was not a string".to_string()))
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.execute(Method::DELETE, "", None).await?;
        tracing::debug!("Closed WebDriver session");
        Ok(())
    }
}

/// Unwraps the `value` envelope of a wire response, classifying errors
async fn read_wire_value(response: reqwest::Response) -> DriverResult<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| DriverError::Protocol(format!("malformed wire response: {}", e)))?;

    if status.is_success() {
        return Ok(body.get("value").cloned().unwrap_or(Value::Null));
    }

    let error = body
        .pointer("/value/error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = body
        .pointer("/value/message")
        .and_then(Value::as_str)
        .unwrap_or("");

    match error {
        "no such element" => Err(DriverError::ElementNotFound(message.to_string())),
        "invalid session id" => Err(DriverError::SessionGone(message.to_string())),
        _ if status == StatusCode::NOT_FOUND => {
            Err(DriverError::SessionGone(format!("{}: {}", error, message)))
        }
        _ => Err(DriverError::Protocol(format!("{}: {}", error, message))),
    }
}
