//! Automation driver traits
//!
//! This module defines the seam between the crawler and the page-automation
//! collaborator. The crawler only ever talks to a [`SessionDriver`]; the
//! production implementation speaks the WebDriver wire protocol, and tests
//! substitute scripted drivers.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by an automation driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Timed out after {timeout:?} waiting for {what}")]
    WaitTimeout { what: String, timeout: Duration },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Failed to create automation session: {0}")]
    SessionCreate(String),

    #[error("Automation session is gone: {0}")]
    SessionGone(String),

    #[error("Wire protocol error: {0}")]
    Protocol(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// How to locate an element on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// By CSS class name
    ClassName(String),
    /// By arbitrary CSS selector
    Css(String),
}

impl Locator {
    pub fn class_name(name: impl Into<String>) -> Self {
        Self::ClassName(name.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Renders the locator as a CSS selector string
    pub fn as_css(&self) -> String {
        match self {
            Self::ClassName(name) => format!(".{}", name),
            Self::Css(selector) => selector.clone(),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_css())
    }
}

/// A leased handle to one page-automation session
///
/// Every wait is bounded by the caller-supplied timeout; implementations must
/// convert an expired wait into [`DriverError::WaitTimeout`] rather than block
/// indefinitely.
#[async_trait]
pub trait SessionDriver: Send {
    /// Navigates the session to the given URL
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Waits until an element matching the locator is present
    async fn wait_for_element(&mut self, locator: &Locator, timeout: Duration)
        -> DriverResult<()>;

    /// Waits for an element and clicks it
    async fn click(&mut self, locator: &Locator, timeout: Duration) -> DriverResult<()>;

    /// Waits for an element and returns its visible text
    async fn element_text(&mut self, locator: &Locator, timeout: Duration)
        -> DriverResult<String>;

    /// Tears the session down
    async fn close(&mut self) -> DriverResult<()>;
}

/// Constructs automation sessions for the pool
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Creates a fresh automation session
    async fn create(&self) -> DriverResult<Box<dyn SessionDriver>>;
}
