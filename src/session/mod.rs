//! Automation session management
//!
//! This module owns the boundary to the page-automation collaborator:
//! - The [`SessionDriver`]/[`DriverFactory`] traits the rest of the crate
//!   programs against
//! - The WebDriver wire client that implements them in production
//! - The bounded session pool with usage-quota recycling

mod driver;
mod pool;
mod webdriver;

pub use driver::{DriverError, DriverFactory, DriverResult, Locator, SessionDriver};
pub use pool::{PoolError, PoolResult, SessionLease, SessionPool};
pub use webdriver::{WebDriverFactory, WebDriverSession};
