pub mod directions;
pub mod geocoding;
pub mod icons;
pub mod routing;

use crate::constants::DEFAULT_USER_AGENT;
use crate::error::{AppError, Result};
use reqwest::Client;
use std::time::Duration;

/// Shared reqwest client setup for outbound calls. Timeouts surface as
/// ordinary request errors.
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}
