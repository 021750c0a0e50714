//! Client configuration

use crate::page::PageParams;
use coursegate_core::{config_error, GateResult, VALIDATE_PATH};
use url::Url;

pub const DEFAULT_SITE: &str = "http://127.0.0.1:8080";

/// Where the client sends validation requests and which login page it acts as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Full URL of the validation endpoint
    pub endpoint: Url,
    /// Login page URL; its query carries `next` and `course`, and relative
    /// destinations are resolved against it
    pub page_url: Url,
}

impl ClientConfig {
    /// Build from an optional endpoint and page URL. Without an endpoint the
    /// `COURSEGATE_ENDPOINT` variable is used, then the local default server.
    pub fn resolve(endpoint: Option<&str>, page_url: Option<&str>) -> GateResult<Self> {
        let endpoint = match endpoint
            .map(str::to_string)
            .or_else(|| std::env::var("COURSEGATE_ENDPOINT").ok())
        {
            Some(raw) => parse_url(&raw, "endpoint")?,
            None => parse_url(DEFAULT_SITE, "endpoint")?
                .join(VALIDATE_PATH)
                .map_err(|e| config_error!(e, "client_config"))?,
        };

        let page_url = match page_url {
            Some(raw) => parse_url(raw, "page URL")?,
            None => endpoint
                .join("/")
                .map_err(|e| config_error!(e, "client_config"))?,
        };

        Ok(Self { endpoint, page_url })
    }

    pub fn page(&self) -> PageParams {
        PageParams::from_url(&self.page_url)
    }
}

fn parse_url(raw: &str, what: &str) -> GateResult<Url> {
    Url::parse(raw).map_err(|e| {
        config_error!(
            format!("Invalid {}: {}: {}", what, raw, e),
            "client_config"
        )
    })
}
