//! `host:port` endpoints with a mandatory port.
//!
//! Used for lighthouse endpoints and telephony exchange addresses. Hosts may
//! be names, IPv4 literals or bracketed IPv6 literals (`[fd00::1]:4242`).

use std::fmt;
use std::str::FromStr;
use url::Url;

/// Scheme used to borrow `url`'s authority parsing for bare endpoints.
const PARSE_SCHEME: &str = "endpoint";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint is empty")]
    Empty,

    #[error("endpoint is malformed: {0}")]
    Malformed(String),

    #[error("endpoint has no host")]
    MissingHost,

    #[error("endpoint has no explicit port")]
    MissingPort,

    #[error("endpoint must be host:port only, found extra `{0}`")]
    UnexpectedComponent(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Host as written, brackets included for IPv6 literals.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(EndpointError::Empty);
        }
        let url = Url::parse(&format!("{PARSE_SCHEME}://{raw}"))
            .map_err(|e| EndpointError::Malformed(e.to_string()))?;

        if !url.username().is_empty() || url.password().is_some() {
            return Err(EndpointError::UnexpectedComponent("user info".to_string()));
        }
        if !url.path().is_empty() {
            return Err(EndpointError::UnexpectedComponent(url.path().to_string()));
        }
        if let Some(query) = url.query() {
            return Err(EndpointError::UnexpectedComponent(format!("?{query}")));
        }
        if let Some(fragment) = url.fragment() {
            return Err(EndpointError::UnexpectedComponent(format!("#{fragment}")));
        }

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or(EndpointError::MissingHost)?;
        let port = url.port().ok_or(EndpointError::MissingPort)?;
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
