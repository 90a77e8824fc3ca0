//! Ordered header enrichment applied to every outbound API request.
//!
//! ```rust
//! use ocommon::{HeaderList, RequestContext};
//! use odispatch::{EnricherChain, UserAgentEnricher, XForwardedForEnricher};
//!
//! let chain = EnricherChain::new()
//!     .with_enricher(UserAgentEnricher::new("openapi-mcp"))
//!     .with_enricher(XForwardedForEnricher);
//! let context = RequestContext::new().with_remote_addr("10.0.0.7");
//!
//! let mut headers = HeaderList::new();
//! chain.apply(&mut headers, &context);
//!
//! assert_eq!(headers.get("x-forwarded-for"), Some("10.0.0.7"));
//! assert_eq!(headers.get("user-agent"), Some("openapi-mcp"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use ocommon::{HeaderList, RequestContext};

pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
pub const X_FORWARDED_HOST: &str = "X-Forwarded-Host";
pub const X_FORWARDED_PROTO: &str = "X-Forwarded-Proto";
pub const X_FORWARDED_PORT: &str = "X-Forwarded-Port";
pub const USER_AGENT: &str = "User-Agent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichError {
    pub enricher: String,
    pub message: String,
}

impl EnrichError {
    pub fn new(enricher: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            enricher: enricher.into(),
            message: message.into(),
        }
    }
}

impl Display for EnrichError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "enricher '{}' failed: {}", self.enricher, self.message)
    }
}

impl Error for EnrichError {}

pub trait RequestEnricher: Send + Sync {
    fn name(&self) -> &str;

    /// Lower orders run first.
    fn order(&self) -> i32 {
        0
    }

    fn enrich(&self, headers: &mut HeaderList, context: &RequestContext) -> Result<(), EnrichError>;
}

/// Enrichers sorted by [`RequestEnricher::order`] once, at construction.
///
/// A failing enricher leaves the headers as they were before it ran, and the chain moves on.
#[derive(Clone, Default)]
pub struct EnricherChain {
    enrichers: Vec<Arc<dyn RequestEnricher>>,
}

impl EnricherChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_enrichers(mut enrichers: Vec<Arc<dyn RequestEnricher>>) -> Self {
        enrichers.sort_by_key(|enricher| enricher.order());
        Self { enrichers }
    }

    /// The three built-in enrichers. A blank user agent leaves `User-Agent` untouched.
    pub fn standard(user_agent: impl Into<String>) -> Self {
        Self::new()
            .with_enricher(XForwardedForEnricher)
            .with_enricher(XForwardedHostEnricher)
            .with_enricher(UserAgentEnricher::new(user_agent))
    }

    pub fn with_enricher(mut self, enricher: impl RequestEnricher + 'static) -> Self {
        self.enrichers.push(Arc::new(enricher));
        self.enrichers.sort_by_key(|enricher| enricher.order());
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.enrichers.iter().map(|enricher| enricher.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.enrichers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enrichers.is_empty()
    }

    pub fn apply(&self, headers: &mut HeaderList, context: &RequestContext) {
        for enricher in &self.enrichers {
            tracing::debug!(enricher = enricher.name(), "applying request enricher");
            let snapshot = headers.clone();
            if let Err(err) = enricher.enrich(headers, context) {
                tracing::warn!(
                    enricher = enricher.name(),
                    error = %err,
                    "enricher failed during request enrichment, continuing with remaining enrichers"
                );
                *headers = snapshot;
            }
        }
    }
}

impl std::fmt::Debug for EnricherChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnricherChain")
            .field("enrichers", &self.names())
            .finish()
    }
}

/// Appends the caller's address to `X-Forwarded-For` unless it is already listed.
#[derive(Debug, Default, Clone, Copy)]
pub struct XForwardedForEnricher;

impl XForwardedForEnricher {
    pub const ORDER: i32 = 100;

    pub fn calculate(context: &RequestContext) -> Option<String> {
        let forwarded = context
            .inbound_header(X_FORWARDED_FOR)
            .filter(|value| !value.trim().is_empty());
        let client = context
            .remote_addr
            .as_deref()
            .filter(|value| !value.trim().is_empty());

        match (forwarded, client) {
            (Some(forwarded), Some(client)) => {
                let listed = forwarded.split(',').any(|hop| hop.trim() == client);
                if listed {
                    Some(forwarded.to_string())
                } else {
                    Some(format!("{forwarded}, {client}"))
                }
            }
            (Some(forwarded), None) => Some(forwarded.to_string()),
            (None, Some(client)) => Some(client.to_string()),
            (None, None) => None,
        }
    }
}

impl RequestEnricher for XForwardedForEnricher {
    fn name(&self) -> &str {
        "XForwardedForEnricher"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn enrich(&self, headers: &mut HeaderList, context: &RequestContext) -> Result<(), EnrichError> {
        if let Some(value) = Self::calculate(context) {
            headers.set(X_FORWARDED_FOR, value);
        }
        Ok(())
    }
}

/// Forwards the host, scheme and non-default port the caller used to reach the bridge.
#[derive(Debug, Default, Clone, Copy)]
pub struct XForwardedHostEnricher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedHost {
    pub host: String,
    pub proto: Option<String>,
    pub port: Option<u16>,
}

impl XForwardedHostEnricher {
    pub const ORDER: i32 = 200;

    pub fn calculate(context: &RequestContext) -> Result<Option<ForwardedHost>, EnrichError> {
        let forwarded_host = first_value(context.inbound_header(X_FORWARDED_HOST));
        let Some(authority) = forwarded_host.or_else(|| first_value(context.inbound_header("Host")))
        else {
            return Ok(None);
        };

        let (host, authority_port) = split_authority(authority)
            .map_err(|message| EnrichError::new("XForwardedHostEnricher", message))?;
        if host.is_empty() {
            return Ok(None);
        }

        let proto = first_value(context.inbound_header(X_FORWARDED_PROTO))
            .or(context.scheme.as_deref())
            .map(str::to_ascii_lowercase);

        let explicit_port = match first_value(context.inbound_header(X_FORWARDED_PORT)) {
            Some(port) => Some(port.parse::<u16>().map_err(|_| {
                EnrichError::new("XForwardedHostEnricher", format!("invalid forwarded port '{port}'"))
            })?),
            None => None,
        };
        let port = explicit_port
            .or(authority_port)
            .filter(|port| Some(*port) != default_port(proto.as_deref()));

        Ok(Some(ForwardedHost {
            host: host.to_string(),
            proto,
            port,
        }))
    }
}

impl RequestEnricher for XForwardedHostEnricher {
    fn name(&self) -> &str {
        "XForwardedHostEnricher"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn enrich(&self, headers: &mut HeaderList, context: &RequestContext) -> Result<(), EnrichError> {
        let Some(forwarded) = Self::calculate(context)? else {
            tracing::trace!("no host available for X-Forwarded-Host");
            return Ok(());
        };

        headers.set(X_FORWARDED_HOST, forwarded.host);
        if let Some(proto) = forwarded.proto {
            headers.set(X_FORWARDED_PROTO, proto);
        }
        if let Some(port) = forwarded.port {
            headers.set(X_FORWARDED_PORT, port.to_string());
        }
        Ok(())
    }
}

fn first_value(value: Option<&str>) -> Option<&str> {
    value
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn split_authority(authority: &str) -> Result<(&str, Option<u16>), String> {
    let (host, port) = if let Some(rest) = authority.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| format!("unterminated IPv6 host '{authority}'"))?;
        let host = &authority[..end + 2];
        (host, rest[end + 1..].strip_prefix(':'))
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    let port = match port {
        Some(port) => Some(
            port.parse::<u16>()
                .map_err(|_| format!("invalid port in host '{authority}'"))?,
        ),
        None => None,
    };
    Ok((host, port))
}

fn default_port(proto: Option<&str>) -> Option<u16> {
    match proto {
        Some("http") => Some(80),
        Some("https") => Some(443),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct UserAgentEnricher {
    user_agent: String,
}

impl UserAgentEnricher {
    pub const ORDER: i32 = 1000;

    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl RequestEnricher for UserAgentEnricher {
    fn name(&self) -> &str {
        "UserAgentEnricher"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn enrich(&self, headers: &mut HeaderList, _context: &RequestContext) -> Result<(), EnrichError> {
        if !self.user_agent.trim().is_empty() {
            headers.set(USER_AGENT, self.user_agent.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl RequestEnricher for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        fn order(&self) -> i32 {
            150
        }

        fn enrich(&self, headers: &mut HeaderList, _context: &RequestContext) -> Result<(), EnrichError> {
            headers.set("X-Partial", "written before failing");
            Err(EnrichError::new(self.name(), "no context"))
        }
    }

    #[test]
    fn chain_runs_in_ascending_order_regardless_of_registration() {
        let chain = EnricherChain::new()
            .with_enricher(UserAgentEnricher::new("ua"))
            .with_enricher(XForwardedHostEnricher)
            .with_enricher(XForwardedForEnricher);

        assert_eq!(
            chain.names(),
            vec!["XForwardedForEnricher", "XForwardedHostEnricher", "UserAgentEnricher"]
        );
    }

    #[test]
    fn failing_enricher_is_rolled_back_and_chain_continues() {
        let chain = EnricherChain::standard("openapi-mcp").with_enricher(Failing);
        let context = RequestContext::new().with_remote_addr("10.1.1.1");

        let mut headers = HeaderList::new();
        chain.apply(&mut headers, &context);

        assert_eq!(headers.get(X_FORWARDED_FOR), Some("10.1.1.1"));
        assert_eq!(headers.get(USER_AGENT), Some("openapi-mcp"));
        assert!(!headers.contains("X-Partial"));
    }

    #[test]
    fn forwarded_for_appends_client_only_when_missing() {
        let appended = RequestContext::new()
            .with_inbound_header("X-Forwarded-For", "203.0.113.5")
            .with_remote_addr("10.0.0.2");
        assert_eq!(
            XForwardedForEnricher::calculate(&appended).as_deref(),
            Some("203.0.113.5, 10.0.0.2")
        );

        let listed = RequestContext::new()
            .with_inbound_header("x-forwarded-for", "203.0.113.5, 10.0.0.2")
            .with_remote_addr("10.0.0.2");
        assert_eq!(
            XForwardedForEnricher::calculate(&listed).as_deref(),
            Some("203.0.113.5, 10.0.0.2")
        );

        assert_eq!(XForwardedForEnricher::calculate(&RequestContext::new()), None);
    }

    #[test]
    fn forwarded_host_uses_host_header_and_drops_default_port() {
        let context = RequestContext::new()
            .with_inbound_header("Host", "api.example.com:443")
            .with_scheme("https");

        let mut headers = HeaderList::new();
        XForwardedHostEnricher
            .enrich(&mut headers, &context)
            .expect("enrichment should succeed");

        assert_eq!(headers.get(X_FORWARDED_HOST), Some("api.example.com"));
        assert_eq!(headers.get(X_FORWARDED_PROTO), Some("https"));
        assert!(!headers.contains(X_FORWARDED_PORT));
    }

    #[test]
    fn forwarded_host_prefers_inbound_forwarded_headers() {
        let context = RequestContext::new()
            .with_inbound_header("Host", "mcp-server.internal")
            .with_inbound_header("X-Forwarded-Host", "api.example.com")
            .with_inbound_header("X-Forwarded-Proto", "https")
            .with_inbound_header("X-Forwarded-Port", "9443")
            .with_scheme("http");

        let forwarded = XForwardedHostEnricher::calculate(&context)
            .expect("calculation should succeed")
            .expect("host should be present");

        assert_eq!(
            forwarded,
            ForwardedHost {
                host: "api.example.com".to_string(),
                proto: Some("https".to_string()),
                port: Some(9443),
            }
        );
    }

    #[test]
    fn forwarded_host_keeps_ipv6_brackets_and_custom_port() {
        let context = RequestContext::new()
            .with_inbound_header("Host", "[::1]:8080")
            .with_scheme("http");

        let forwarded = XForwardedHostEnricher::calculate(&context)
            .expect("calculation should succeed")
            .expect("host should be present");

        assert_eq!(forwarded.host, "[::1]");
        assert_eq!(forwarded.port, Some(8080));
    }

    #[test]
    fn blank_user_agent_is_not_sent() {
        let mut headers = HeaderList::new();
        UserAgentEnricher::new("  ")
            .enrich(&mut headers, &RequestContext::new())
            .expect("enrichment should succeed");

        assert!(headers.is_empty());
    }
}
