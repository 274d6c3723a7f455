//! Payment endpoint selection.
//!
//! The platform serves payment calls from several bases, and which one accepts
//! a request depends on how the account managed to log in. Each base is an
//! [`EndpointStrategy`]; the [`EndpointSelector`] asks them in priority order
//! and the first one that can serve the session wins.

use std::fmt;
use url::Url;

/// Which strategy produced an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    SecondaryToken,
    PrimaryBearer,
    SessionCookie,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointKind::SecondaryToken => "secondary-token",
            EndpointKind::PrimaryBearer => "primary-bearer",
            EndpointKind::SessionCookie => "session-cookie",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointAuth {
    Bearer(String),
    /// Authenticated by the cookie jar of the primary login
    SessionCookie,
}

/// Base URL plus the header set the backend expects on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEndpoint {
    pub kind: EndpointKind,
    pub base_url: String,
    pub origin: String,
    pub referer: String,
    pub auth: EndpointAuth,
}

impl PaymentEndpoint {
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Origin, Referer and (for token strategies) Authorization
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Origin", self.origin.clone()), ("Referer", self.referer.clone())];
        if let EndpointAuth::Bearer(token) = &self.auth {
            headers.push(("Authorization", format!("Bearer {}", token)));
        }
        headers
    }
}

/// A configured payment base: where to send requests and which web origin to claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTarget {
    pub base_url: String,
    pub origin: String,
}

impl EndpointTarget {
    /// Normalizes the base (no trailing slash) and reduces `origin` to scheme://host[:port]
    pub fn new(base_url: &str, origin: &str) -> Result<Self, url::ParseError> {
        Url::parse(base_url)?;
        let origin = Url::parse(origin)?.origin().ascii_serialization();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            origin,
        })
    }

    fn endpoint(&self, kind: EndpointKind, auth: EndpointAuth) -> PaymentEndpoint {
        PaymentEndpoint {
            kind,
            base_url: self.base_url.clone(),
            origin: self.origin.clone(),
            referer: format!("{}/", self.origin),
            auth,
        }
    }
}

/// Tokens produced by the logins of one account
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginTokens<'a> {
    pub primary: Option<&'a str>,
    pub secondary: Option<&'a str>,
}

/// True when the token is a JWT rather than an opaque session identifier
pub fn is_real_token(token: &str) -> bool {
    jsonwebtoken::decode_header(token).is_ok()
}

pub trait EndpointStrategy: fmt::Debug + Send + Sync {
    fn kind(&self) -> EndpointKind;

    /// The endpoint this strategy offers for the given tokens, if it can serve them
    fn resolve(&self, tokens: &LoginTokens<'_>) -> Option<PaymentEndpoint>;
}

#[derive(Debug)]
pub struct SecondaryTokenStrategy(pub EndpointTarget);

impl EndpointStrategy for SecondaryTokenStrategy {
    fn kind(&self) -> EndpointKind {
        EndpointKind::SecondaryToken
    }

    fn resolve(&self, tokens: &LoginTokens<'_>) -> Option<PaymentEndpoint> {
        let token = tokens.secondary.filter(|t| !t.is_empty())?;
        Some(self.0.endpoint(self.kind(), EndpointAuth::Bearer(token.to_string())))
    }
}

#[derive(Debug)]
pub struct PrimaryBearerStrategy(pub EndpointTarget);

impl EndpointStrategy for PrimaryBearerStrategy {
    fn kind(&self) -> EndpointKind {
        EndpointKind::PrimaryBearer
    }

    fn resolve(&self, tokens: &LoginTokens<'_>) -> Option<PaymentEndpoint> {
        let token = tokens.primary.filter(|t| is_real_token(t))?;
        Some(self.0.endpoint(self.kind(), EndpointAuth::Bearer(token.to_string())))
    }
}

#[derive(Debug)]
pub struct SessionCookieStrategy(pub EndpointTarget);

impl EndpointStrategy for SessionCookieStrategy {
    fn kind(&self) -> EndpointKind {
        EndpointKind::SessionCookie
    }

    fn resolve(&self, _tokens: &LoginTokens<'_>) -> Option<PaymentEndpoint> {
        Some(self.0.endpoint(self.kind(), EndpointAuth::SessionCookie))
    }
}

/// Ordered list of strategies, highest priority first
#[derive(Debug)]
pub struct EndpointSelector {
    strategies: Vec<Box<dyn EndpointStrategy>>,
}

impl EndpointSelector {
    pub fn new(strategies: Vec<Box<dyn EndpointStrategy>>) -> Self {
        Self { strategies }
    }

    /// secondary token, then primary JWT as bearer, then session cookie
    pub fn standard(secondary: EndpointTarget, bearer: EndpointTarget, session: EndpointTarget) -> Self {
        Self::new(vec![
            Box::new(SecondaryTokenStrategy(secondary)),
            Box::new(PrimaryBearerStrategy(bearer)),
            Box::new(SessionCookieStrategy(session)),
        ])
    }

    pub fn select(&self, tokens: &LoginTokens<'_>) -> Option<PaymentEndpoint> {
        self.strategies.iter().find_map(|s| {
            let endpoint = s.resolve(tokens);
            if endpoint.is_none() {
                tracing::debug!("Payment strategy {} not applicable", s.kind());
            }
            endpoint
        })
    }
}
