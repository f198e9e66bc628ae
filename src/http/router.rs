//! Route table and dispatcher.
//!
//! Routes are kept in registration order and the first match wins. Nothing is
//! de-duplicated: a route registered after an identical one is never reached.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder};

/// A route handler.
///
/// Receives the parsed request and a fresh builder, and must consume the
/// builder through one of its `send*` methods to produce the response.
pub type Handler = Arc<dyn Fn(&Request, ResponseBuilder) -> Response + Send + Sync>;

/// How a multi-character path prefix is compared with the request URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixMatch {
    /// Plain `starts_with`: `/echo` also matches `/echoXYZ`.
    #[default]
    Raw,
    /// The prefix must be followed by the end of the URI, `/` or `?`.
    Segment,
}

impl PrefixMatch {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Some(PrefixMatch::Raw),
            "segment" => Some(PrefixMatch::Segment),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub path_prefix: String,
    handler: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path_prefix", &self.path_prefix)
            .finish_non_exhaustive()
    }
}

impl Route {
    /// Returns true if this route accepts `request`.
    ///
    /// The root prefix `/` (or an empty prefix) only matches the URI `/`
    /// exactly; longer prefixes match by prefix according to `mode`.
    pub fn matches(&self, request: &Request, mode: PrefixMatch) -> bool {
        if request.method != self.method {
            return false;
        }

        if self.path_prefix.len() <= 1 {
            return request.path == "/";
        }

        match request.path.strip_prefix(self.path_prefix.as_str()) {
            None => false,
            Some(rest) => match mode {
                PrefixMatch::Raw => true,
                PrefixMatch::Segment => {
                    rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')
                }
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    mode: PrefixMatch,
}

impl Router {
    pub fn new(mode: PrefixMatch) -> Self {
        Self {
            routes: Vec::new(),
            mode,
        }
    }

    /// Appends a route.
    pub fn register<F>(&mut self, method: Method, path_prefix: impl Into<String>, handler: F)
    where
        F: Fn(&Request, ResponseBuilder) -> Response + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            path_prefix: path_prefix.into(),
            handler: Arc::new(handler),
        });
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn prefix_match(&self) -> PrefixMatch {
        self.mode
    }

    /// Runs the first matching handler.
    ///
    /// Returns the response and whether a route matched. When nothing
    /// matches, the response is a 404 with no body.
    pub fn dispatch(&self, request: &Request) -> (Response, bool) {
        match self.routes.iter().find(|r| r.matches(request, self.mode)) {
            Some(route) => {
                debug!(
                    method = %request.method,
                    path = %request.path,
                    route = %route.path_prefix,
                    "Route matched"
                );
                ((route.handler)(request, ResponseBuilder::new()), true)
            }
            None => {
                debug!(method = %request.method, path = %request.path, "No route matched");
                (Response::not_found(), false)
            }
        }
    }
}
