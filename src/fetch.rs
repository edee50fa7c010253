//! Request construction for the Hopyfy Cart API
//!
//! A [`RequestSpec`] describes one API call relative to the client's base
//! URL. It is deliberately detached from any HTTP client so the session
//! layer can replay the same request after a token refresh.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::Error;

/// A buildable, replayable description of one API request
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    path: String,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl RequestSpec {
    /// Create a new request for a path relative to the API base URL
    pub fn new(method: Method, path: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            method,
            path: path.to_string(),
            headers,
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add a query parameter to the request
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(json);
        Ok(self)
    }

    /// Build a reqwest request against the given base URL, attaching the
    /// bearer token when one is present. Builds a fresh request each call
    /// so a 401'd request can be replayed with a new token.
    pub(crate) fn build(
        &self,
        client: &reqwest::Client,
        base_url: &str,
        access_token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let mut url = Url::parse(base_url)?.join(&self.path)?;

        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        let mut req = client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        if let Some(token) = access_token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }
}

/// Helper for creating API requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get(path: &str) -> RequestSpec {
        RequestSpec::new(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(path: &str) -> RequestSpec {
        RequestSpec::new(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(path: &str) -> RequestSpec {
        RequestSpec::new(Method::PUT, path)
    }

    /// Create a PATCH request
    pub fn patch(path: &str) -> RequestSpec {
        RequestSpec::new(Method::PATCH, path)
    }

    /// Create a DELETE request
    pub fn delete(path: &str) -> RequestSpec {
        RequestSpec::new(Method::DELETE, path)
    }
}
