// HTTP request and response types

use crate::Extensions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Where a request field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestLocation {
    Query,
    Header,
    Cookie,
}

impl RequestLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestLocation::Query => "query",
            RequestLocation::Header => "header",
            RequestLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for RequestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestLocation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "query" => Ok(RequestLocation::Query),
            "header" | "headers" => Ok(RequestLocation::Header),
            "cookie" | "cookies" => Ok(RequestLocation::Cookie),
            other => Err(crate::Error::BadRequest(format!(
                "unknown request location: {}",
                other
            ))),
        }
    }
}

/// HTTP request wrapper
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    /// Request-scoped typed state shared between middleware and handlers
    pub extensions: Extensions,
}

impl HttpRequest {
    pub fn new(method: String, path: String) -> Self {
        Self {
            method,
            path,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Get a header by name, ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .get(name)
            .or_else(|| header_key(&self.headers, name).and_then(|key| self.headers.get(key)))
    }

    /// Get a cookie by name
    pub fn cookie(&self, name: &str) -> Option<&String> {
        self.cookies.get(name)
    }

    /// Read a field from one of the request's field containers.
    pub fn field(&self, location: RequestLocation, name: &str) -> Option<&String> {
        match location {
            RequestLocation::Query => self.query(name),
            RequestLocation::Header => self.header(name),
            RequestLocation::Cookie => self.cookie(name),
        }
    }

    /// Replace (`Some`) or remove (`None`) a field in one of the containers.
    ///
    /// Header writes replace whichever spelling of the name is already present.
    pub fn set_field(&mut self, location: RequestLocation, name: &str, value: Option<String>) {
        let container = match location {
            RequestLocation::Query => &mut self.query_params,
            RequestLocation::Cookie => &mut self.cookies,
            RequestLocation::Header => {
                let key = header_key(&self.headers, name)
                    .map(str::to_string)
                    .unwrap_or_else(|| name.to_string());
                match value {
                    Some(value) => self.headers.insert(key, value),
                    None => self.headers.remove(&key),
                };
                return;
            }
        };

        match value {
            Some(value) => {
                container.insert(name.to_string(), value);
            }
            None => {
                container.remove(name);
            }
        }
    }

    /// Populate `cookies` from the `Cookie` header (`a=1; b=2`).
    ///
    /// Existing entries are kept unless the header carries the same name.
    pub fn parse_cookie_header(&mut self) {
        let Some(raw) = self.header("cookie").cloned() else {
            return;
        };

        for pair in raw.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim().trim_matches('"');
            self.cookies.insert(name.to_string(), value.to_string());
        }
    }
}

fn header_key<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))
        .map(String::as_str)
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn bad_request() -> Self {
        Self::new(400)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, crate::Error> {
        self.body =
            serde_json::to_vec(value).map_err(|e| crate::Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parsing() {
        assert_eq!("query".parse::<RequestLocation>().unwrap(), RequestLocation::Query);
        assert_eq!("Cookies".parse::<RequestLocation>().unwrap(), RequestLocation::Cookie);
        assert_eq!("headers".parse::<RequestLocation>().unwrap(), RequestLocation::Header);
        assert!("body".parse::<RequestLocation>().is_err());
        assert_eq!(RequestLocation::Header.to_string(), "header");
    }

    #[test]
    fn test_field_lookup_by_location() {
        let req = HttpRequest::new("GET".to_string(), "/items".to_string())
            .with_query("page", "2")
            .with_header("X-Api-Key", "secret")
            .with_cookie("session", "abc");

        assert_eq!(req.field(RequestLocation::Query, "page"), Some(&"2".to_string()));
        assert_eq!(
            req.field(RequestLocation::Header, "x-api-key"),
            Some(&"secret".to_string())
        );
        assert_eq!(req.field(RequestLocation::Cookie, "session"), Some(&"abc".to_string()));
        assert_eq!(req.field(RequestLocation::Query, "missing"), None);
    }

    #[test]
    fn test_set_field_replaces_and_removes() {
        let mut req = HttpRequest::new("GET".to_string(), "/".to_string()).with_query("q", " a ");

        req.set_field(RequestLocation::Query, "q", Some("a".to_string()));
        assert_eq!(req.query("q"), Some(&"a".to_string()));

        req.set_field(RequestLocation::Query, "q", None);
        assert_eq!(req.query("q"), None);
    }

    #[test]
    fn test_set_header_keeps_single_spelling() {
        let mut req = HttpRequest::new("GET".to_string(), "/".to_string())
            .with_header("Content-Type", "text/plain");

        req.set_field(
            RequestLocation::Header,
            "content-type",
            Some("application/json".to_string()),
        );

        assert_eq!(req.headers.len(), 1);
        assert_eq!(
            req.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_parse_cookie_header() {
        let mut req = HttpRequest::new("GET".to_string(), "/".to_string())
            .with_header("Cookie", "session=abc; theme=\"dark\"; broken; =x");

        req.parse_cookie_header();

        assert_eq!(req.cookie("session"), Some(&"abc".to_string()));
        assert_eq!(req.cookie("theme"), Some(&"dark".to_string()));
        assert_eq!(req.cookies.len(), 2);
    }
}
