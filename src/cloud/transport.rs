/// HTTP seam between the API client and the network
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::TransportError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(path: &str, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            body: Some(body),
            ..Self::get(path)
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Generic request/response capability used by the session and API client
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by `reqwest`
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(format!("homgar-poller/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self
            .base_url
            .join(&request.path)
            .map_err(|e| TransportError(format!("Invalid URL path {}: {e}", request.path)))?;

        debug!("HTTP {:?} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("Failed to read response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reqwest_transport_sends_query_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app/device/getDeviceStatus"))
            .and(query_param("mid", "42"))
            .and(header("auth", "tok"))
            .and(header("appCode", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/basic/app/login"))
            .and(body_json(json!({"areaCode": "31"})))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Url::parse(&server.uri()).unwrap()).unwrap();

        let get = HttpRequest::get("/app/device/getDeviceStatus")
            .query("mid", 42)
            .header("auth", "tok")
            .header("appCode", "1");
        let response = transport.send(get).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"code":0}"#);

        let post = HttpRequest::post_json("/auth/basic/app/login", json!({"areaCode": "31"}));
        let response = transport.send(post).await.unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(response.body, "denied");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new(Url::parse("http://127.0.0.1:1").unwrap()).unwrap();
        assert!(transport.send(HttpRequest::get("/x")).await.is_err());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let request = HttpRequest::get("/x").header("appCode", "1");
        assert_eq!(request.header_value("appcode"), Some("1"));
        assert_eq!(request.header_value("auth"), None);
    }
}
