use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

use reqwest::header::{CONTENT_TYPE, HeaderValue};

/// Header carrying the access token on authenticated requests.
pub const SECURE_TOKEN_HEADER: &str = "x-sms-ir-secure-token";

const JSON_CONTENT_TYPE: &str = "application/json";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub method: HttpMethod,
    pub url: &'a str,
    pub token: Option<&'a str>,
    pub body: Option<String>,
}

impl<'a> HttpRequest<'a> {
    pub fn post(url: &'a str, body: String) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            token: None,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Body for error reporting; blank bodies carry no information.
    pub fn error_body(self) -> Option<String> {
        if self.body.trim().is_empty() {
            None
        } else {
            Some(self.body)
        }
    }
}

/// Sends one JSON request. Every request carries `Content-Type: application/json`.
pub trait HttpTransport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: HttpRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(request.url),
                HttpMethod::Post => self.client.post(request.url),
            }
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

            if let Some(token) = request.token {
                builder = builder.header(SECURE_TOKEN_HEADER, token);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_drops_blank_bodies() {
        let blank = HttpResponse {
            status: 503,
            body: "   ".to_owned(),
        };
        assert!(!blank.is_success());
        assert_eq!(blank.error_body(), None);

        let body = HttpResponse {
            status: 500,
            body: "oops".to_owned(),
        };
        assert_eq!(body.error_body().as_deref(), Some("oops"));
    }

    #[test]
    fn post_request_carries_body_without_token() {
        let post = HttpRequest::post("https://example.invalid/Token", "{}".to_owned());
        assert_eq!(post.method, HttpMethod::Post);
        assert_eq!(post.token, None);
        assert_eq!(post.body.as_deref(), Some("{}"));
    }
}
