//! HTTP transport trait and reqwest-based implementation.

use ocommon::{BoxFuture, HeaderList};
use oschema::HttpMethod;

use crate::TransportError;

pub type TransportFuture<'a, T> = BoxFuture<'a, T>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderList,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderList::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|body| std::str::from_utf8(body).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderList,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderList::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    fn send<'a>(&'a self, request: HttpRequest)
    -> TransportFuture<'a, Result<HttpResponse, TransportError>>;
}

#[cfg(feature = "http-transport")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "http-transport")]
mod reqwest_transport {
    use std::time::Duration;

    use reqwest::Client;

    use super::{HttpRequest, HttpResponse, HttpTransport, TransportFuture};
    use crate::TransportError;
    use ocommon::HeaderList;

    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new(client: Client) -> Self {
            Self { client }
        }

        /// Builds a client whose connect and overall read budgets are bounded.
        pub fn with_timeouts(connect: Duration, read: Duration) -> Result<Self, TransportError> {
            let client = Client::builder()
                .connect_timeout(connect)
                .timeout(read)
                .build()
                .map_err(|err| TransportError::other(err.to_string()))?;
            Ok(Self::new(client))
        }

        fn map_send_error(err: reqwest::Error) -> TransportError {
            if err.is_timeout() {
                TransportError::timeout(err.to_string())
            } else if err.is_connect() {
                TransportError::connect(err.to_string())
            } else if err.is_builder() || err.is_request() {
                TransportError::invalid_request(err.to_string())
            } else {
                TransportError::other(err.to_string())
            }
        }
    }

    impl HttpTransport for ReqwestTransport {
        fn send<'a>(
            &'a self,
            request: HttpRequest,
        ) -> TransportFuture<'a, Result<HttpResponse, TransportError>> {
            Box::pin(async move {
                let method = http::Method::from_bytes(request.method.as_str().as_bytes())
                    .map_err(|err| TransportError::invalid_request(err.to_string()))?;

                let mut builder = self.client.request(method, &request.url);
                for (name, value) in request.headers.iter() {
                    builder = builder.header(name, value);
                }
                if let Some(body) = request.body {
                    builder = builder.body(body);
                }

                let response = builder.send().await.map_err(Self::map_send_error)?;

                let status = response.status().as_u16();
                let headers: HeaderList = response
                    .headers()
                    .iter()
                    .filter_map(|(name, value)| {
                        value
                            .to_str()
                            .ok()
                            .map(|value| (name.as_str().to_string(), value.to_string()))
                    })
                    .collect();
                let body = response.text().await.map_err(|err| {
                    if err.is_timeout() {
                        TransportError::timeout(err.to_string())
                    } else {
                        TransportError::invalid_response(err.to_string())
                    }
                })?;

                Ok(HttpResponse {
                    status,
                    headers,
                    body,
                })
            })
        }
    }
}
