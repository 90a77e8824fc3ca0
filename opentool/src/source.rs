//! Where the OpenAPI document text comes from.

use std::fmt::Debug;
use std::path::PathBuf;

use ocommon::BoxFuture;

use crate::BridgeError;

pub type SourceFuture<'a, T> = BoxFuture<'a, T>;

pub trait DocumentSource: Send + Sync + Debug {
    /// Raw document text, JSON or YAML.
    fn fetch<'a>(&'a self) -> SourceFuture<'a, Result<String, BridgeError>>;

    /// Absolute URL of the document, used to resolve relative server URLs.
    fn location(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticSource {
    text: String,
    location: Option<String>,
}

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl DocumentSource for StaticSource {
    fn fetch<'a>(&'a self) -> SourceFuture<'a, Result<String, BridgeError>> {
        Box::pin(async move { Ok(self.text.clone()) })
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FileSource {
    fn fetch<'a>(&'a self) -> SourceFuture<'a, Result<String, BridgeError>> {
        Box::pin(async move {
            tokio::fs::read_to_string(&self.path).await.map_err(|err| {
                BridgeError::source(format!("cannot read {}: {err}", self.path.display()))
            })
        })
    }
}

#[cfg(feature = "http-transport")]
pub use url_source::UrlSource;

#[cfg(feature = "http-transport")]
mod url_source {
    use std::time::Duration;

    use reqwest::Client;

    use super::{DocumentSource, SourceFuture};
    use crate::BridgeError;

    #[derive(Debug, Clone)]
    pub struct UrlSource {
        client: Client,
        url: String,
    }

    impl UrlSource {
        pub fn new(client: Client, url: impl Into<String>) -> Self {
            Self {
                client,
                url: url.into(),
            }
        }

        pub fn with_timeouts(
            url: impl Into<String>,
            connect: Duration,
            read: Duration,
        ) -> Result<Self, BridgeError> {
            let client = Client::builder()
                .connect_timeout(connect)
                .timeout(read)
                .build()
                .map_err(|err| BridgeError::source(err.to_string()))?;
            Ok(Self::new(client, url))
        }
    }

    impl DocumentSource for UrlSource {
        fn fetch<'a>(&'a self) -> SourceFuture<'a, Result<String, BridgeError>> {
            Box::pin(async move {
                let response = self
                    .client
                    .get(&self.url)
                    .send()
                    .await
                    .map_err(|err| BridgeError::source(format!("GET {}: {err}", self.url)))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(BridgeError::source(format!(
                        "GET {} returned {}",
                        self.url,
                        status.as_u16()
                    )));
                }

                response
                    .text()
                    .await
                    .map_err(|err| BridgeError::source(format!("GET {}: {err}", self.url)))
            })
        }

        fn location(&self) -> Option<&str> {
            Some(&self.url)
        }
    }
}
