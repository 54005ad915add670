//! Real HTTP transport for the `fetch` command.

use std::future::Future;

use blu_core::{EmptyResponse, FetchRequest, FetchTransport};
use reqwest::Method;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid method: {0}")]
    InvalidMethod(String),
    #[error("Request has no URL")]
    MissingUrl,
}

/// Buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Produced locally instead of by the network
    pub synthetic: bool,
}

impl EmptyResponse for HttpResponse {
    fn empty_success() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
            synthetic: true,
        }
    }
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl FetchTransport for ReqwestTransport {
    type Response = HttpResponse;
    type Error = TransportError;

    fn fetch(&self, request: FetchRequest) -> impl Future<Output = Result<HttpResponse, TransportError>> {
        let client = self.client.clone();
        async move {
            let builder = match request {
                FetchRequest::Url(url) => client.get(url),
                FetchRequest::Descriptor(desc) => {
                    let url = desc.url.ok_or(TransportError::MissingUrl)?;
                    let method = if desc.method.is_empty() {
                        Method::GET
                    } else {
                        Method::from_bytes(desc.method.to_uppercase().as_bytes())
                            .map_err(|_| TransportError::InvalidMethod(desc.method.clone()))?
                    };
                    let mut builder = client.request(method, url);
                    for (name, value) in desc.headers {
                        builder = builder.header(name, value);
                    }
                    if let Some(body) = desc.body {
                        builder = builder.body(body);
                    }
                    builder
                }
            };

            let response = builder.send().await?;
            tracing::debug!(status = %response.status(), url = %response.url(), "forwarded");
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
                .collect();
            let body = response.bytes().await?.to_vec();

            Ok::<_, TransportError>(HttpResponse {
                status,
                headers,
                body,
                synthetic: false,
            })
        }
    }
}
