/// reqwest-backed HTTP transport for device descriptions and SOAP calls
use async_trait::async_trait;
use nexgallery_core::{GalleryError, Result, UpnpTransport};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GalleryError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Body of any response. A non-success status is logged and the body is
    /// still returned: a SOAP fault carries no `Result` and decodes as an empty
    /// listing, and an error page decodes as a description without ContentDirectory.
    async fn read_body(url: &str, response: reqwest::Response) -> Result<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            warn!("{} returned {}, decoding the body anyway", url, status);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GalleryError::network(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl UpnpTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GalleryError::network(url, e))?;

        Self::read_body(url, response).await
    }

    async fn post_soap(&self, url: &str, soap_action: &str, body: String) -> Result<Vec<u8>> {
        debug!("Sending SOAP action {} to {}", soap_action, url);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(body)
            .send()
            .await
            .map_err(|e| GalleryError::network(url, e))?;

        Self::read_body(url, response).await
    }
}
