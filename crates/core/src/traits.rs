use crate::error::Result;
use async_trait::async_trait;

/// HTTP operations the UPnP client needs from the network
#[async_trait]
pub trait UpnpTransport: Send + Sync {
    /// Fetch a document (device description) and return its body
    async fn get(&self, url: &str) -> Result<Vec<u8>>;

    /// POST a SOAP envelope with the given `SOAPAction` header value and return the response body
    async fn post_soap(&self, url: &str, soap_action: &str, body: String) -> Result<Vec<u8>>;
}
