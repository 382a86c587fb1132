/// Public entry point: resolve the ContentDirectory endpoint, then walk the tree from the root
use crate::description;
use crate::transport::HttpTransport;
use crate::walker::{ContentTreeWalker, WalkOptions};
use nexgallery_core::{
    ContainerId, ControlEndpoint, DeviceDescription, GalleryConfig, ImageItem, Result,
    UpnpTransport,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Image listing client for one media server.
///
/// Holds no state between calls: every `fetch_images` resolves the endpoint
/// again and walks the whole tree.
pub struct GalleryClient<T: UpnpTransport = HttpTransport> {
    config: GalleryConfig,
    transport: T,
}

impl GalleryClient<HttpTransport> {
    /// Client using reqwest with the configured timeout
    pub fn new(config: GalleryConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: UpnpTransport> GalleryClient<T> {
    pub fn with_transport(config: GalleryConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Device identity and raw ContentDirectory control URL
    pub async fn describe(&self) -> Result<DeviceDescription> {
        description::fetch_description(
            &self.transport,
            &self.config.base_url,
            &self.config.description_path,
        )
        .await
    }

    /// Absolute ContentDirectory control endpoint
    pub async fn resolve_endpoint(&self) -> Result<ControlEndpoint> {
        description::resolve(
            &self.transport,
            &self.config.base_url,
            &self.config.description_path,
        )
        .await
    }

    /// Every image reachable from the root container
    pub async fn fetch_images(&self) -> Result<Vec<ImageItem>> {
        self.fetch_images_with_cancel(CancellationToken::new()).await
    }

    /// Like [`fetch_images`](Self::fetch_images), aborting with `Cancelled` once `cancel` fires
    pub async fn fetch_images_with_cancel(&self, cancel: CancellationToken) -> Result<Vec<ImageItem>> {
        info!("Fetching images from {}", self.config.base_url);

        let endpoint = self.resolve_endpoint().await?;
        ContentTreeWalker::new(&self.transport, &endpoint, WalkOptions::from(&self.config))
            .with_cancellation(cancel)
            .walk(ContainerId::root())
            .await
    }
}
