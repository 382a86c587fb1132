/// Depth-first traversal of the ContentDirectory tree
///
/// Containers are visited in pre-order: the images listed directly in a
/// container are collected before any of its children are browsed, and
/// children are visited in the order the server returned them. One request
/// is outstanding at a time. Any failure aborts the whole walk.
use crate::browse::{browse, BrowseRequest};
use crate::didl::DidlOptions;
use nexgallery_core::{
    BrowseResult, ContainerId, ControlEndpoint, GalleryConfig, GalleryError, ImageItem, Result,
    UpnpTransport,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub page_size: u32,
    pub paginate: bool,
    pub max_depth: Option<usize>,
    pub didl: DidlOptions,
}

impl Default for WalkOptions {
    fn default() -> Self {
        WalkOptions::from(&GalleryConfig::default())
    }
}

impl From<&GalleryConfig> for WalkOptions {
    fn from(config: &GalleryConfig) -> Self {
        Self {
            page_size: config.page_size,
            paginate: config.paginate,
            max_depth: config.max_depth,
            didl: DidlOptions {
                capture_titles: config.capture_titles,
                capture_metadata: config.capture_metadata,
            },
        }
    }
}

pub struct ContentTreeWalker<'a, T: UpnpTransport + ?Sized> {
    transport: &'a T,
    endpoint: &'a ControlEndpoint,
    options: WalkOptions,
    cancel: CancellationToken,
}

impl<'a, T: UpnpTransport + ?Sized> ContentTreeWalker<'a, T> {
    pub fn new(transport: &'a T, endpoint: &'a ControlEndpoint, options: WalkOptions) -> Self {
        Self {
            transport,
            endpoint,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Checked before every Browse call
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Collect every image reachable from `root`
    pub async fn walk(&self, root: ContainerId) -> Result<Vec<ImageItem>> {
        let mut images = Vec::new();
        // Children are pushed in reverse so they pop in server order
        let mut pending = vec![(root, 0usize)];
        let mut containers_visited = 0usize;

        while let Some((container, depth)) = pending.pop() {
            let listing = self.browse_container(&container).await?;
            containers_visited += 1;
            images.extend(listing.items);

            if let Some(max_depth) = self.options.max_depth {
                if depth >= max_depth && !listing.container_ids.is_empty() {
                    warn!(
                        "Not descending into {} child container(s) of {}: depth limit {} reached",
                        listing.container_ids.len(),
                        container,
                        max_depth
                    );
                    continue;
                }
            }

            for child in listing.container_ids.into_iter().rev() {
                pending.push((child, depth + 1));
            }
        }

        info!(
            "Traversal complete: {} image(s) from {} container(s)",
            images.len(),
            containers_visited
        );
        Ok(images)
    }

    /// Browse one container, following pages when pagination is enabled
    async fn browse_container(&self, container: &ContainerId) -> Result<BrowseResult> {
        let mut merged = BrowseResult::default();
        let mut starting_index = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                debug!("Cancelled before browsing {}", container);
                return Err(GalleryError::Cancelled);
            }

            let request = BrowseRequest {
                starting_index,
                ..BrowseRequest::first_page(container, self.options.page_size)
            };
            let page = browse(self.transport, self.endpoint, &request, self.options.didl).await?;

            merged.items.extend(page.items);
            merged.container_ids.extend(page.container_ids);
            merged.number_returned = page.number_returned;
            merged.total_matches = page.total_matches;

            if !self.options.paginate {
                return Ok(merged);
            }

            match (page.number_returned, page.total_matches) {
                (Some(returned), Some(total))
                    if returned > 0 && starting_index.saturating_add(returned) < total =>
                {
                    starting_index += returned;
                }
                _ => return Ok(merged),
            }
        }
    }
}
