/// UPnP/DLNA ContentDirectory client
///
/// This crate provides:
/// - A streaming XML event adapter over quick-xml
/// - Device description parsing (ContentDirectory control URL lookup)
/// - Browse SOAP requests and response unwrapping
/// - DIDL-Lite decoding into image items
/// - Depth-first traversal of the content tree
/// - A reqwest-backed HTTP transport
pub mod browse;
pub mod client;
pub mod description;
pub mod didl;
pub mod transport;
pub mod walker;
pub mod xml_events;

#[cfg(test)]
pub(crate) mod test_support;

pub use browse::{browse, decode_browse_response, BrowseRequest, BROWSE_SOAP_ACTION};
pub use client::GalleryClient;
pub use description::{parse_device_description, resolve};
pub use didl::{decode_didl, DidlOptions};
pub use transport::HttpTransport;
pub use walker::{ContentTreeWalker, WalkOptions};

pub use nexgallery_core::*;
