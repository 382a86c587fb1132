use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// An image object found on the media server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    /// Server-assigned `id` attribute, or a generated token when the server omits it
    pub id: String,
    /// Empty unless title capture is enabled
    pub title: String,
    pub url: Url,
    /// `dc:date`, filled only when metadata capture is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `resolution` attribute of the chosen `<res>`, e.g. `6000x4000`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// `size` attribute of the chosen `<res>`, in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Opaque identifier of a browsable folder in the server's object tree
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub String);

impl ContainerId {
    /// The well-known root container ("0")
    pub fn root() -> Self {
        ContainerId("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        ContainerId(s.to_string())
    }
}

/// Absolute URL where Browse SOAP requests are POSTed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlEndpoint(String);

impl ControlEndpoint {
    /// Normalize a `controlURL` value from the device description.
    ///
    /// Values starting with an HTTP scheme are used as-is; anything else is
    /// treated as a path on `base_url`.
    pub fn from_control_url(base_url: &str, control_url: &str) -> Self {
        let control_url = control_url.trim();
        if control_url.starts_with("http://") || control_url.starts_with("https://") {
            return ControlEndpoint(control_url.to_string());
        }

        let base = base_url.trim_end_matches('/');
        if control_url.starts_with('/') {
            ControlEndpoint(format!("{}{}", base, control_url))
        } else {
            ControlEndpoint(format!("{}/{}", base, control_url))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded listing of one Browse call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrowseResult {
    pub items: Vec<ImageItem>,
    pub container_ids: Vec<ContainerId>,
    /// `NumberReturned` from the Browse response, when the server sent one
    pub number_returned: Option<u32>,
    /// `TotalMatches` from the Browse response, when the server sent one
    pub total_matches: Option<u32>,
}

impl BrowseResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.container_ids.is_empty()
    }
}

/// What the device description says about the server
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescription {
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    /// Raw `controlURL` of the ContentDirectory service, possibly relative
    pub control_url: String,
}
