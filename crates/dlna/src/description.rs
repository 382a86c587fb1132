/// ContentDirectory lookup in a UPnP device description
///
/// The scan stops as soon as the first ContentDirectory `<service>` block has
/// been read completely; whatever follows in the document is never parsed.
use crate::xml_events::{self, Flow, XmlListener};
use nexgallery_core::{ControlEndpoint, DeviceDescription, GalleryError, Result, UpnpTransport};
use tracing::{debug, info};

const CONTENT_DIRECTORY_MARKER: &str = "ContentDirectory";

/// Fetch `{base_url}{description_path}` and return the absolute ContentDirectory control endpoint
pub async fn resolve<T: UpnpTransport + ?Sized>(
    transport: &T,
    base_url: &str,
    description_path: &str,
) -> Result<ControlEndpoint> {
    let description = fetch_description(transport, base_url, description_path).await?;
    let endpoint = ControlEndpoint::from_control_url(base_url, &description.control_url);
    info!("ContentDirectory control endpoint: {}", endpoint);
    Ok(endpoint)
}

/// Fetch and parse the device description
pub async fn fetch_description<T: UpnpTransport + ?Sized>(
    transport: &T,
    base_url: &str,
    description_path: &str,
) -> Result<DeviceDescription> {
    let url = join_url(base_url, description_path);
    debug!("Fetching device description from {}", url);

    let body = transport.get(&url).await?;
    parse_device_description(&body)
}

/// Extract the ContentDirectory control URL and device identity from description XML
pub fn parse_device_description(xml: &[u8]) -> Result<DeviceDescription> {
    let mut scanner = ServiceScanner::default();

    xml_events::drive(xml, &mut scanner)
        .map_err(|e| GalleryError::NotFound(format!("malformed device description: {}", e)))?;

    let control_url = scanner.control_url.ok_or_else(|| {
        GalleryError::NotFound("no service with a ContentDirectory serviceType".to_string())
    })?;

    debug!(
        "Found ContentDirectory service {} at {}",
        scanner.service_type, control_url
    );

    Ok(DeviceDescription {
        friendly_name: scanner.friendly_name,
        manufacturer: scanner.manufacturer,
        model_name: scanner.model_name,
        control_url,
    })
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[derive(Debug, Default)]
struct ServiceScanner {
    current_element: Option<String>,
    in_service: bool,
    service_type: String,
    found_content_directory: bool,
    pending_control_url: String,
    control_url: Option<String>,
    friendly_name: Option<String>,
    manufacturer: Option<String>,
    model_name: Option<String>,
}

impl ServiceScanner {
    fn record_identity(&mut self, element: &str, text: &str) {
        let slot = match element {
            "friendlyName" => &mut self.friendly_name,
            "manufacturer" => &mut self.manufacturer,
            "modelName" => &mut self.model_name,
            _ => return,
        };
        // First device block wins; embedded devices repeat these fields
        if slot.is_none() {
            *slot = Some(text.to_string());
        }
    }
}

impl XmlListener for ServiceScanner {
    fn on_start(&mut self, name: &str, _attrs: &[(String, String)]) -> Flow {
        if name == "service" {
            self.in_service = true;
            self.found_content_directory = false;
            self.service_type.clear();
            self.pending_control_url.clear();
        }
        self.current_element = Some(name.to_string());
        Flow::Continue
    }

    fn on_text(&mut self, text: &str) -> Flow {
        let Some(element) = self.current_element.as_deref() else {
            return Flow::Continue;
        };

        if self.in_service {
            match element {
                "serviceType" => {
                    self.service_type.push_str(text.trim());
                    if self.service_type.contains(CONTENT_DIRECTORY_MARKER) {
                        self.found_content_directory = true;
                    }
                }
                "controlURL" => self.pending_control_url.push_str(text.trim()),
                _ => {}
            }
        } else {
            let text = text.trim();
            if !text.is_empty() {
                let element = element.to_string();
                self.record_identity(&element, text);
            }
        }
        Flow::Continue
    }

    fn on_end(&mut self, name: &str) -> Flow {
        self.current_element = None;

        if name != "service" {
            return Flow::Continue;
        }
        self.in_service = false;

        if self.found_content_directory && !self.pending_control_url.is_empty() {
            self.control_url = Some(std::mem::take(&mut self.pending_control_url));
            return Flow::Stop;
        }
        Flow::Continue
    }
}
