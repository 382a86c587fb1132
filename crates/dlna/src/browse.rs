/// ContentDirectory Browse: SOAP request construction and response unwrapping
use crate::didl::{decode_didl, DidlOptions};
use crate::xml_events::{self, Flow, XmlError, XmlListener};
use nexgallery_core::{BrowseResult, ContainerId, ControlEndpoint, GalleryError, Result, UpnpTransport};
use tracing::{debug, warn};

pub const CONTENT_DIRECTORY_SERVICE_TYPE: &str = "urn:schemas-upnp-org:service:ContentDirectory:1";

/// `SOAPAction` header value for Browse, quotes included
pub const BROWSE_SOAP_ACTION: &str = "\"urn:schemas-upnp-org:service:ContentDirectory:1#Browse\"";

/// One BrowseDirectChildren page of a container
#[derive(Debug, Clone)]
pub struct BrowseRequest<'a> {
    pub object_id: &'a ContainerId,
    pub starting_index: u32,
    pub requested_count: u32,
}

impl<'a> BrowseRequest<'a> {
    pub fn first_page(object_id: &'a ContainerId, requested_count: u32) -> Self {
        Self {
            object_id,
            starting_index: 0,
            requested_count,
        }
    }

    pub fn to_soap_body(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:Browse xmlns:u="{}">
      <ObjectID>{}</ObjectID>
      <BrowseFlag>BrowseDirectChildren</BrowseFlag>
      <Filter>*</Filter>
      <StartingIndex>{}</StartingIndex>
      <RequestedCount>{}</RequestedCount>
      <SortCriteria></SortCriteria>
    </u:Browse>
  </s:Body>
</s:Envelope>"#,
            CONTENT_DIRECTORY_SERVICE_TYPE,
            escape_xml(self.object_id.as_str()),
            self.starting_index,
            self.requested_count
        )
    }
}

/// POST a Browse request and decode the listing
pub async fn browse<T: UpnpTransport + ?Sized>(
    transport: &T,
    endpoint: &ControlEndpoint,
    request: &BrowseRequest<'_>,
    options: DidlOptions,
) -> Result<BrowseResult> {
    debug!(
        "Browse {} (start {}, count {}) at {}",
        request.object_id, request.starting_index, request.requested_count, endpoint
    );

    let response = transport
        .post_soap(endpoint.as_str(), BROWSE_SOAP_ACTION, request.to_soap_body())
        .await?;

    let result = decode_browse_response(&response, options)?;
    debug!(
        "Container {}: {} image(s), {} child container(s)",
        request.object_id,
        result.items.len(),
        result.container_ids.len()
    );
    Ok(result)
}

/// Unwrap the escaped DIDL-Lite document from a Browse response envelope.
///
/// A missing or empty `Result` element, or text that is not valid UTF-8,
/// decodes to an empty listing.
pub fn decode_browse_response(body: &[u8], options: DidlOptions) -> Result<BrowseResult> {
    let mut scanner = ResponseScanner::default();
    match xml_events::drive(body, &mut scanner) {
        Ok(_) => {}
        Err(XmlError::Utf8(e)) => {
            warn!("Browse response is not valid UTF-8 ({}), treating container as empty", e);
            return Ok(BrowseResult::default());
        }
        Err(e) => return Err(GalleryError::decode("SOAP envelope", e)),
    }

    let mut result = match scanner.result {
        Some(didl) if !didl.trim().is_empty() => decode_didl(didl.as_bytes(), options)?,
        _ => BrowseResult::default(),
    };
    result.number_returned = scanner.number_returned;
    result.total_matches = scanner.total_matches;
    Ok(result)
}

#[derive(Debug, Default)]
struct ResponseScanner {
    current_element: Option<String>,
    result: Option<String>,
    counter_text: String,
    number_returned: Option<u32>,
    total_matches: Option<u32>,
}

impl XmlListener for ResponseScanner {
    fn on_start(&mut self, name: &str, _attrs: &[(String, String)]) -> Flow {
        match name {
            "Result" => {
                self.result.get_or_insert_with(String::new);
            }
            "NumberReturned" | "TotalMatches" => self.counter_text.clear(),
            _ => {}
        }
        self.current_element = Some(name.to_string());
        Flow::Continue
    }

    fn on_text(&mut self, text: &str) -> Flow {
        match self.current_element.as_deref() {
            Some("Result") => {
                if let Some(result) = self.result.as_mut() {
                    result.push_str(text);
                }
            }
            Some("NumberReturned") | Some("TotalMatches") => self.counter_text.push_str(text.trim()),
            _ => {}
        }
        Flow::Continue
    }

    fn on_end(&mut self, name: &str) -> Flow {
        self.current_element = None;
        match name {
            "NumberReturned" => self.number_returned = self.counter_text.parse().ok(),
            "TotalMatches" => self.total_matches = self.counter_text.parse().ok(),
            _ => {}
        }
        Flow::Continue
    }
}

/// Escape XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
