//! In-memory transport for walker and client tests

use crate::browse::escape_xml;
use async_trait::async_trait;
use nexgallery_core::{GalleryError, Result, UpnpTransport};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Serves scripted Browse pages keyed by (ObjectID, StartingIndex)
#[derive(Default)]
pub struct ScriptedTransport {
    description: Option<Vec<u8>>,
    pages: HashMap<(String, u32), Vec<u8>>,
    fail_on_call: Option<usize>,
    cancel_on_call: Option<(usize, CancellationToken)>,
    requests: Mutex<Vec<(String, u32, u32)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, xml: &str) -> Self {
        self.description = Some(xml.as_bytes().to_vec());
        self
    }

    pub fn with_page(mut self, object_id: &str, starting_index: u32, body: Vec<u8>) -> Self {
        self.pages.insert((object_id.to_string(), starting_index), body);
        self
    }

    /// Make the n-th Browse call (1-based) fail with a network error
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Cancel `token` while serving the n-th Browse call (1-based); that call still succeeds
    pub fn cancelling_on_call(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((n, token));
        self
    }

    /// (ObjectID, StartingIndex, RequestedCount) of every Browse call, in order
    pub fn requests(&self) -> Vec<(String, u32, u32)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn browsed_containers(&self) -> Vec<String> {
        self.requests().into_iter().map(|(id, _, _)| id).collect()
    }
}

#[async_trait]
impl UpnpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.description
            .clone()
            .ok_or_else(|| GalleryError::network(url, "connection refused"))
    }

    async fn post_soap(&self, url: &str, soap_action: &str, body: String) -> Result<Vec<u8>> {
        assert_eq!(
            soap_action,
            "\"urn:schemas-upnp-org:service:ContentDirectory:1#Browse\""
        );

        let object_id = element_text(&body, "ObjectID");
        let starting_index: u32 = element_text(&body, "StartingIndex").parse().unwrap();
        let requested_count: u32 = element_text(&body, "RequestedCount").parse().unwrap();

        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((object_id.clone(), starting_index, requested_count));
            requests.len()
        };

        if self.fail_on_call == Some(call) {
            return Err(GalleryError::network(url, "connection reset by peer"));
        }
        if let Some((n, token)) = &self.cancel_on_call {
            if *n == call {
                token.cancel();
            }
        }

        // Unscripted containers get the fault a real server sends for an unknown ObjectID
        Ok(self
            .pages
            .get(&(object_id, starting_index))
            .cloned()
            .unwrap_or_else(|| soap_fault(701, "No such object")))
    }
}

fn element_text(xml: &str, tag: &str) -> String {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);
    let start = xml.find(&start_tag).unwrap() + start_tag.len();
    let end = xml[start..].find(&end_tag).unwrap();
    xml[start..start + end].to_string()
}

/// Browse response envelope listing `containers` and image items `(id, url)`.
/// `counters` is `(NumberReturned, TotalMatches)`.
pub fn browse_response(
    containers: &[&str],
    images: &[(&str, &str)],
    counters: Option<(u32, u32)>,
) -> Vec<u8> {
    let mut didl = String::from(
        r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">"#,
    );
    for id in containers {
        didl.push_str(&format!(
            r#"<container id="{}" restricted="1"><dc:title>{}</dc:title><upnp:class>object.container.storageFolder</upnp:class></container>"#,
            id, id
        ));
    }
    for (id, url) in images {
        didl.push_str(&format!(
            r#"<item id="{}" restricted="1"><dc:title>{}</dc:title><upnp:class>object.item.imageItem.photo</upnp:class><res protocolInfo="http-get:*:image/jpeg:*">{}</res></item>"#,
            id, id, url
        ));
    }
    didl.push_str("</DIDL-Lite>");

    let counters = counters
        .map(|(returned, total)| {
            format!(
                "<NumberReturned>{}</NumberReturned><TotalMatches>{}</TotalMatches>",
                returned, total
            )
        })
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:BrowseResponse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1"><Result>{}</Result>{}<UpdateID>1</UpdateID></u:BrowseResponse></s:Body></s:Envelope>"#,
        escape_xml(&didl),
        counters
    )
    .into_bytes()
}

/// UPnP error response, as servers send it alongside HTTP 500
pub fn soap_fault(code: u32, description: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring><detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>{}</errorCode><errorDescription>{}</errorDescription></UPnPError></detail></s:Fault></s:Body></s:Envelope>"#,
        code, description
    )
    .into_bytes()
}
