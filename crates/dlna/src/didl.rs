/// DIDL-Lite decoding for ContentDirectory Browse results
///
/// DIDL-Lite is the metadata format used by UPnP to describe media objects.
/// Only image items and child container IDs are kept; container titles and
/// `childCount` are logged when metadata capture is on.
use crate::xml_events::{self, attr, Flow, XmlListener};
use nexgallery_core::{BrowseResult, ContainerId, GalleryError, ImageItem, Result};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

/// Decoder switches
#[derive(Debug, Clone, Copy, Default)]
pub struct DidlOptions {
    /// Fill `ImageItem::title` from `dc:title`; titles stay empty otherwise
    pub capture_titles: bool,
    /// Fill `date`, `resolution` and `size`; they stay `None` otherwise
    pub capture_metadata: bool,
}

/// Decode a DIDL-Lite document into image items and child container IDs, in document order
pub fn decode_didl(xml: &[u8], options: DidlOptions) -> Result<BrowseResult> {
    let mut decoder = DidlDecoder::new(options);
    xml_events::drive(xml, &mut decoder).map_err(|e| GalleryError::decode("DIDL-Lite", e))?;
    Ok(decoder.finish())
}

/// What happens to an `<item>` once it closes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Emit(ImageItem),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAnImage,
    InvalidUrl(String),
}

#[derive(Debug)]
struct PendingItem {
    id: String,
    is_image: bool,
    /// URL of the first complete `<res>` element
    url: Option<String>,
    title: String,
    date: String,
    resolution: Option<String>,
    size: Option<u64>,
}

impl PendingItem {
    fn new(id: Option<&str>) -> Self {
        Self {
            id: id
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            is_image: false,
            url: None,
            title: String::new(),
            date: String::new(),
            resolution: None,
            size: None,
        }
    }

    fn finish(self) -> ItemOutcome {
        if !self.is_image {
            return ItemOutcome::Skip(SkipReason::NotAnImage);
        }

        let raw = self.url.unwrap_or_default();
        match Url::parse(&raw) {
            Ok(url) => ItemOutcome::Emit(ImageItem {
                id: self.id,
                title: self.title,
                url,
                date: Some(self.date).filter(|d| !d.is_empty()),
                resolution: self.resolution,
                size: self.size,
            }),
            Err(_) => ItemOutcome::Skip(SkipReason::InvalidUrl(raw)),
        }
    }
}

/// Event-driven DIDL-Lite state machine
#[derive(Debug, Default)]
pub struct DidlDecoder {
    options: DidlOptions,
    current_element: Option<String>,
    item: Option<PendingItem>,
    res_text: String,
    /// `resolution` and `size` attributes of the open `<res>`
    res_attrs: (Option<String>, Option<u64>),
    /// id, `childCount` and title of the open `<container>`
    container: Option<(String, Option<u32>, String)>,
    items: Vec<ImageItem>,
    container_ids: Vec<ContainerId>,
}

impl DidlDecoder {
    pub fn new(options: DidlOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn finish(self) -> BrowseResult {
        BrowseResult {
            items: self.items,
            container_ids: self.container_ids,
            number_returned: None,
            total_matches: None,
        }
    }
}

impl XmlListener for DidlDecoder {
    fn on_start(&mut self, name: &str, attrs: &[(String, String)]) -> Flow {
        match name {
            "container" => {
                if let Some(id) = attr(attrs, "id") {
                    self.container_ids.push(ContainerId(id.to_string()));
                    if self.options.capture_metadata {
                        let child_count = attr(attrs, "childCount").and_then(|c| c.trim().parse().ok());
                        self.container = Some((id.to_string(), child_count, String::new()));
                    }
                }
            }
            "item" => self.item = Some(PendingItem::new(attr(attrs, "id"))),
            "res" => {
                self.res_text.clear();
                self.res_attrs = if self.options.capture_metadata {
                    (
                        attr(attrs, "resolution").map(str::to_string),
                        attr(attrs, "size").and_then(|s| s.trim().parse().ok()),
                    )
                } else {
                    (None, None)
                };
            }
            _ => {}
        }
        self.current_element = Some(name.to_string());
        Flow::Continue
    }

    fn on_text(&mut self, text: &str) -> Flow {
        let text = text.trim();
        if text.is_empty() {
            return Flow::Continue;
        }
        if let (Some("title"), Some((_, _, title))) =
            (self.current_element.as_deref(), self.container.as_mut())
        {
            title.push_str(text);
        }
        let (Some(element), Some(item)) = (self.current_element.as_deref(), self.item.as_mut())
        else {
            return Flow::Continue;
        };

        match element {
            "class" => {
                if text.contains("image") {
                    item.is_image = true;
                }
            }
            "res" => self.res_text.push_str(text),
            "title" if self.options.capture_titles => item.title.push_str(text),
            "date" if self.options.capture_metadata => item.date.push_str(text),
            _ => {}
        }
        Flow::Continue
    }

    fn on_end(&mut self, name: &str) -> Flow {
        self.current_element = None;

        match name {
            "res" => {
                if let Some(item) = self.item.as_mut() {
                    if item.url.is_none() && !self.res_text.is_empty() {
                        item.url = Some(std::mem::take(&mut self.res_text));
                        (item.resolution, item.size) = std::mem::take(&mut self.res_attrs);
                    }
                }
            }
            "container" => {
                if let Some((id, child_count, title)) = self.container.take() {
                    debug!("Container {} {:?}: {:?} children", id, title, child_count);
                }
            }
            "item" => {
                if let Some(item) = self.item.take() {
                    let id = item.id.clone();
                    match item.finish() {
                        ItemOutcome::Emit(image) => self.items.push(image),
                        ItemOutcome::Skip(SkipReason::NotAnImage) => {
                            debug!("Skipping non-image DIDL-Lite item {}", id)
                        }
                        ItemOutcome::Skip(SkipReason::InvalidUrl(raw)) => {
                            warn!("Dropping image item {} with unusable URL {:?}", id, raw)
                        }
                    }
                }
            }
            _ => {}
        }
        Flow::Continue
    }
}
