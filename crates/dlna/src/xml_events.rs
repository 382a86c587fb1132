/// Streaming XML event adapter over quick-xml
///
/// Listeners see a flattened stream of start/text/end callbacks with
/// namespace prefixes stripped from element and attribute names, and can
/// stop the scan early by returning [`Flow::Stop`].
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::str;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML parsing error {0}")]
    Syntax(String),
    #[error("invalid UTF-8 in XML: {0}")]
    Utf8(#[from] str::Utf8Error),
}

/// Whether the scan should keep going after a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    EndOfDocument,
    Stopped,
}

/// Receives parse events. Names are local names (`upnp:class` arrives as `class`).
pub trait XmlListener {
    fn on_start(&mut self, name: &str, attrs: &[(String, String)]) -> Flow;
    fn on_text(&mut self, text: &str) -> Flow;
    fn on_end(&mut self, name: &str) -> Flow;
}

/// Run `listener` over `xml` until end of document or until it asks to stop.
///
/// Self-closing elements are reported as a start followed by an end.
/// CDATA sections are reported as text.
pub fn drive<L: XmlListener>(xml: &[u8], listener: &mut L) -> Result<Completion, XmlError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XmlError::Syntax(format!("at position {}: {}", reader.buffer_position(), e)))?;

        let flow = match event {
            Event::Start(ref e) => {
                let name = local_name(e)?;
                let attrs = attributes(e)?;
                listener.on_start(&name, &attrs)
            }
            Event::Empty(ref e) => {
                let name = local_name(e)?;
                let attrs = attributes(e)?;
                match listener.on_start(&name, &attrs) {
                    Flow::Stop => Flow::Stop,
                    Flow::Continue => listener.on_end(&name),
                }
            }
            Event::End(ref e) => {
                let name = str::from_utf8(e.local_name().as_ref())?.to_string();
                listener.on_end(&name)
            }
            Event::Text(ref e) => {
                let raw = str::from_utf8(e)?;
                let text = unescape(raw).map_err(|e| XmlError::Syntax(e.to_string()))?;
                listener.on_text(&text)
            }
            Event::CData(ref e) => {
                let text = str::from_utf8(e.as_ref())?;
                listener.on_text(text)
            }
            Event::Eof => return Ok(Completion::EndOfDocument),
            _ => Flow::Continue,
        };

        if flow == Flow::Stop {
            return Ok(Completion::Stopped);
        }
    }
}

fn local_name(e: &BytesStart<'_>) -> Result<String, XmlError> {
    Ok(str::from_utf8(e.local_name().as_ref())?.to_string())
}

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, XmlError> {
    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let key = str::from_utf8(attr.key.local_name().as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Syntax(e.to_string()))?
            .to_string();
        attrs.push((key, value));
    }
    Ok(attrs)
}

/// Value of attribute `name` in a listener's attribute slice
pub fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        stop_at: Option<&'static str>,
    }

    impl XmlListener for Recorder {
        fn on_start(&mut self, name: &str, attrs: &[(String, String)]) -> Flow {
            match attr(attrs, "id") {
                Some(id) => self.events.push(format!("start:{}#{}", name, id)),
                None => self.events.push(format!("start:{}", name)),
            }
            Flow::Continue
        }

        fn on_text(&mut self, text: &str) -> Flow {
            if !text.trim().is_empty() {
                self.events.push(format!("text:{}", text.trim()));
            }
            Flow::Continue
        }

        fn on_end(&mut self, name: &str) -> Flow {
            self.events.push(format!("end:{}", name));
            if self.stop_at == Some(name) {
                Flow::Stop
            } else {
                Flow::Continue
            }
        }
    }

    #[test]
    fn test_prefixes_stripped_and_empty_elements_expanded() {
        let xml = br#"<a:root xmlns:a="urn:x"><upnp:class>object.item</upnp:class><container id="7"/></a:root>"#;
        let mut recorder = Recorder::default();

        let completion = drive(xml, &mut recorder).unwrap();

        assert_eq!(completion, Completion::EndOfDocument);
        assert_eq!(
            recorder.events,
            vec![
                "start:root",
                "start:class",
                "text:object.item",
                "end:class",
                "start:container#7",
                "end:container",
                "end:root",
            ]
        );
    }

    #[test]
    fn test_entities_and_cdata_become_text() {
        let xml = b"<r><a>x &amp; y</a><b><![CDATA[<raw>]]></b></r>";
        let mut recorder = Recorder::default();

        drive(xml, &mut recorder).unwrap();

        assert!(recorder.events.contains(&"text:x & y".to_string()));
        assert!(recorder.events.contains(&"text:<raw>".to_string()));
    }

    #[test]
    fn test_stop_ends_scan_before_malformed_tail() {
        let xml = b"<r><done/><broken></oops></r>";
        let mut recorder = Recorder {
            stop_at: Some("done"),
            ..Default::default()
        };

        let completion = drive(xml, &mut recorder).unwrap();

        assert_eq!(completion, Completion::Stopped);
        assert_eq!(recorder.events.last().map(String::as_str), Some("end:done"));
    }

    #[test]
    fn test_invalid_utf8_text_is_utf8_error() {
        let mut recorder = Recorder::default();
        let err = drive(b"<r>\xff\xfe</r>", &mut recorder).unwrap_err();
        assert!(matches!(err, XmlError::Utf8(_)));
    }

    #[test]
    fn test_mismatched_end_tag_is_an_error() {
        let mut recorder = Recorder::default();
        assert!(drive(b"<r><a></b></r>", &mut recorder).is_err());
    }
}
