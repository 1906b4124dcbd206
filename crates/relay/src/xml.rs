//! XML to JSON conversion for results API replies
//!
//! Elements become object keys, attributes become fields of their element,
//! repeated siblings collapse into an array. Text-only elements become
//! strings; text next to attributes or children is kept under `$t`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

const TEXT_KEY: &str = "$t";

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut fields = Map::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            fields.insert(key, Value::String(attr.unescape_value()?.into_owned()));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            fields,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let Frame {
            name,
            mut fields,
            text,
        } = self;

        let value = match (fields.is_empty(), text.is_empty()) {
            (true, false) => Value::String(text),
            (_, true) => Value::Object(fields),
            (false, false) => {
                fields.insert(TEXT_KEY.to_string(), Value::String(text));
                Value::Object(fields)
            }
        };
        (name, value)
    }
}

fn insert(target: &mut Map<String, Value>, key: String, value: Value) {
    match target.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            target.insert(key, value);
        }
    }
}

fn parent<'a>(stack: &'a mut [Frame], root: &'a mut Map<String, Value>) -> &'a mut Map<String, Value> {
    match stack.last_mut() {
        Some(frame) => &mut frame.fields,
        None => root,
    }
}

fn convert(xml: &str) -> Result<Option<Value>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root = Map::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(Frame::open(&e)?),
            Event::Empty(e) => {
                let (name, value) = Frame::open(&e)?.close();
                insert(parent(&mut stack, &mut root), name, value);
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    return Ok(None);
                };
                let (name, value) = frame.close();
                insert(parent(&mut stack, &mut root), name, value);
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    // Character data outside the root element
                    None => return Ok(None),
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() || root.is_empty() {
        return Ok(None);
    }
    Ok(Some(Value::Object(root)))
}

/// Convert an XML document to JSON. `None` when the text is not XML.
pub fn to_json(text: &str) -> Option<Value> {
    if !text.trim_start().starts_with('<') {
        return None;
    }
    convert(text).ok().flatten()
}
