//! SVG rewriting with quick-xml.
//!
//! ```text
//! clean:  drop prolog, comments, editor metadata; keep ids
//! symbol: <svg viewBox=…>…</svg> → <symbol id=… viewBox=…>…</symbol>
//! ```

use anyhow::{Result, bail};
use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, Event},
};

/// Elements removed together with their content.
const DROPPED_ELEMENTS: &[&[u8]] = &[b"metadata", b"title", b"desc"];
/// Namespace prefixes written by editors.
const EDITOR_PREFIXES: &[&[u8]] = &[b"inkscape", b"sodipodi", b"sketch"];

fn reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);
    reader
}

fn is_editor_name(name: &[u8]) -> bool {
    let prefix = name.split(|b| *b == b':').next().unwrap_or_default();
    (name.contains(&b':') && EDITOR_PREFIXES.contains(&prefix))
        || name
            .strip_prefix(b"xmlns:")
            .is_some_and(|ns| EDITOR_PREFIXES.contains(&ns))
}

fn is_dropped_element(name: &[u8]) -> bool {
    DROPPED_ELEMENTS.contains(&name) || is_editor_name(name)
}

/// Copy of `elem` under `name`, minus editor attributes and `skip`.
fn filtered(elem: &BytesStart<'_>, name: &str, skip: &[&[u8]]) -> Result<BytesStart<'static>> {
    let mut out = BytesStart::new(name.to_string());
    for attr in elem.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if is_editor_name(key) || skip.contains(&key) {
            continue;
        }
        out.push_attribute((key, attr.value.as_ref()));
    }
    Ok(out)
}

fn element_name(elem: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(elem.name().as_ref()).into_owned()
}

/// Remove everything a browser does not need, keeping ids.
pub fn clean(content: &[u8]) -> Result<Vec<u8>> {
    let mut reader = reader(content);
    let mut writer = Writer::new(Vec::with_capacity(content.len()));

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if is_dropped_element(elem.name().as_ref()) => {
                let end = elem.to_end().into_owned();
                reader.read_to_end(end.name())?;
            }
            Ok(Event::Empty(elem)) if is_dropped_element(elem.name().as_ref()) => {}
            Ok(Event::Start(elem)) => {
                let name = element_name(&elem);
                writer.write_event(Event::Start(filtered(&elem, &name, &[])?))?;
            }
            Ok(Event::Empty(elem)) => {
                let name = element_name(&elem);
                writer.write_event(Event::Empty(filtered(&elem, &name, &[])?))?;
            }
            Ok(Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_)) => {}
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(e) => bail!(
                "SVG parse error at position {}: {}",
                reader.error_position(),
                e
            ),
        }
    }

    Ok(writer.into_inner())
}

/// `viewBox` of a root element, derived from width/height when missing.
fn view_box(root: &BytesStart<'_>) -> Result<Option<String>> {
    let mut width = None;
    let mut height = None;
    for attr in root.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(attr.value.as_ref()).into_owned();
        match attr.key.as_ref() {
            b"viewBox" => return Ok(Some(value)),
            b"width" => width = Some(value),
            b"height" => height = Some(value),
            _ => {}
        }
    }
    let number = |v: Option<String>| -> Option<String> {
        let v = v?;
        let v = v.trim().trim_end_matches("px");
        v.parse::<f64>().ok().map(|_| v.to_string())
    };
    Ok(number(width)
        .zip(number(height))
        .map(|(w, h)| format!("0 0 {w} {h}")))
}

/// Rewrite a standalone SVG as a `<symbol>` with the given id.
pub fn to_symbol(content: &[u8], id: &str) -> Result<String> {
    let cleaned = clean(content)?;
    let mut reader = reader(&cleaned);
    let mut writer = Writer::new(Vec::with_capacity(cleaned.len()));
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => bail!("SVG parse error at position {}: {}", reader.error_position(), e),
        };
        match event {
            Event::Start(elem) if depth == 0 => {
                if elem.name().as_ref() != b"svg" {
                    bail!("root element is not <svg>");
                }
                seen_root = true;
                depth = 1;
                writer.write_event(Event::Start(symbol_start(&elem, id)?))?;
            }
            Event::Empty(elem) if depth == 0 => {
                if elem.name().as_ref() != b"svg" {
                    bail!("root element is not <svg>");
                }
                seen_root = true;
                writer.write_event(Event::Empty(symbol_start(&elem, id)?))?;
            }
            Event::Start(elem) => {
                depth += 1;
                writer.write_event(Event::Start(elem))?;
            }
            Event::End(_) if depth == 1 => {
                depth = 0;
                writer.write_event(Event::End(BytesEnd::new("symbol")))?;
            }
            Event::End(elem) => {
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(elem))?;
            }
            Event::Eof => break,
            event if depth > 0 => writer.write_event(event)?,
            _ => {}
        }
    }

    if !seen_root {
        bail!("no <svg> element");
    }
    Ok(String::from_utf8(writer.into_inner())?)
}

fn symbol_start(root: &BytesStart<'_>, id: &str) -> Result<BytesStart<'static>> {
    let mut symbol = BytesStart::new("symbol");
    symbol.push_attribute(("id", id));
    if let Some(view_box) = view_box(root)? {
        symbol.push_attribute(("viewBox", view_box.as_str()));
    }
    // Root sizing and namespace attributes do not apply to a symbol
    let skip: &[&[u8]] = &[
        b"id", b"viewBox", b"width", b"height", b"xmlns", b"xmlns:xlink", b"version", b"x", b"y",
    ];
    for attr in filtered(root, "svg", skip)?.attributes() {
        let attr = attr?;
        symbol.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
    }
    Ok(symbol)
}
