//! Shared helpers for Office Open XML packages (DOCX, PPTX).

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::BoxError;

/// An OOXML package opened from memory.
pub(crate) type Package<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Open `content` as a zip package.
pub(crate) fn open_package(content: &[u8]) -> Result<Package<'_>, BoxError> {
    Ok(ZipArchive::new(Cursor::new(content))?)
}

/// Read a part as UTF-8 text. Returns `None` when the part is absent.
pub(crate) fn read_part(package: &mut Package<'_>, name: &str) -> Result<Option<String>, BoxError> {
    let mut file = match package.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    match xml.strip_prefix('\u{feff}') {
        Some(stripped) => Ok(Some(stripped.to_string())),
        None => Ok(Some(xml)),
    }
}

/// Read a part that must exist.
pub(crate) fn require_part(package: &mut Package<'_>, name: &str) -> Result<String, BoxError> {
    read_part(package, name)?.ok_or_else(|| format!("missing part {}", name).into())
}

/// Location of the relationships part for `part`.
///
/// `ppt/presentation.xml` maps to `ppt/_rels/presentation.xml.rels`.
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target relative to the part that declares it.
pub(crate) fn resolve_target(part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Relationship ids of `part` mapped to resolved part names.
///
/// External targets (hyperlinks) are skipped.
pub(crate) fn read_relationships(
    package: &mut Package<'_>,
    part: &str,
) -> Result<HashMap<String, String>, BoxError> {
    let mut relationships = HashMap::new();
    let Some(xml) = read_part(package, &rels_path_for(part))? else {
        return Ok(relationships);
    };

    let mut reader = Reader::from_str(&xml);
    reader.trim_text(true);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"Relationship" => {
                if attribute(e, b"TargetMode")?.as_deref() == Some("External") {
                    continue;
                }
                if let (Some(id), Some(target)) = (attribute(e, b"Id")?, attribute(e, b"Target")?) {
                    relationships.insert(id, resolve_target(part, &target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

/// Unescaped value of the attribute with qualified name `name`.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, BoxError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Element children of `node` with the given local name.
pub(crate) fn children_named<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

/// First element child of `node` with the given local name.
pub(crate) fn child_named<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> Option<roxmltree::Node<'a, 'input>> {
    children_named(node, name).next()
}
