//! PowerPoint (`.pptx`) text extraction.
//!
//! A `.pptx` file is a zip archive of DrawingML parts. The deck's slide order
//! is the `<p:sldIdLst>` of `ppt/presentation.xml`, whose relationship ids
//! resolve to slide parts through `ppt/_rels/presentation.xml.rels`. Slide
//! text lives in `<p:sp>` shapes that carry a `<p:txBody>`. Each shape becomes
//! one block of text with its paragraphs on separate lines, and shapes are
//! joined one per line in slide order.

use super::provider::{ExtractionError, TextExtractor};
use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

type Archive = ZipArchive<Cursor<Vec<u8>>>;

/// Extracts shape text from every slide of a presentation.
#[derive(Debug, Default)]
pub struct PptxExtractor;

impl PptxExtractor {
    /// Create a new PPTX extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PptxExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let data = tokio::fs::read(path).await?;

        tokio::task::spawn_blocking(move || read_presentation(data))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))?
    }

    fn provider_name(&self) -> &'static str {
        "pptx"
    }
}

fn pptx_error(context: &str, e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Pptx(format!("{context}: {e}"))
}

fn read_presentation(data: Vec<u8>) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| pptx_error("not a zip archive", e))?;

    let presentation = read_part(&mut archive, PRESENTATION_PART)?.ok_or_else(|| {
        ExtractionError::Pptx(format!(
            "missing {PRESENTATION_PART}; not a PowerPoint presentation"
        ))
    })?;

    let slides = match listed_slide_ids(&presentation)? {
        Some(ids) => resolve_slide_parts(&mut archive, &ids)?,
        None => numbered_slide_parts(&archive),
    };

    let mut texts = Vec::new();
    for name in slides {
        let xml = read_part(&mut archive, &name)?
            .ok_or_else(|| ExtractionError::Pptx(format!("missing slide part {name}")))?;
        texts.extend(shape_texts(&xml)?);
    }

    Ok(texts.join("\n"))
}

/// Contents of an archive member, `None` if it does not exist.
fn read_part(archive: &mut Archive, name: &str) -> Result<Option<String>, ExtractionError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(pptx_error(name, e)),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// Map relationship ids from `<p:sldIdLst>` to slide part names, in list order.
fn resolve_slide_parts(archive: &mut Archive, ids: &[String]) -> Result<Vec<String>, ExtractionError> {
    let rels = read_part(archive, PRESENTATION_RELS)?.unwrap_or_default();
    let targets = relationship_targets(&rels)?;

    ids.iter()
        .map(|id| {
            targets
                .get(id)
                .map(|target| part_name(target))
                .ok_or_else(|| ExtractionError::Pptx(format!("slide relationship {id} has no target")))
        })
        .collect()
}

/// Relationship targets are relative to `ppt/` unless absolute.
fn part_name(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{target}"),
    }
}

/// `ppt/slides/slide12.xml` -> 12
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Slide parts by their number, for presentations without a `<p:sldIdLst>`.
fn numbered_slide_parts(archive: &Archive) -> Vec<String> {
    let mut slides: Vec<(u32, &str)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name)))
        .collect();
    slides.sort_unstable_by_key(|(n, _)| *n);
    slides.into_iter().map(|(_, name)| name.to_string()).collect()
}

/// Call `visit` with every opening or self-closing element of `xml`.
fn for_each_element<F>(xml: &str, context: &str, mut visit: F) -> Result<(), ExtractionError>
where
    F: FnMut(&BytesStart<'_>) -> Result<(), ExtractionError>,
{
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().map_err(|e| pptx_error(context, e))? {
            Event::Start(e) | Event::Empty(e) => visit(&e)?,
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

/// Value of the attribute named `local`, namespaced or not as asked.
fn attribute(
    element: &BytesStart<'_>,
    local: &[u8],
    prefixed: bool,
    context: &str,
) -> Result<Option<String>, ExtractionError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| pptx_error(context, e))?;
        if attr.key.local_name().as_ref() == local && attr.key.prefix().is_some() == prefixed {
            let value = attr.unescape_value().map_err(|e| pptx_error(context, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Relationship ids of `<p:sldId r:id="…">` entries, or `None` if the
/// presentation has no slide list at all.
fn listed_slide_ids(xml: &str) -> Result<Option<Vec<String>>, ExtractionError> {
    let mut ids: Option<Vec<String>> = None;
    for_each_element(xml, PRESENTATION_PART, |e| {
        match e.local_name().as_ref() {
            b"sldIdLst" => {
                ids.get_or_insert_with(Vec::new);
            }
            b"sldId" => {
                if let Some(id) = attribute(e, b"id", true, PRESENTATION_PART)? {
                    ids.get_or_insert_with(Vec::new).push(id);
                }
            }
            _ => {}
        }
        Ok(())
    })?;
    Ok(ids)
}

/// `Id` -> `Target` of every `<Relationship>`.
fn relationship_targets(xml: &str) -> Result<HashMap<String, String>, ExtractionError> {
    let mut targets = HashMap::new();
    if xml.is_empty() {
        return Ok(targets);
    }
    for_each_element(xml, PRESENTATION_RELS, |e| {
        if e.local_name().as_ref() == b"Relationship" {
            let id = attribute(e, b"Id", false, PRESENTATION_RELS)?;
            let target = attribute(e, b"Target", false, PRESENTATION_RELS)?;
            if let (Some(id), Some(target)) = (id, target) {
                targets.insert(id, target);
            }
        }
        Ok(())
    })?;
    Ok(targets)
}

#[derive(Default)]
struct ShapeText {
    has_body: bool,
    paragraphs: Vec<String>,
}

impl ShapeText {
    fn open(&mut self, name: &[u8]) {
        match name {
            b"txBody" => self.has_body = true,
            b"p" if self.has_body => self.paragraphs.push(String::new()),
            b"br" => self.push_str("\n"),
            _ => {}
        }
    }

    fn push_str(&mut self, text: &str) {
        if let Some(p) = self.paragraphs.last_mut() {
            p.push_str(text);
        }
    }
}

/// Text of each text-bearing shape on one slide, in document order.
fn shape_texts(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut shape: Option<ShapeText> = None;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| pptx_error("malformed slide XML", e))?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => shape = Some(ShapeText::default()),
                b"t" => in_text = true,
                name => {
                    if let Some(s) = shape.as_mut() {
                        s.open(name);
                    }
                }
            },
            Event::Empty(e) => {
                if let Some(s) = shape.as_mut() {
                    s.open(e.local_name().as_ref());
                }
            }
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| pptx_error("bad text run", e))?;
                if let Some(s) = shape.as_mut() {
                    s.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"sp" => {
                    if let Some(s) = shape.take().filter(|s| s.has_body) {
                        shapes.push(s.paragraphs.join("\n"));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
