//! Structured Product Label (SPL) XML reader.
//!
//! Streams the document once and pulls out what a label record needs:
//!
//! - drug name: first `name` under `manufacturedProduct`
//! - manufacturer: first `name` under `representedOrganization`
//! - source id: `setId/@root`
//! - published date: document-level `effectiveTime/@value` (`YYYYMMDD...`)
//! - indication: sections coded LOINC 34067-9 or titled "Indications and
//!   Usage" (and the like)
//! - directions: sections coded LOINC 34068-7 or whose title mentions
//!   dosage, administration or directions
//!
//! Section text is split into chunks at paragraphs, list items and table
//! rows. Direction list items get a bullet prefix and table cells are joined
//! with " - ". Chunks are deduplicated in document order and joined with
//! newlines. Subsections without a classification of their own inherit
//! their parent's.

use std::path::Path;

use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use rxlabel_model::LabelRecord;
use tracing::{debug, warn};

use crate::dataset::spl_files;
use crate::error::{DataError, SplError};

const INDICATIONS_LOINC: &str = "34067-9";
const DOSAGE_LOINC: &str = "34068-7";

/// Titles (normalized) that mark an indications section.
const INDICATION_TITLES: &[&str] = &[
    "indications",
    "indication",
    "use",
    "uses",
    "usage",
    "indications and usage",
    "indication and usage",
];

/// Title fragments that mark a directions section.
const DIRECTION_KEYWORDS: &[&str] = &[
    "directions",
    "direction",
    "administration",
    "dosage and administration",
    "how to use",
];

const BULLET: &str = "• ";
const CELL_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Indication,
    Directions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// The section's `text` element itself; holds text outside any block.
    Text,
    Paragraph,
    Item,
    Row,
    Cell,
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    buf: String,
    cells: Vec<String>,
}

impl Block {
    fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            buf: String::new(),
            cells: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Section {
    /// Element depth of the `section` start tag.
    depth: usize,
    kind: Option<SectionKind>,
    inherited: Option<SectionKind>,
    title: Option<String>,
    chunks: Vec<String>,
}

impl Section {
    fn effective_kind(&self) -> Option<SectionKind> {
        self.kind.or(self.inherited)
    }
}

/// What the text currently being read belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    DrugName,
    Manufacturer,
    SectionTitle,
}

#[derive(Debug, Default)]
struct SplBuilder {
    /// Local names of the open elements.
    path: Vec<String>,
    sections: Vec<Section>,
    blocks: Vec<Block>,
    capture: Option<(Capture, usize, String)>,
    drug_name: Option<String>,
    manufacturer: Option<String>,
    set_id: Option<String>,
    published: Option<NaiveDate>,
    indication: Vec<String>,
    directions: Vec<String>,
}

/// Parse an SPL document held in memory.
pub fn parse_spl(xml: &str) -> Result<LabelRecord, SplError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = SplBuilder::default();
    loop {
        let event = reader.read_event().map_err(|e| SplError::Xml {
            position: reader.error_position(),
            message: e.to_string(),
        })?;
        match event {
            Event::Start(ref e) => builder.start(e, false),
            Event::Empty(ref e) => builder.start(e, true),
            Event::End(_) => builder.end(),
            Event::Text(ref e) => {
                let text = e.decode().map_err(|err| SplError::Xml {
                    position: reader.buffer_position(),
                    message: err.to_string(),
                })?;
                builder.text(&text);
            }
            Event::CData(ref e) => {
                builder.text(&String::from_utf8_lossy(e));
            }
            Event::GeneralRef(ref e) => {
                let name = e.decode().map_err(|err| SplError::Xml {
                    position: reader.buffer_position(),
                    message: err.to_string(),
                })?;
                if let Some(ch) = resolve_entity(&name) {
                    builder.text(ch.encode_utf8(&mut [0u8; 4]));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    builder.finish()
}

/// Read and parse one SPL file.
pub fn load_spl_file(path: &Path) -> Result<LabelRecord, DataError> {
    let xml = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    let mut record = parse_spl(&xml).map_err(|source| DataError::Spl {
        path: path.to_path_buf(),
        source,
    })?;
    if record.source_id.is_empty() {
        warn!(path = %path.display(), "SPL document has no setId, using file name");
        record.source_id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(record)
}

/// Read every `*.xml` file of a directory, in file name order.
pub fn load_spl_dir(dir: &Path) -> Result<Vec<LabelRecord>, DataError> {
    let records = spl_files(dir)?
        .iter()
        .map(|path| load_spl_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(dir = %dir.display(), records = records.len(), "loaded SPL documents");
    Ok(records)
}

impl SplBuilder {
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        let parent_name = self.path.last().cloned();
        let parent = parent_name.as_deref();
        let depth = self.path.len() + 1;

        match name.as_str() {
            "section" => {
                let inherited = self.sections.last().and_then(Section::effective_kind);
                self.sections.push(Section {
                    depth,
                    inherited,
                    ..Section::default()
                });
            }
            "code" if parent == Some("section") => {
                if let Some(section) = self.sections.last_mut() {
                    match attribute(e, b"code").as_deref() {
                        Some(INDICATIONS_LOINC) => section.kind = Some(SectionKind::Indication),
                        Some(DOSAGE_LOINC) => section.kind = Some(SectionKind::Directions),
                        _ => {}
                    }
                }
            }
            "title" if parent == Some("section") && !empty => {
                self.capture = Some((Capture::SectionTitle, depth, String::new()));
            }
            "setId" if parent == Some("document") && self.set_id.is_none() => {
                self.set_id = attribute(e, b"root");
            }
            "effectiveTime" if parent == Some("document") && self.published.is_none() => {
                self.published = attribute(e, b"value").as_deref().and_then(parse_hl7_date);
            }
            "name" if !empty && self.capture.is_none() => {
                if self.drug_name.is_none() && self.inside("manufacturedProduct") {
                    self.capture = Some((Capture::DrugName, depth, String::new()));
                } else if self.manufacturer.is_none() && self.inside("representedOrganization")
                {
                    self.capture = Some((Capture::Manufacturer, depth, String::new()));
                }
            }
            _ => {}
        }

        if !empty {
            self.open_block(&name, parent);
            self.path.push(name);
        } else if name == "br" {
            self.text(" ");
        }
    }

    fn open_block(&mut self, name: &str, parent: Option<&str>) {
        let kind = match name {
            "text" if parent == Some("section") => BlockKind::Text,
            _ if self.blocks.is_empty() => return,
            "paragraph" | "caption" => BlockKind::Paragraph,
            "item" => BlockKind::Item,
            "tr" => BlockKind::Row,
            "td" | "th" => BlockKind::Cell,
            _ => return,
        };
        self.blocks.push(Block::new(kind));
    }

    fn end(&mut self) {
        let depth = self.path.len();
        let Some(name) = self.path.pop() else {
            return;
        };

        let closes_capture = self
            .capture
            .as_ref()
            .is_some_and(|(_, capture_depth, _)| *capture_depth == depth);
        if closes_capture && let Some((capture, _, text)) = self.capture.take() {
            self.finish_capture(capture, collapse(&text));
        }

        if self.closes_block(&name) {
            self.close_block();
        }

        if name == "section"
            && self.sections.last().is_some_and(|s| s.depth == depth)
            && let Some(section) = self.sections.pop()
        {
            self.finish_section(section);
        }
    }

    fn closes_block(&self, name: &str) -> bool {
        let Some(block) = self.blocks.last() else {
            return false;
        };
        matches!(
            (block.kind, name),
            (BlockKind::Text, "text")
                | (BlockKind::Paragraph, "paragraph" | "caption")
                | (BlockKind::Item, "item")
                | (BlockKind::Row, "tr")
                | (BlockKind::Cell, "td" | "th")
        )
    }

    fn close_block(&mut self) {
        let Some(block) = self.blocks.pop() else {
            return;
        };
        let kind = self.sections.last().and_then(Section::effective_kind);
        let text = match block.kind {
            BlockKind::Row => block
                .cells
                .into_iter()
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>()
                .join(CELL_SEPARATOR),
            _ => collapse(&block.buf),
        };
        if text.is_empty() {
            return;
        }

        let parent_kind = self.blocks.last().map(|parent| parent.kind);
        match (block.kind, parent_kind) {
            (BlockKind::Cell, Some(BlockKind::Row)) => {
                if let Some(parent) = self.blocks.last_mut() {
                    parent.cells.push(text);
                }
            }
            // Paragraphs inside list items or cells belong to them, as do
            // list items inside cells.
            (BlockKind::Paragraph, Some(BlockKind::Item | BlockKind::Cell))
            | (BlockKind::Item, Some(BlockKind::Cell)) => {
                if let Some(parent) = self.blocks.last_mut() {
                    parent.buf.push(' ');
                    parent.buf.push_str(&text);
                }
            }
            (BlockKind::Item, _) if kind == Some(SectionKind::Directions) => {
                self.push_chunk(format!("{BULLET}{text}"));
            }
            _ => self.push_chunk(text),
        }
    }

    fn push_chunk(&mut self, chunk: String) {
        if let Some(section) = self.sections.last_mut() {
            section.chunks.push(chunk);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, _, buf)) = &mut self.capture {
            buf.push_str(text);
            return;
        }
        if let Some(block) = self.blocks.last_mut() {
            block.buf.push_str(text);
        }
    }

    fn finish_capture(&mut self, capture: Capture, text: String) {
        if text.is_empty() {
            return;
        }
        match capture {
            Capture::DrugName => self.drug_name = Some(text),
            Capture::Manufacturer => self.manufacturer = Some(text),
            Capture::SectionTitle => {
                if let Some(section) = self.sections.last_mut() {
                    if section.kind.is_none() {
                        section.kind = classify_title(&text);
                    }
                    section.title = Some(text);
                }
            }
        }
    }

    fn finish_section(&mut self, section: Section) {
        let Some(kind) = section.effective_kind() else {
            return;
        };
        let target = match kind {
            SectionKind::Indication => &mut self.indication,
            SectionKind::Directions => &mut self.directions,
        };
        for chunk in section.chunks {
            if !target.contains(&chunk) {
                target.push(chunk);
            }
        }
        debug!(title = ?section.title, ?kind, "read SPL section");
    }

    fn inside(&self, element: &str) -> bool {
        self.path.iter().any(|name| name == element)
    }

    fn finish(self) -> Result<LabelRecord, SplError> {
        let drug_name = self.drug_name.ok_or(SplError::MissingDrugName)?;
        Ok(LabelRecord {
            drug_name,
            indication: join_chunks(self.indication),
            directions: join_chunks(self.directions),
            source_id: self.set_id.unwrap_or_default(),
            manufacturer: self.manufacturer,
            published: self.published,
        })
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).trim().to_string())
}

/// Predefined XML entities and character references.
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let reference = name.strip_prefix('#')?;
            let code = match reference.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => reference.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// HL7 timestamps start with `YYYYMMDD`.
fn parse_hl7_date(value: &str) -> Option<NaiveDate> {
    let digits = value.get(..8)?;
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

/// Section titles compare without numbering, case or `&`/`and` spelling.
fn classify_title(title: &str) -> Option<SectionKind> {
    let normalized = title
        .to_lowercase()
        .replace('&', " and ")
        .split(|ch: char| !ch.is_alphabetic())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if INDICATION_TITLES.contains(&normalized.as_str()) {
        Some(SectionKind::Indication)
    } else if DIRECTION_KEYWORDS
        .iter()
        .any(|keyword| normalized.contains(keyword))
    {
        Some(SectionKind::Directions)
    } else {
        None
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn join_chunks(chunks: Vec<String>) -> Option<String> {
    (!chunks.is_empty()).then(|| chunks.join("\n"))
}
