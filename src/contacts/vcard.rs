//! vCard 3.0 block building and serialization

use super::PhoneNumber;

pub const BEGIN: &str = "BEGIN:VCARD";
pub const VERSION: &str = "VERSION:3.0";
pub const END: &str = "END:VCARD";

/// How the display name combines the contact name and its index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// `Budi`
    Plain,
    /// `Budi 1`
    Numbered,
    /// `Budi - 01`
    Padded,
}

impl NameStyle {
    pub fn display_name(self, name: &str, index: usize) -> String {
        match self {
            NameStyle::Plain => name.to_string(),
            NameStyle::Numbered => format!("{name} {index}"),
            NameStyle::Padded => format!("{name} - {index:02}"),
        }
    }
}

/// Which properties carry the name and number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// `FN:` + `TEL:`
    Formatted,
    /// `N:` + `TEL;TYPE=CELL:`
    Structured,
}

/// One contact to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub name: String,
    pub index: usize,
    pub number: PhoneNumber,
}

impl ContactRecord {
    pub fn new(name: impl Into<String>, index: usize, number: PhoneNumber) -> Self {
        Self {
            name: name.into(),
            index,
            number,
        }
    }
}

/// Render one record as a five-line block, without a trailing newline.
pub fn build_record(record: &ContactRecord, style: NameStyle, shape: RecordShape) -> String {
    let display = style.display_name(&record.name, record.index);
    let (name_line, tel_line) = match shape {
        RecordShape::Formatted => (format!("FN:{display}"), format!("TEL:{}", record.number)),
        RecordShape::Structured => (
            format!("N:{display}"),
            format!("TEL;TYPE=CELL:{}", record.number),
        ),
    };
    render_block(&name_line, &tel_line)
}

/// Wrap an already formatted name line and telephone line in card markers.
pub fn render_block(name_line: &str, tel_line: &str) -> String {
    format!("{BEGIN}\n{VERSION}\n{name_line}\n{tel_line}\n{END}")
}

/// Number a batch of phone numbers from 1 and render each as a block.
pub fn build_records(
    name: &str,
    numbers: &[PhoneNumber],
    style: NameStyle,
    shape: RecordShape,
) -> Vec<String> {
    numbers
        .iter()
        .enumerate()
        .map(|(i, number)| {
            build_record(&ContactRecord::new(name, i + 1, number.clone()), style, shape)
        })
        .collect()
}

/// Join blocks with single newlines and end with a newline.
pub fn serialize(blocks: &[String]) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    let mut out = blocks.join("\n");
    out.push('\n');
    out
}

/// Follow every block with a blank line.
pub fn serialize_spaced(blocks: &[String]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str(block);
        out.push_str("\n\n");
    }
    out
}

/// Append blocks after an existing document without touching its bytes.
pub fn append_records(existing: &[u8], blocks: &[String]) -> Vec<u8> {
    let extra: usize = blocks.iter().map(|b| b.len() + 1).sum();
    let mut out = Vec::with_capacity(existing.len() + extra + 1);
    out.extend_from_slice(existing);
    if !existing.is_empty() && !existing.ends_with(b"\n") {
        out.push(b'\n');
    }
    for block in blocks {
        out.extend_from_slice(block.as_bytes());
        out.push(b'\n');
    }
    out
}

/// Lines whose property name is `TEL`, in document order.
pub fn telephone_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| property_name(line).eq_ignore_ascii_case("TEL"))
        .collect()
}

/// The value after the first `:` of a `TEL` line.
pub fn telephone_value(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, value)| value.trim())
}

/// Whether the bytes look like a vCard document at all.
pub fn looks_like_vcard(text: &str) -> bool {
    text.lines()
        .any(|line| line.trim().eq_ignore_ascii_case(BEGIN))
}

/// Property name of a content line: everything before the first `;` or `:`.
pub(crate) fn property_name(line: &str) -> &str {
    let end = line.find([';', ':']).unwrap_or(0);
    line.get(..end).unwrap_or("").trim()
}
