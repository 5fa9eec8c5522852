//! Candidate number extraction from uploaded documents

use super::{normalize, PhoneNumber};
use crate::error::StepError;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use std::io::Cursor;
use std::path::Path;

/// Declared kind of an upload, from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Delimited,
    Spreadsheet,
    ContactCard,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::PlainText),
            "csv" => Some(Self::Delimited),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Spreadsheet),
            "vcf" => Some(Self::ContactCard),
            _ => None,
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, Self::PlainText | Self::Delimited)
    }
}

/// Uploaded text plus the encoding it was read with
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
    /// The upload started with a byte order mark
    pub bom: bool,
}

impl DecodedText {
    /// Encode back into the source encoding, re-emitting the BOM if the
    /// upload had one.
    ///
    /// Fails when `text` holds characters the source encoding cannot
    /// represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, StepError> {
        let mut out = Vec::with_capacity(text.len() + 3);
        if self.bom {
            out.extend_from_slice(bom_bytes(self.encoding));
        }
        // encoding_rs only encodes to UTF-16 via its UTF-8 output encoding
        if self.encoding == UTF_16LE {
            out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        } else if self.encoding == UTF_16BE {
            out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
        } else {
            let (bytes, _, unmappable) = self.encoding.encode(text);
            if unmappable {
                return Err(StepError::Unencodable {
                    encoding: self.encoding.name(),
                });
            }
            out.extend_from_slice(&bytes);
        }
        Ok(out)
    }
}

fn bom_bytes(encoding: &'static Encoding) -> &'static [u8] {
    if encoding == UTF_16LE {
        b"\xff\xfe"
    } else if encoding == UTF_16BE {
        b"\xfe\xff"
    } else {
        b"\xef\xbb\xbf"
    }
}

/// Decode upload bytes: BOM first, then strict UTF-8, then Windows-1252.
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_with_bom_removal(bytes);
        return DecodedText {
            text: text.into_owned(),
            encoding,
            bom: true,
        };
    }
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        return DecodedText {
            text: text.into_owned(),
            encoding: UTF_8,
            bom: false,
        };
    }
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding: WINDOWS_1252,
        bom: false,
    }
}

/// Normalize every line, skipping those that carry no digit.
pub fn extract_lines(text: &str) -> Vec<PhoneNumber> {
    text.lines().filter_map(normalize).collect()
}

/// The first `count` candidate lines and the rest, both normalized
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinePartition {
    pub selected: Vec<PhoneNumber>,
    pub remainder: Vec<PhoneNumber>,
}

/// Split the candidate lines (non-blank, digit-bearing) at `count`.
pub fn partition_lines(text: &str, count: usize) -> LinePartition {
    let mut candidates = extract_lines(text);
    let split_at = count.min(candidates.len());
    let remainder = candidates.split_off(split_at);
    LinePartition {
        selected: candidates,
        remainder,
    }
}

/// Render numbers one per line with a trailing newline.
pub fn numbers_document(numbers: &[PhoneNumber]) -> String {
    let mut out = String::new();
    for number in numbers {
        out.push_str(number.as_str());
        out.push('\n');
    }
    out
}

/// First worksheet as rows of optional cell text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetGrid {
    pub rows: Vec<Vec<Option<String>>>,
    pub width: usize,
}

impl SheetGrid {
    pub fn from_rows(rows: Vec<Vec<Option<String>>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }
}

/// Read the first worksheet of a workbook held in memory.
pub fn read_sheet(file_name: &str, bytes: &[u8]) -> Result<SheetGrid, StepError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| StepError::parse(file_name, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| StepError::parse(file_name, "workbook has no worksheets"))?
        .map_err(|e| StepError::parse(file_name, e))?;

    Ok(grid_from_range(&range))
}

/// Rows of the used range, each left-padded so that column indexes stay
/// absolute when the range does not start in column A.
///
/// Leading empty rows are not materialized: the first used row is the header.
fn grid_from_range(range: &Range<Data>) -> SheetGrid {
    let Some((_, first_column)) = range.start() else {
        return SheetGrid::default();
    };
    let offset = first_column as usize;
    let rows = range
        .rows()
        .map(|row| {
            std::iter::repeat_n(None, offset)
                .chain(row.iter().map(cell_text))
                .collect()
        })
        .collect();
    SheetGrid {
        rows,
        width: offset + range.width(),
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{f:.0}")),
        Data::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Strict single-column extraction; the first row is a header.
pub fn extract_column(grid: &SheetGrid, column: usize) -> Result<Vec<PhoneNumber>, StepError> {
    if column == 0 || column > grid.width {
        return Err(StepError::ColumnOutOfRange {
            requested: column,
            available: grid.width,
        });
    }
    Ok(grid
        .rows
        .iter()
        .skip(1)
        .filter_map(|row| row.get(column - 1)?.as_deref())
        .filter_map(normalize)
        .collect())
}

/// Every digit-bearing cell of every row, row-major.
pub fn extract_all_cells(grid: &SheetGrid) -> Vec<PhoneNumber> {
    grid.rows
        .iter()
        .flatten()
        .filter_map(Option::as_deref)
        .filter_map(normalize)
        .collect()
}
