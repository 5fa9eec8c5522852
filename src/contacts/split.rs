//! Splitting an existing vCard document into parts

use super::vcard::{render_block, serialize_spaced, telephone_lines};
use super::NameStyle;

/// Upper bound on the number of parts a document may be split into
pub const MAX_SPLIT_PARTS: usize = 100;

/// Sizes of `parts` contiguous chunks over `total` entries.
///
/// Every chunk but the last holds `total / parts`; the last absorbs the
/// remainder. `parts` must be non-zero.
pub fn chunk_sizes(total: usize, parts: usize) -> Vec<usize> {
    debug_assert!(parts > 0);
    let base = total / parts;
    let mut sizes = vec![base; parts];
    if let Some(last) = sizes.last_mut() {
        *last = total - base * (parts - 1);
    }
    sizes
}

/// Partition a slice into `parts` contiguous chunks using [`chunk_sizes`].
pub fn split_into<T>(items: &[T], parts: usize) -> Vec<&[T]> {
    let mut chunks = Vec::with_capacity(parts);
    let mut rest = items;
    for size in chunk_sizes(items.len(), parts) {
        let (head, tail) = rest.split_at(size);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

/// One re-wrapped part of a split document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    /// 1-based part number
    pub number: usize,
    pub contacts: usize,
    pub document: String,
}

/// Split a document's telephone entries into `parts` re-wrapped documents.
///
/// Each entry keeps its original `TEL` line and gets a fresh `FN` line of
/// `<name> - <i>` numbered within its part.
pub fn split_document(text: &str, name: &str, parts: usize) -> Vec<SplitPart> {
    let tel_lines = telephone_lines(text);
    split_into(&tel_lines, parts)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let blocks: Vec<String> = chunk
                .iter()
                .enumerate()
                .map(|(j, tel)| {
                    let fn_line = format!("FN:{}", NameStyle::Padded.display_name(name, j + 1));
                    render_block(&fn_line, tel)
                })
                .collect();
            SplitPart {
                number: i + 1,
                contacts: chunk.len(),
                document: serialize_spaced(&blocks),
            }
        })
        .collect()
}
