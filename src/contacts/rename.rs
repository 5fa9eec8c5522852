//! Display-name replacement inside an existing vCard document

use super::vcard::property_name;

/// Result of a rename pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub text: String,
    /// Number of name lines that changed
    pub replaced: usize,
}

/// Replace `old` with `new` in the value of every `FN` line that contains it.
///
/// Other lines, and line terminators, are copied verbatim. `old` must be
/// non-empty.
pub fn rename_contacts(text: &str, old: &str, new: &str) -> RenameOutcome {
    debug_assert!(!old.is_empty());
    let mut out = String::with_capacity(text.len());
    let mut replaced = 0;

    for line in text.split_inclusive('\n') {
        match rename_line(line, old, new) {
            Some(renamed) => {
                out.push_str(&renamed);
                replaced += 1;
            }
            None => out.push_str(line),
        }
    }

    RenameOutcome {
        text: out,
        replaced,
    }
}

fn rename_line(line: &str, old: &str, new: &str) -> Option<String> {
    if !property_name(line).eq_ignore_ascii_case("FN") {
        return None;
    }
    let (head, value) = line.split_once(':')?;
    if !value.contains(old) {
        return None;
    }
    Some(format!("{head}:{}", value.replace(old, new)))
}
