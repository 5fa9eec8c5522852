//! Feature entry commands

use std::fmt;

/// A dialogue the user can start with an entry command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Convert,
    ConvertAny,
    Extract,
    CopyNumber,
    CustomNumber,
    Split,
    Insert,
    Rename,
}

impl Feature {
    /// Menu order
    pub const ALL: [Feature; 8] = [
        Feature::Convert,
        Feature::Extract,
        Feature::ConvertAny,
        Feature::CustomNumber,
        Feature::Rename,
        Feature::CopyNumber,
        Feature::Split,
        Feature::Insert,
    ];

    /// Command name without the leading slash
    pub fn command(self) -> &'static str {
        match self {
            Feature::Convert => "convert",
            Feature::ConvertAny => "convert_any",
            Feature::Extract => "extract",
            Feature::CopyNumber => "copy_number",
            Feature::CustomNumber => "custom_number",
            Feature::Split => "split_vcf",
            Feature::Insert => "sisip",
            Feature::Rename => "rename_contact",
        }
    }

    pub fn from_command(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.command() == name)
    }

    /// One-line menu description
    pub fn description(self) -> &'static str {
        match self {
            Feature::Convert => "Konversi file TXT ke VCF",
            Feature::ConvertAny => "Konversi semua format file ke VCF",
            Feature::Extract => "Ambil nomor per baris",
            Feature::CopyNumber => "Ambil data per kolom Excel",
            Feature::CustomNumber => "Buat VCF dari nomor kustom",
            Feature::Split => "Pecah file VCF",
            Feature::Insert => "Sisipkan kontak admin ke VCF",
            Feature::Rename => "Ganti nama kontak di VCF",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}
