//! User-facing texts shared across features

use super::Feature;

pub const CANCELLED: &str = "Proses dibatalkan.";
pub const NOTHING_TO_CANCEL: &str = "Tidak ada proses yang sedang berjalan.";
pub const IDLE_HINT: &str = "Tidak ada proses aktif. Ketik /start untuk melihat daftar fitur.";
pub const UNAUTHORIZED: &str = "Maaf, Anda tidak diizinkan menggunakan bot ini.";
pub const DELIVERY_FAILED: &str =
    "Gagal mengirim file. Silakan kirim ulang pesan atau file terakhir Anda.";
pub const DOWNLOAD_FAILED: &str = "Gagal mengunduh file. Silakan kirim ulang file Anda.";

pub const CONTACT_NAME: &str = "Silakan masukkan nama kontak yang akan digunakan.";
pub const RECIPIENT_CHOICE: &str =
    "Apakah Anda ingin file VCF dikirim langsung ke ID Telegram lain? (ketik 'ya' atau 'tidak')";
pub const RECIPIENT_ID: &str =
    "Silakan masukkan ID tujuan untuk mengirim dokumen (contoh: 123456789).";
pub const DECISION: &str = "Apakah Anda sudah selesai? Ketik 'selesai' atau 'belum'.";
pub const THANKS: &str = "Terima kasih! Anda telah menyelesaikan proses.";
pub const ANOTHER_UPLOAD: &str = "Silakan unggah file lain.";

/// Message after a ceiling was hit on "belum"
pub fn ceiling_reached(limit: usize) -> String {
    format!("Batas maksimal {limit} file telah tercapai. Proses selesai.")
}

pub fn file_too_large(limit_bytes: u64) -> String {
    format!(
        "File terlalu besar. Ukuran maksimal adalah {} MB.",
        limit_bytes / (1024 * 1024)
    )
}

pub fn base_name_for(contact_name: &str) -> String {
    format!(
        "Anda telah memilih nama kontak '{contact_name}'. Silakan masukkan nama file VCF (tanpa ekstensi)."
    )
}

/// The `/start` feature menu
pub fn menu() -> String {
    let mut text = String::from("Selamat datang! Pilih fitur yang ingin Anda gunakan:\n");
    for feature in Feature::ALL {
        text.push('/');
        text.push_str(feature.command());
        text.push_str(" - ");
        text.push_str(feature.description());
        text.push('\n');
    }
    text.push_str("/cancel - Batalkan proses yang sedang berjalan\n");
    text.push_str("Silakan ketikkan perintah di atas untuk memilih fitur.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_lists_every_command() {
        let menu = menu();
        for feature in Feature::ALL {
            assert!(menu.contains(&format!("/{} - ", feature.command())));
        }
        assert!(menu.contains("/cancel"));
    }
}
