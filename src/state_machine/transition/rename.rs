//! `/rename_contact`: display-name replacement in one vCard file

use super::{advance, document_of, rejected, text_of, TransitionResult};
use crate::contacts::extract::decode_text;
use crate::contacts::rename::rename_contacts;
use crate::contacts::vcard::looks_like_vcard;
use crate::contacts::DocumentKind;
use crate::error::StepError;
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::input;
use crate::state_machine::state::{HeldDocument, Recipient, RenameStep, SessionState};

const ACCEPTED: &[DocumentKind] = &[DocumentKind::ContactCard];
const LABEL: &str = ".vcf";

pub(super) fn initial() -> RenameStep {
    RenameStep::AwaitUpload
}

pub(super) fn prompt(step: &RenameStep) -> String {
    match step {
        RenameStep::AwaitUpload => "Silakan unggah file VCF yang akan diproses.".to_string(),
        RenameStep::RenameFileChoice { .. } => {
            "Apakah Anda ingin mengganti nama file VCF? (ketik 'ya' atau 'tidak')".to_string()
        }
        RenameStep::NewFileName { .. } => {
            "Silakan masukkan nama file baru (tanpa ekstensi).".to_string()
        }
        RenameStep::OldName { .. } => "Silakan masukkan nama kontak yang ingin diganti.".to_string(),
        RenameStep::NewName { .. } => "Silakan masukkan nama baru untuk kontak tersebut.".to_string(),
    }
}

pub(super) fn step(step: &RenameStep, event: Event) -> TransitionResult {
    apply(step, event).unwrap_or_else(|e| rejected(SessionState::Rename(step.clone()), &e))
}

fn to(step: RenameStep) -> TransitionResult {
    advance(SessionState::Rename(step), vec![])
}

fn apply(step: &RenameStep, event: Event) -> Result<TransitionResult, StepError> {
    match step {
        RenameStep::AwaitUpload => {
            let document = document_of(event, LABEL)?;
            input::require_kind(&document, ACCEPTED, LABEL)?;
            let decoded = decode_text(&document.bytes);
            if !looks_like_vcard(&decoded.text) {
                return Err(StepError::parse(&document.file_name, "no BEGIN:VCARD line"));
            }
            let held = HeldDocument {
                file_name: input::sanitize_file_name(&document.file_name),
                decoded,
            };
            Ok(to(RenameStep::RenameFileChoice { document: held }))
        }
        RenameStep::RenameFileChoice { document } => {
            let document = document.clone();
            if input::yes_no(&text_of(event)?)? {
                Ok(to(RenameStep::NewFileName { document }))
            } else {
                Ok(to(RenameStep::OldName { document }))
            }
        }
        RenameStep::NewFileName { document } => {
            let stem = input::file_stem(&text_of(event)?)?;
            Ok(to(RenameStep::OldName {
                document: HeldDocument {
                    file_name: format!("{stem}.vcf"),
                    decoded: document.decoded.clone(),
                },
            }))
        }
        RenameStep::OldName { document } => {
            let old_name = input::text(&text_of(event)?)?;
            Ok(to(RenameStep::NewName {
                document: document.clone(),
                old_name,
            }))
        }
        RenameStep::NewName { document, old_name } => {
            let new_name = input::text(&text_of(event)?)?;
            let outcome = rename_contacts(&document.decoded.text, old_name, &new_name);
            if outcome.replaced == 0 {
                return Ok(TransitionResult::ended([format!(
                    "Kontak '{old_name}' tidak ditemukan di file VCF. Tidak ada file yang dikirim."
                )]));
            }
            let bytes = document.decoded.encode(&outcome.text)?;
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::send_document(
                    Recipient::Requester,
                    &document.file_name,
                    bytes,
                ))
                .reply(format!(
                    "{} kontak '{old_name}' telah diganti menjadi '{new_name}' di file VCF.",
                    outcome.replaced
                ))
                .with_effect(Effect::EndSession))
        }
    }
}
