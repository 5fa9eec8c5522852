//! `/custom_number`: typed numbers to one vCard file

use super::{advance, rejected, text_of, TransitionResult};
use crate::contacts::vcard::{build_records, serialize};
use crate::contacts::{normalize, NameStyle, PhoneNumber, RecordShape};
use crate::error::StepError;
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::input;
use crate::state_machine::prompts;
use crate::state_machine::state::{CustomNumberStep, Naming, Recipient, SessionState};

pub(super) fn initial() -> CustomNumberStep {
    CustomNumberStep::ContactName
}

pub(super) fn prompt(step: &CustomNumberStep) -> String {
    match step {
        CustomNumberStep::ContactName => "Silakan masukkan nama kontak untuk VCF.".to_string(),
        CustomNumberStep::BaseName { contact_name } => prompts::base_name_for(contact_name),
        CustomNumberStep::CollectNumbers { numbers, .. } if numbers.is_empty() => {
            "Silakan masukkan nomor telepon (satu per baris, ketik 'selesai' untuk menyelesaikan)."
                .to_string()
        }
        CustomNumberStep::CollectNumbers { .. } => {
            "Silakan masukkan nomor telepon lain atau ketik 'selesai' untuk mengakhiri.".to_string()
        }
    }
}

pub(super) fn step(step: &CustomNumberStep, event: Event) -> TransitionResult {
    apply(step, event).unwrap_or_else(|e| rejected(SessionState::CustomNumber(step.clone()), &e))
}

fn to(step: CustomNumberStep, effects: Vec<Effect>) -> TransitionResult {
    advance(SessionState::CustomNumber(step), effects)
}

fn apply(step: &CustomNumberStep, event: Event) -> Result<TransitionResult, StepError> {
    match step {
        CustomNumberStep::ContactName => {
            let contact_name = input::text(&text_of(event)?)?;
            Ok(to(CustomNumberStep::BaseName { contact_name }, vec![]))
        }
        CustomNumberStep::BaseName { contact_name } => {
            let naming = Naming {
                contact_name: contact_name.clone(),
                base_name: input::file_stem(&text_of(event)?)?,
            };
            Ok(to(
                CustomNumberStep::CollectNumbers {
                    naming,
                    numbers: Vec::new(),
                },
                vec![],
            ))
        }
        CustomNumberStep::CollectNumbers { naming, numbers } => {
            let message = text_of(event)?;
            let mut numbers = numbers.clone();
            let mut finished = false;
            let mut added = 0;
            for line in message.lines() {
                if input::is_sentinel(line) {
                    finished = true;
                } else if let Some(number) = normalize(line) {
                    numbers.push(number);
                    added += 1;
                }
            }

            if !finished {
                let effects = if added > 0 {
                    vec![Effect::reply(format!("{added} nomor telah ditambahkan."))]
                } else {
                    vec![]
                };
                return Ok(to(
                    CustomNumberStep::CollectNumbers {
                        naming: naming.clone(),
                        numbers,
                    },
                    effects,
                ));
            }
            if numbers.is_empty() {
                return Err(StepError::NoExtractableData);
            }
            Ok(finish(naming, &numbers))
        }
    }
}

fn finish(naming: &Naming, numbers: &[PhoneNumber]) -> TransitionResult {
    let blocks = build_records(
        &naming.contact_name,
        numbers,
        NameStyle::Padded,
        RecordShape::Formatted,
    );
    let file_name = format!("{}.vcf", naming.base_name);
    let summary = format!(
        "Proses selesai. VCF '{file_name}' telah dibuat dengan {} kontak.",
        numbers.len()
    );
    TransitionResult::new(SessionState::Idle)
        .with_effect(Effect::send_document(
            Recipient::Requester,
            file_name,
            serialize(&blocks),
        ))
        .reply(summary)
        .with_effect(Effect::EndSession)
}
