//! `/split_vcf`: one vCard file into numbered parts

use super::{advance, document_of, rejected, text_of, TransitionResult};
use crate::contacts::extract::decode_text;
use crate::contacts::split::{split_document, MAX_SPLIT_PARTS};
use crate::contacts::DocumentKind;
use crate::error::StepError;
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::input;
use crate::state_machine::prompts;
use crate::state_machine::state::{Naming, Recipient, SessionState, SplitJob, SplitStep};

const ACCEPTED: &[DocumentKind] = &[DocumentKind::ContactCard];
const LABEL: &str = ".vcf";

pub(super) fn initial() -> SplitStep {
    SplitStep::ContactName
}

pub(super) fn prompt(step: &SplitStep) -> String {
    match step {
        SplitStep::ContactName => prompts::CONTACT_NAME.to_string(),
        SplitStep::BaseName { contact_name } => prompts::base_name_for(contact_name),
        SplitStep::SplitCount { naming } => format!(
            "Nama file VCF '{}' diterima. Berapa jumlah pecahan yang Anda inginkan?",
            naming.base_name
        ),
        SplitStep::RecipientChoice { .. } => prompts::RECIPIENT_CHOICE.to_string(),
        SplitStep::RecipientId { .. } => prompts::RECIPIENT_ID.to_string(),
        SplitStep::AwaitUpload(_) => "Silakan unggah file VCF Anda.".to_string(),
    }
}

pub(super) fn step(step: &SplitStep, event: Event) -> TransitionResult {
    apply(step, event).unwrap_or_else(|e| rejected(SessionState::Split(step.clone()), &e))
}

fn to(step: SplitStep) -> TransitionResult {
    advance(SessionState::Split(step), vec![])
}

fn apply(step: &SplitStep, event: Event) -> Result<TransitionResult, StepError> {
    match step {
        SplitStep::ContactName => {
            let contact_name = input::text(&text_of(event)?)?;
            Ok(to(SplitStep::BaseName { contact_name }))
        }
        SplitStep::BaseName { contact_name } => Ok(to(SplitStep::SplitCount {
            naming: Naming {
                contact_name: contact_name.clone(),
                base_name: input::file_stem(&text_of(event)?)?,
            },
        })),
        SplitStep::SplitCount { naming } => {
            let parts = input::bounded(&text_of(event)?, MAX_SPLIT_PARTS)?;
            Ok(to(SplitStep::RecipientChoice {
                naming: naming.clone(),
                parts,
            }))
        }
        SplitStep::RecipientChoice { naming, parts } => {
            let naming = naming.clone();
            let parts = *parts;
            if input::yes_no(&text_of(event)?)? {
                Ok(to(SplitStep::RecipientId { naming, parts }))
            } else {
                Ok(to(SplitStep::AwaitUpload(SplitJob {
                    naming,
                    parts,
                    recipient: Recipient::Requester,
                })))
            }
        }
        SplitStep::RecipientId { naming, parts } => {
            let recipient = Recipient::Chat(input::chat_id(&text_of(event)?)?);
            Ok(to(SplitStep::AwaitUpload(SplitJob {
                naming: naming.clone(),
                parts: *parts,
                recipient,
            })))
        }
        SplitStep::AwaitUpload(job) => {
            let document = document_of(event, LABEL)?;
            input::require_kind(&document, ACCEPTED, LABEL)?;
            let decoded = decode_text(&document.bytes);
            let parts = split_document(&decoded.text, &job.naming.contact_name, job.parts);
            if parts.iter().all(|p| p.contacts == 0) {
                return Err(StepError::NoExtractableData);
            }

            let mut effects = Vec::with_capacity(parts.len() + 1);
            let mut skipped = Vec::new();
            for part in parts {
                if part.contacts == 0 {
                    skipped.push(part.number.to_string());
                    continue;
                }
                let file_name = format!("{}_part_{}.vcf", job.naming.base_name, part.number);
                effects.push(Effect::send_document(
                    job.recipient,
                    file_name,
                    decoded.encode(&part.document)?,
                ));
            }
            let mut messages = Vec::new();
            if !skipped.is_empty() {
                messages.push(format!(
                    "Bagian {} kosong dan tidak dikirim.",
                    skipped.join(", ")
                ));
            }
            messages.push("Semua file VCF telah dipecah dan dikirim.".to_string());
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effects(effects)
                .with_effects(messages.into_iter().map(Effect::reply))
                .with_effect(Effect::EndSession))
        }
    }
}
