//! Pure state transition function
//!
//! Given the same state and event this always produces the same next state
//! and effects. Invalid input never advances: the step is kept and the user
//! gets the error explanation followed by the step's prompt again.

mod convert;
mod convert_any;
mod copy_number;
mod custom_number;
mod extract;
mod insert;
mod rename;
mod split;

use super::effect::{Artifact, Effect};
use super::event::{Event, UploadedDocument};
use super::input::{self, Decision};
use super::prompts;
use super::state::{Recipient, SessionContext, SessionState, UploadProgress, MAX_UPLOADS};
use super::Feature;
use crate::error::StepError;

/// Result of a state transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// Back to idle after the given replies, releasing the session.
    pub fn ended<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SessionState::Idle)
            .with_effects(messages.into_iter().map(Effect::reply))
            .with_effect(Effect::EndSession)
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    #[must_use]
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.with_effect(Effect::reply(text))
    }

    pub fn ends_session(&self) -> bool {
        self.effects.contains(&Effect::EndSession)
    }

    /// Text of every reply, in order
    pub fn replies(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Reply { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every document delivery, in order
    pub fn deliveries(&self) -> Vec<(Recipient, &Artifact)> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::SendDocument {
                    recipient,
                    artifact,
                } => Some((*recipient, artifact)),
                _ => None,
            })
            .collect()
    }
}

/// Pure transition function
pub fn transition(state: &SessionState, _context: &SessionContext, event: Event) -> TransitionResult {
    match (state, event) {
        (_, Event::Begin(feature)) => begin(state, feature),

        (SessionState::Idle, Event::Cancel) => {
            TransitionResult::new(SessionState::Idle).reply(prompts::NOTHING_TO_CANCEL)
        }
        (_, Event::Cancel) => TransitionResult::ended([prompts::CANCELLED]),

        (SessionState::Idle, Event::Text(_) | Event::Document(_)) => {
            TransitionResult::new(SessionState::Idle).reply(prompts::IDLE_HINT)
        }

        (SessionState::Convert(step), event) => convert::step(step, event),
        (SessionState::ConvertAny(step), event) => convert_any::step(step, event),
        (SessionState::Extract(step), event) => extract::step(step, event),
        (SessionState::CopyNumber(step), event) => copy_number::step(step, event),
        (SessionState::CustomNumber(step), event) => custom_number::step(step, event),
        (SessionState::Split(step), event) => split::step(step, event),
        (SessionState::Insert(step), event) => insert::step(step, event),
        (SessionState::Rename(step), event) => rename::step(step, event),
    }
}

/// The prompt that asks for the current step's input
pub fn prompt(state: &SessionState) -> String {
    match state {
        SessionState::Idle => prompts::IDLE_HINT.to_string(),
        SessionState::Convert(step) => convert::prompt(step),
        SessionState::ConvertAny(step) => convert_any::prompt(step),
        SessionState::Extract(step) => extract::prompt(step),
        SessionState::CopyNumber(step) => copy_number::prompt(step),
        SessionState::CustomNumber(step) => custom_number::prompt(step),
        SessionState::Split(step) => split::prompt(step),
        SessionState::Insert(step) => insert::prompt(step),
        SessionState::Rename(step) => rename::prompt(step),
    }
}

/// First step of a feature's dialogue
pub fn initial_state(feature: Feature) -> SessionState {
    match feature {
        Feature::Convert => SessionState::Convert(convert::initial()),
        Feature::ConvertAny => SessionState::ConvertAny(convert_any::initial()),
        Feature::Extract => SessionState::Extract(extract::initial()),
        Feature::CopyNumber => SessionState::CopyNumber(copy_number::initial()),
        Feature::CustomNumber => SessionState::CustomNumber(custom_number::initial()),
        Feature::Split => SessionState::Split(split::initial()),
        Feature::Insert => SessionState::Insert(insert::initial()),
        Feature::Rename => SessionState::Rename(rename::initial()),
    }
}

fn begin(current: &SessionState, feature: Feature) -> TransitionResult {
    let state = initial_state(feature);
    let text = prompt(&state);
    let result = if current.is_idle() {
        TransitionResult::new(state)
    } else {
        TransitionResult::new(state).with_effect(Effect::EndSession)
    };
    result.reply(text)
}

/// Move to `state` and ask for its input, after `effects`.
fn advance(state: SessionState, effects: Vec<Effect>) -> TransitionResult {
    let text = prompt(&state);
    TransitionResult::new(state).with_effects(effects).reply(text)
}

/// Keep `state` and explain why the input was rejected.
fn rejected(state: SessionState, error: &StepError) -> TransitionResult {
    let text = prompt(&state);
    TransitionResult::new(state)
        .reply(error.user_message())
        .reply(text)
}

fn text_of(event: Event) -> Result<String, StepError> {
    match event {
        Event::Text(text) => Ok(text),
        _ => Err(input::expected_text()),
    }
}

fn document_of(event: Event, label: &'static str) -> Result<UploadedDocument, StepError> {
    match event {
        Event::Document(document) => Ok(document),
        _ => Err(input::expected_document(label)),
    }
}

/// Answer to the continuation question of a multi-upload feature
enum Continuation {
    Finished(TransitionResult),
    Resume(UploadProgress),
}

fn continuation(event: Event, progress: &UploadProgress) -> Result<Continuation, StepError> {
    let decision = input::decision(&text_of(event)?)?;
    let ceiling = MAX_UPLOADS.max(progress.target);
    Ok(match decision {
        Decision::Done => Continuation::Finished(TransitionResult::ended([prompts::THANKS])),
        Decision::NotDone if progress.uploads >= ceiling => Continuation::Finished(
            TransitionResult::ended([prompts::ceiling_reached(ceiling)]),
        ),
        Decision::NotDone => Continuation::Resume(progress.extended()),
    })
}
