//! Per-user session state machine
//!
//! Pure transitions in the Elm style: `(state, context, event) -> (state, effects)`.
//! Nothing here performs I/O; the runtime executes the effects.

mod effect;
pub mod event;
mod feature;
mod input;
pub mod prompts;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Artifact, Effect};
pub use event::Event;
pub use feature::Feature;
pub use input::sanitize_file_name;
pub use state::{Recipient, SessionContext, SessionState};
pub use transition::{transition, TransitionResult};
