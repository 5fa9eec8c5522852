//! Pure contact-card transforms
//!
//! Normalization, vCard building, extraction from uploads, splitting and
//! renaming. Nothing in here touches the filesystem or the transport.

pub mod extract;
mod phone;
pub mod rename;
pub mod split;
pub mod vcard;

#[cfg(test)]
mod proptests;

pub use extract::{DecodedText, DocumentKind};
pub use phone::{normalize, PhoneNumber};
pub use vcard::{NameStyle, RecordShape};
