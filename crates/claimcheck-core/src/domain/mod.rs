//! Domain model (attributes, messages, envelopes, references, errors, ...).

pub mod attribute;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod ids;
pub mod message;
pub mod outcome;
pub mod reference;

pub use self::attribute::{AttributeValue, Attributes};
pub use self::config::{
    DEFAULT_BLOB_TTL_DAYS, DEFAULT_MESSAGE_SIZE_THRESHOLD, MAX_ALLOWED_ATTRIBUTES, OffloadConfig,
    RESERVED_ATTRIBUTE_NAME,
};
pub use self::envelope::Envelope;
pub use self::errors::{ErrorKind, OffloadError};
pub use self::ids::ObjectKey;
pub use self::message::{Delivery, InboundMessage, Message};
pub use self::outcome::{ReceiveOutcome, SendOutcome};
pub use self::reference::ReferenceRecord;
