//! Interest document transformation engine.
//!
//! Turns untyped legacy interest records into normalized actions and user
//! settings. A `DocumentTransformer` picks a mapping rule from the record's
//! `itemKey`, runs it, and sends anything it cannot map to a
//! `QuarantineSink` instead of failing.

pub mod config;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod fields;
pub mod ids;
pub mod quarantine;
mod rules;
pub mod types;

pub use config::TransformConfig;
pub use dispatch::DocumentTransformer;
pub use encode::EncodeOptions;
pub use error::{Result, TransformError};
pub use quarantine::{
    MemoryQuarantineSink, NoopQuarantineSink, QuarantineEntry, QuarantineReason, QuarantineSink,
};
pub use rules::InterestKind;
pub use types::{
    ActionMetadata, MetadataBag, NormalizedAction, NormalizedRecord, NormalizedUserSettings,
    SourceRecord,
};
