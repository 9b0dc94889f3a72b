// Record encoding with explicit serializer settings.
//
// Field naming is fixed by the record types (lower camel case). Null handling
// and layout are chosen per call through `EncodeOptions`.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Serializer settings for output and quarantine documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Drop top-level fields whose value is null (absent optional fields).
    pub omit_nulls: bool,
    /// Indent the encoded JSON.
    pub pretty: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            omit_nulls: true,
            pretty: false,
        }
    }
}

impl EncodeOptions {
    pub fn with_omit_nulls(mut self, omit_nulls: bool) -> Self {
        self.omit_nulls = omit_nulls;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Convert a record into a JSON tree, applying the null policy.
pub fn to_value<T: Serialize>(record: &T, options: &EncodeOptions) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if options.omit_nulls {
        if let Value::Object(map) = &mut value {
            map.retain(|_, v| !v.is_null());
        }
    }
    Ok(value)
}

/// Encode a record as UTF-8 JSON bytes.
pub fn encode<T: Serialize>(record: &T, options: &EncodeOptions) -> Result<Vec<u8>> {
    let value = to_value(record, options)?;
    let bytes = if options.pretty {
        serde_json::to_vec_pretty(&value)?
    } else {
        serde_json::to_vec(&value)?
    };
    Ok(bytes)
}
