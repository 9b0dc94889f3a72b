//! Type-specific mapping rules.
//!
//! Each rule turns one source record into zero or more normalized records.
//! Rules are pure: business-rule quarantines are returned in the
//! [`RuleOutcome`] and handed to the sink by the dispatcher, and any
//! [`TransformError`] propagates up to the dispatcher's failure boundary.
//!
//! All rules share the legacy "double-wrapped data" precondition: the record
//! must have a `data` object whose first entry is keyed `data`
//! (case-insensitive). Records that fail it, or whose payload is not the
//! expected array/object, produce nothing and are not quarantined.

mod legacy;
mod news;
mod settings;
mod trending;
mod weather;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Result, TransformError};
use crate::fields;
use crate::quarantine::QuarantineReason;
use crate::types::NormalizedRecord;

/// Nested object holding the per-kind fields of an interest item.
pub(crate) const SPECIFIC_FIELDS: &str = "InterestTypeSpecificFields";
pub(crate) const DISPLAY_NAME: &str = "DisplayName";
pub(crate) const CREATED_TICKS: &str = "CreatedTimeInTicksUtc";

pub(crate) const FOLLOW: &str = "Follow";

/// Source record kinds, selected by the `itemKey` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterestKind {
    NewsQuery,
    Weather,
    TrendingTopic,
    InterestSettings,
    /// Legacy; routed only when legacy rules are enabled.
    SportsTeam,
    /// Legacy; routed only when legacy rules are enabled.
    FinanceSecurity,
}

impl InterestKind {
    pub const ALL: [InterestKind; 6] = [
        InterestKind::NewsQuery,
        InterestKind::Weather,
        InterestKind::TrendingTopic,
        InterestKind::InterestSettings,
        InterestKind::SportsTeam,
        InterestKind::FinanceSecurity,
    ];

    /// The discriminator value for this kind.
    pub fn item_key(&self) -> &'static str {
        match self {
            InterestKind::NewsQuery => "Interests.NewsQuery",
            InterestKind::Weather => "Interests.Weather",
            InterestKind::TrendingTopic => "Interests.TrendingOnBingTopic",
            InterestKind::InterestSettings => "InterestSettings",
            InterestKind::SportsTeam => "Interests.SportsTeam",
            InterestKind::FinanceSecurity => "Interests.FinanceSecurity",
        }
    }

    /// Exact, case-sensitive match against the known discriminators.
    pub fn from_item_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.item_key() == key)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, InterestKind::SportsTeam | InterestKind::FinanceSecurity)
    }
}

impl std::fmt::Display for InterestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.item_key())
    }
}

/// Inputs shared by every rule invocation.
pub(crate) struct RuleContext<'a> {
    pub record: &'a Value,
    pub owner_id: &'a str,
    /// Source document id, for diagnostics only.
    pub doc_id: Option<String>,
}

/// A business-rule quarantine raised by a rule.
#[derive(Debug, Clone)]
pub(crate) struct BusinessQuarantine {
    pub reason: QuarantineReason,
    pub failed_record_raw: String,
}

#[derive(Debug, Default)]
pub(crate) struct RuleOutcome {
    pub records: Vec<NormalizedRecord>,
    pub quarantines: Vec<BusinessQuarantine>,
}

impl RuleOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The whole record is dropped: no output, one quarantine.
    pub fn abandoned(quarantine: BusinessQuarantine) -> Self {
        Self {
            records: Vec::new(),
            quarantines: vec![quarantine],
        }
    }
}

/// Run the rule for `kind`.
pub(crate) fn apply(kind: InterestKind, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    match kind {
        InterestKind::NewsQuery => news::map(ctx),
        InterestKind::Weather => weather::map(ctx),
        InterestKind::TrendingTopic => trending::map(ctx),
        InterestKind::InterestSettings => settings::map(ctx),
        InterestKind::SportsTeam => legacy::map(legacy::SPORTS_TEAM, ctx),
        InterestKind::FinanceSecurity => legacy::map(legacy::FINANCE_SECURITY, ctx),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Unwrap the `data.data` payload.
///
/// The inner value may be embedded JSON or a string holding serialized JSON.
/// Returns `None` when the wrapper is missing, empty, keyed differently, or
/// the string does not parse.
pub(crate) fn unwrap_data(record: &Value) -> Option<Value> {
    let wrapper = record.get("data")?.as_object()?;
    let (key, inner) = wrapper.iter().next()?;
    if !key.eq_ignore_ascii_case("data") {
        return None;
    }

    match inner {
        Value::String(raw) => serde_json::from_str(raw).ok(),
        other => Some(other.clone()),
    }
}

/// Unwrap a payload that must be an array of items. Logs and returns `None`
/// when the precondition or the shape does not hold.
pub(crate) fn list_payload(ctx: &RuleContext<'_>) -> Option<Vec<Value>> {
    match unwrap_data(ctx.record) {
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            tracing::debug!(
                owner_id = ctx.owner_id,
                doc_id = ctx.doc_id.as_deref(),
                found = crate::error::json_kind(&other),
                "Payload is not an array, nothing to map"
            );
            None
        }
        None => {
            tracing::debug!(
                owner_id = ctx.owner_id,
                doc_id = ctx.doc_id.as_deref(),
                "No data wrapper, nothing to map"
            );
            None
        }
    }
}

/// Array elements must be objects.
pub(crate) fn item_object(item: &Value, index: usize) -> Result<&Value> {
    if item.is_object() {
        Ok(item)
    } else {
        Err(TransformError::shape(format!("data[{index}]"), "object", item))
    }
}

const TICKS_PER_SECOND: i64 = 10_000_000;
/// Ticks between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;
/// Last tick of 9999-12-31.
const MAX_TICKS: i64 = 3_155_378_975_999_999_999;

/// Optional creation timestamp from the item's tick count.
/// Values that are not integers are ignored.
pub(crate) fn created_date_time(item: &Value) -> Result<Option<String>> {
    let Some(raw) = fields::text(item, CREATED_TICKS) else {
        return Ok(None);
    };
    match raw.trim().parse::<i64>() {
        Ok(ticks) => ticks_to_timestamp(ticks).map(Some),
        Err(_) => Ok(None),
    }
}

/// Render a tick count (100ns units since 0001-01-01T00:00:00Z).
pub(crate) fn ticks_to_timestamp(ticks: i64) -> Result<String> {
    if !(0..=MAX_TICKS).contains(&ticks) {
        return Err(TransformError::TicksOutOfRange(ticks));
    }
    let since_epoch = ticks - UNIX_EPOCH_TICKS;
    let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = (since_epoch.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    let at = DateTime::<Utc>::from_timestamp(secs, nanos)
        .ok_or(TransformError::TicksOutOfRange(ticks))?;
    Ok(at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_keys_round_trip() {
        for kind in InterestKind::ALL {
            assert_eq!(InterestKind::from_item_key(kind.item_key()), Some(kind));
        }
    }

    #[test]
    fn item_key_match_is_exact() {
        assert_eq!(InterestKind::from_item_key("interests.newsquery"), None);
        assert_eq!(InterestKind::from_item_key(" Interests.Weather"), None);
        assert_eq!(InterestKind::from_item_key("Interests.Unknown"), None);
    }

    #[test]
    fn only_sports_and_finance_are_legacy() {
        let legacy: Vec<_> = InterestKind::ALL.into_iter().filter(|k| k.is_legacy()).collect();
        assert_eq!(legacy, vec![InterestKind::SportsTeam, InterestKind::FinanceSecurity]);
    }

    #[test]
    fn unwrap_data_embedded_array() {
        let record = json!({"data": {"data": [{"a": 1}]}});
        assert_eq!(unwrap_data(&record), Some(json!([{"a": 1}])));
    }

    #[test]
    fn unwrap_data_serialized_string() {
        let record = json!({"data": {"Data": "[{\"a\":1}]"}});
        assert_eq!(unwrap_data(&record), Some(json!([{"a": 1}])));
    }

    #[test]
    fn unwrap_data_uses_first_entry_only() {
        let record = json!({"data": {"other": [], "data": [{"a": 1}]}});
        assert_eq!(unwrap_data(&record), None);
    }

    #[test]
    fn unwrap_data_rejects_missing_empty_or_non_object() {
        assert_eq!(unwrap_data(&json!({})), None);
        assert_eq!(unwrap_data(&json!({"data": {}})), None);
        assert_eq!(unwrap_data(&json!({"data": [1, 2]})), None);
        assert_eq!(unwrap_data(&json!({"data": {"data": "not json"}})), None);
    }

    #[test]
    fn item_object_rejects_scalars() {
        assert!(item_object(&json!({}), 0).is_ok());
        let err = item_object(&json!(3), 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected shape at data[4]: expected object, found number"
        );
    }

    #[test]
    fn ticks_render_as_utc_timestamps() {
        assert_eq!(
            ticks_to_timestamp(UNIX_EPOCH_TICKS).unwrap(),
            "1970-01-01T00:00:00.000Z"
        );
        assert_eq!(
            ticks_to_timestamp(638_396_640_000_000_000).unwrap(),
            "2024-01-01T00:00:00.000Z"
        );
        assert_eq!(
            ticks_to_timestamp(636_961_986_451_230_000).unwrap(),
            "2019-06-15T12:30:45.123Z"
        );
        assert_eq!(ticks_to_timestamp(0).unwrap(), "0001-01-01T00:00:00.000Z");
    }

    #[test]
    fn ticks_out_of_range_fail() {
        assert!(ticks_to_timestamp(-1).is_err());
        assert!(ticks_to_timestamp(MAX_TICKS + 1).is_err());
    }

    #[test]
    fn created_date_time_ignores_non_integers() {
        assert_eq!(created_date_time(&json!({})).unwrap(), None);
        assert_eq!(
            created_date_time(&json!({"CreatedTimeInTicksUtc": "soon"})).unwrap(),
            None
        );
        assert_eq!(
            created_date_time(&json!({"CreatedTimeInTicksUtc": 1.5})).unwrap(),
            None
        );
        assert_eq!(
            created_date_time(&json!({"CreatedTimeInTicksUtc": "638396640000000000"})).unwrap(),
            Some("2024-01-01T00:00:00.000Z".to_string())
        );
    }
}
