//! The dispatcher: discriminator → rule → outputs, with a single failure
//! boundary that routes anything a rule cannot map to the quarantine sink.

use crate::config::TransformConfig;
use crate::error::TransformError;
use crate::fields;
use crate::ids::resolve_owner;
use crate::quarantine::{
    exception_entry_name, failure_entry_name, submit, QuarantineEntry, QuarantineSink,
    EXCEPTION_FAILURE_KIND,
};
use crate::rules::{self, BusinessQuarantine, InterestKind, RuleContext};
use crate::types::{NormalizedRecord, SourceRecord};

const ITEM_KEY: &str = "itemKey";
const USER_ID: &str = "userId";
const DOC_ID: &str = "id";

/// Stateless transformer for legacy interest records.
///
/// `transform` is a pure function of the input record apart from quarantine
/// writes, so one transformer can be shared across worker threads.
pub struct DocumentTransformer<S> {
    config: TransformConfig,
    sink: S,
}

impl<S: QuarantineSink> DocumentTransformer<S> {
    pub fn new(config: TransformConfig, sink: S) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The rule `item_key` is routed to, if any.
    pub fn route(&self, item_key: &str) -> Option<InterestKind> {
        InterestKind::from_item_key(item_key)
            .filter(|kind| !kind.is_legacy() || self.config.legacy_rules_enabled)
    }

    /// Transform one source record. Never fails: blank or unknown
    /// discriminators yield nothing, and rule failures are quarantined.
    pub fn transform(&self, record: &SourceRecord) -> Vec<NormalizedRecord> {
        let Some(item_key) = fields::text(record, ITEM_KEY) else {
            tracing::debug!("Record has no item key, skipping");
            return Vec::new();
        };

        let owner_id = resolve_owner(
            &self.config.owner_prefix,
            fields::text(record, USER_ID).as_deref(),
        );

        let Some(kind) = self.route(&item_key) else {
            tracing::debug!(
                item_key = item_key.as_str(),
                owner_id = owner_id.as_str(),
                "No rule for item key, skipping"
            );
            return Vec::new();
        };

        let ctx = RuleContext {
            record,
            owner_id: &owner_id,
            doc_id: fields::text(record, DOC_ID),
        };

        match rules::apply(kind, &ctx) {
            Ok(outcome) => {
                for quarantine in outcome.quarantines {
                    self.quarantine_failure(&owner_id, quarantine);
                }
                outcome.records
            }
            Err(e) => {
                tracing::warn!(
                    item_key = kind.item_key(),
                    owner_id = owner_id.as_str(),
                    doc_id = ctx.doc_id.as_deref(),
                    error = %e,
                    "Transformation failed, quarantining record"
                );
                self.quarantine_exception(record, &owner_id, &e);
                Vec::new()
            }
        }
    }

    fn quarantine_failure(&self, owner_id: &str, quarantine: BusinessQuarantine) {
        let name = failure_entry_name(quarantine.reason, owner_id);
        let entry = QuarantineEntry {
            failed_record_raw: quarantine.failed_record_raw,
            owner_id: owner_id.to_string(),
            failure_kind: quarantine.reason.as_str().to_string(),
            cause: None,
        };
        submit(&self.sink, &name, &entry);
    }

    fn quarantine_exception(&self, record: &SourceRecord, owner_id: &str, error: &TransformError) {
        let name = exception_entry_name(error.code(), owner_id);
        let entry = QuarantineEntry {
            failed_record_raw: record.to_string(),
            owner_id: owner_id.to_string(),
            failure_kind: EXCEPTION_FAILURE_KIND.to_string(),
            cause: Some(error.to_string()),
        };
        submit(&self.sink, &name, &entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quarantine::MemoryQuarantineSink;
    use serde_json::json;

    fn transformer(legacy: bool) -> DocumentTransformer<MemoryQuarantineSink> {
        DocumentTransformer::new(
            TransformConfig::default().with_legacy_rules(legacy),
            MemoryQuarantineSink::new(),
        )
    }

    #[test]
    fn live_table_excludes_legacy_kinds() {
        let t = transformer(false);
        assert_eq!(t.route("Interests.NewsQuery"), Some(InterestKind::NewsQuery));
        assert_eq!(t.route("Interests.Weather"), Some(InterestKind::Weather));
        assert_eq!(
            t.route("Interests.TrendingOnBingTopic"),
            Some(InterestKind::TrendingTopic)
        );
        assert_eq!(t.route("InterestSettings"), Some(InterestKind::InterestSettings));
        assert_eq!(t.route("Interests.SportsTeam"), None);
        assert_eq!(t.route("Interests.FinanceSecurity"), None);
    }

    #[test]
    fn legacy_kinds_route_when_enabled() {
        let t = transformer(true);
        assert_eq!(t.route("Interests.SportsTeam"), Some(InterestKind::SportsTeam));
        assert_eq!(
            t.route("Interests.FinanceSecurity"),
            Some(InterestKind::FinanceSecurity)
        );
    }

    #[test]
    fn disabled_legacy_record_is_ignored() {
        let t = transformer(false);
        let record = json!({
            "itemKey": "Interests.SportsTeam",
            "userId": "42",
            "data": {"data": [{"InterestTypeSpecificFields": {"MsnShortTeamId": "SEA"}}]}
        });
        assert!(t.transform(&record).is_empty());
        assert!(t.sink().is_empty());
    }

    #[test]
    fn owner_is_prefixed_user_id() {
        let t = DocumentTransformer::new(
            TransformConfig::default().with_owner_prefix("X-"),
            MemoryQuarantineSink::new(),
        );
        let record = json!({
            "itemKey": "InterestSettings",
            "userId": 42,
            "data": {"data": {}}
        });
        let out = t.transform(&record);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id(), "X-42");
    }

    #[test]
    fn exception_entry_carries_record_and_cause() {
        let t = transformer(false);
        let record = json!({
            "id": "doc-9",
            "itemKey": "Interests.NewsQuery",
            "userId": "42",
            "data": {"data": [7]}
        });
        assert!(t.transform(&record).is_empty());

        let puts = t.sink().puts();
        assert_eq!(puts.len(), 1);
        assert!(puts[0].name.starts_with("Exception_UnexpectedShape_U_a-42_"));
        let entry = puts[0].entry().unwrap();
        assert_eq!(entry.failed_record_raw, record.to_string());
        assert_eq!(entry.owner_id, "U_a-42");
        assert_eq!(entry.failure_kind, "TransformationException");
        assert!(entry.cause.unwrap().contains("data[0]"));
    }
}
