use serde_json::Value;

use crate::error::Result;
use crate::fields::{self, lower_camel};
use crate::types::{MetadataBag, NormalizedUserSettings};

use super::{unwrap_data, RuleContext, RuleOutcome};

const IS_PERSONALIZATION_ENABLED: &str = "IsPersonalizationEnabled";
const PERSONALIZATION_CHANGED_TICKS: &str = "LastChangeTimeInTicksUtcOfIsPersonalizationEnabled";
const SHOULD_USE_CELSIUS_PATH: &str = "InterestTypeSettings.Weather.AdditionalSettings.ShouldUseCelsius";

/// Interest settings: exactly one settings record per source record once the
/// payload is an object, even when every setting is absent.
pub(super) fn map(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let payload = match unwrap_data(ctx.record) {
        Some(payload @ Value::Object(_)) => payload,
        _ => {
            tracing::debug!(
                owner_id = ctx.owner_id,
                doc_id = ctx.doc_id.as_deref(),
                "No settings object, nothing to map"
            );
            return Ok(RuleOutcome::empty());
        }
    };

    // Keys are the camel-cased leaf names.
    let mut user_settings = MetadataBag::new();
    for path in [
        IS_PERSONALIZATION_ENABLED,
        PERSONALIZATION_CHANGED_TICKS,
        SHOULD_USE_CELSIUS_PATH,
    ] {
        let key = path.rsplit('.').next().unwrap_or(path);
        user_settings.insert_present(lower_camel(key), fields::text(&payload, path));
    }

    let settings = NormalizedUserSettings {
        id: ctx.owner_id.to_string(),
        partition_key: ctx.owner_id.to_string(),
        user_settings,
    };

    let mut outcome = RuleOutcome::empty();
    outcome.records.push(settings.into());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(record: &Value) -> Result<RuleOutcome> {
        map(&RuleContext {
            record,
            owner_id: "U_a-42",
            doc_id: None,
        })
    }

    fn record(payload: Value) -> Value {
        json!({"itemKey": "InterestSettings", "userId": "42", "data": {"data": payload}})
    }

    fn settings_of(outcome: &RuleOutcome) -> &NormalizedUserSettings {
        assert_eq!(outcome.records.len(), 1);
        outcome.records[0].as_user_settings().unwrap()
    }

    #[test]
    fn only_personalization_flag() {
        let outcome = run(&record(json!({"IsPersonalizationEnabled": "true"}))).unwrap();
        let settings = settings_of(&outcome);
        assert_eq!(settings.id, "U_a-42");
        assert_eq!(settings.partition_key, "U_a-42");
        let pairs: Vec<(&str, &str)> = settings.user_settings.iter().collect();
        assert_eq!(pairs, vec![("isPersonalizationEnabled", "true")]);
    }

    #[test]
    fn all_settings() {
        let outcome = run(&record(json!({
            "IsPersonalizationEnabled": false,
            "LastChangeTimeInTicksUtcOfIsPersonalizationEnabled": 638396640000000000i64,
            "InterestTypeSettings": {
                "Weather": {"AdditionalSettings": {"ShouldUseCelsius": "True"}}
            }
        })))
        .unwrap();
        let bag = &settings_of(&outcome).user_settings;
        assert_eq!(bag.get("isPersonalizationEnabled"), Some("false"));
        assert_eq!(
            bag.get("lastChangeTimeInTicksUtcOfIsPersonalizationEnabled"),
            Some("638396640000000000")
        );
        assert_eq!(bag.get("shouldUseCelsius"), Some("True"));
    }

    #[test]
    fn empty_settings_record_when_nothing_present() {
        let outcome = run(&record(json!({"InterestTypeSettings": null}))).unwrap();
        assert!(settings_of(&outcome).user_settings.is_empty());
    }

    #[test]
    fn non_object_intermediate_reads_as_absent() {
        let outcome = run(&record(json!({"InterestTypeSettings": {"Weather": "n/a"}}))).unwrap();
        assert!(settings_of(&outcome).user_settings.is_empty());
    }

    #[test]
    fn serialized_string_payload() {
        let outcome = run(&record(json!("{\"IsPersonalizationEnabled\":\"true\"}"))).unwrap();
        assert_eq!(settings_of(&outcome).user_settings.len(), 1);
    }

    #[test]
    fn array_payload_yields_nothing() {
        let outcome = run(&record(json!([{"IsPersonalizationEnabled": "true"}]))).unwrap();
        assert!(outcome.records.is_empty());
    }
}
