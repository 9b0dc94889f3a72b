// Sports team and finance security follows. Not part of the live dispatch
// table; enabled through `TransformConfig::legacy_rules_enabled`.

use crate::error::Result;
use crate::fields;
use crate::ids::legacy_follow_id;
use crate::types::{ActionMetadata, NormalizedAction};

use super::{item_object, list_payload, RuleContext, RuleOutcome, FOLLOW, SPECIFIC_FIELDS};

#[derive(Debug, Clone, Copy)]
pub(super) struct LegacyRule {
    /// Key under `InterestTypeSpecificFields` that becomes the target id.
    required_key: &'static str,
    target_type: &'static str,
}

pub(super) const SPORTS_TEAM: LegacyRule = LegacyRule {
    required_key: "MsnShortTeamId",
    target_type: "Team",
};

pub(super) const FINANCE_SECURITY: LegacyRule = LegacyRule {
    required_key: "MorningStarId",
    target_type: "Finance",
};

/// One `Follow` per item carrying the required key. The whole item is kept
/// as metadata. Items without the key are skipped, not quarantined.
/// Ranks start at 1 and count emitted actions.
pub(super) fn map(rule: LegacyRule, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let Some(items) = list_payload(ctx) else {
        return Ok(RuleOutcome::empty());
    };

    let mut outcome = RuleOutcome::empty();
    let mut rank = 1u32;
    for (index, item) in items.iter().enumerate() {
        let item = item_object(item, index)?;
        let specific = fields::object_at(item, SPECIFIC_FIELDS)?;

        let Some(target_id) = fields::map_text(specific, rule.required_key) else {
            tracing::debug!(
                owner_id = ctx.owner_id,
                doc_id = ctx.doc_id.as_deref(),
                required_key = rule.required_key,
                index,
                "Skipping legacy item without required key"
            );
            continue;
        };

        let action = NormalizedAction {
            id: legacy_follow_id(ctx.owner_id, &target_id),
            owner_id: ctx.owner_id.to_string(),
            partition_key: ctx.owner_id.to_string(),
            definition_name: target_id.clone(),
            target_id,
            target_type: rule.target_type.to_string(),
            action_type: FOLLOW.to_string(),
            degree: None,
            rank: Some(rank),
            created_date_time: None,
            metadata: ActionMetadata::Verbatim(item.as_object().cloned().unwrap_or_default()),
        };
        rank += 1;
        outcome.records.push(action.into());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn run(rule: LegacyRule, record: &Value) -> Result<RuleOutcome> {
        map(
            rule,
            &RuleContext {
                record,
                owner_id: "U_a-42",
                doc_id: None,
            },
        )
    }

    #[test]
    fn sports_items_become_team_follows() {
        let team = json!({
            "DisplayName": "Seahawks",
            "InterestTypeSpecificFields": {"MsnShortTeamId": "SEA", "League": "NFL"}
        });
        let record = json!({"data": {"data": [{"DisplayName": "no id"}, team.clone()]}});
        let outcome = run(SPORTS_TEAM, &record).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.quarantines.is_empty());
        let action = outcome.records[0].as_action().unwrap();
        assert_eq!(action.id, "f_U_a-42_SEA");
        assert_eq!(action.target_id, "SEA");
        assert_eq!(action.target_type, "Team");
        assert_eq!(action.rank, Some(1));
        assert_eq!(action.partition_key, "U_a-42");
        match &action.metadata {
            ActionMetadata::Verbatim(map) => assert_eq!(Value::Object(map.clone()), team),
            other => panic!("expected verbatim metadata, got {other:?}"),
        }
    }

    #[test]
    fn finance_items_become_finance_follows() {
        let record = json!({"data": {"data": [
            {"InterestTypeSpecificFields": {"MorningStarId": "0P000003MH"}},
            {"InterestTypeSpecificFields": {"MorningStarId": "0P0000OQN8"}}
        ]}});
        let outcome = run(FINANCE_SECURITY, &record).unwrap();
        let ranks: Vec<_> = outcome
            .records
            .iter()
            .map(|r| {
                let a = r.as_action().unwrap();
                assert_eq!(a.target_type, "Finance");
                a.rank
            })
            .collect();
        assert_eq!(ranks, vec![Some(1), Some(2)]);
    }
}
