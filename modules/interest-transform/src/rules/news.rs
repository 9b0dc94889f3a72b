use crate::error::Result;
use crate::fields::{self, lower_camel};
use crate::ids::{compose_id, content_id};
use crate::types::{ActionMetadata, MetadataBag, NormalizedAction};

use super::{
    created_date_time, item_object, list_payload, RuleContext, RuleOutcome, DISPLAY_NAME,
    FOLLOW, SPECIFIC_FIELDS,
};

const PDP_CATEGORY_ID: &str = "PdpCategoryId";
const NEWS_IDENTIFIER: &str = "NewsIdentifier";

const TARGET_TYPE: &str = "UserQuery";

/// News queries: one `Follow` action per item, ranked by array position.
/// Missing name components become empty strings; no item is skipped.
pub(super) fn map(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let Some(items) = list_payload(ctx) else {
        return Ok(RuleOutcome::empty());
    };

    let mut outcome = RuleOutcome::empty();
    for (index, item) in items.iter().enumerate() {
        let item = item_object(item, index)?;
        let specific = fields::object_at(item, SPECIFIC_FIELDS)?;

        let display_name = fields::text(item, DISPLAY_NAME);
        let category_id = fields::map_text(specific, PDP_CATEGORY_ID);
        let news_identifier = fields::map_text(specific, NEWS_IDENTIFIER);

        let definition_name = format!(
            "{}.{}.{}",
            display_name.as_deref().unwrap_or_default(),
            category_id.as_deref().unwrap_or_default(),
            news_identifier.as_deref().unwrap_or_default(),
        );

        let mut metadata = MetadataBag::new();
        metadata.insert_present(lower_camel(DISPLAY_NAME), display_name);
        metadata.insert_present(lower_camel(PDP_CATEGORY_ID), category_id);
        metadata.insert_present(lower_camel(NEWS_IDENTIFIER), news_identifier);

        let target_id = content_id(&definition_name);
        let action = NormalizedAction {
            id: compose_id(FOLLOW, ctx.owner_id, &target_id),
            owner_id: ctx.owner_id.to_string(),
            partition_key: ctx.owner_id.to_string(),
            target_id,
            target_type: TARGET_TYPE.to_string(),
            action_type: FOLLOW.to_string(),
            definition_name,
            degree: None,
            rank: Some(index as u32),
            created_date_time: created_date_time(item)?,
            metadata: ActionMetadata::Bag(metadata),
        };
        outcome.records.push(action.into());
    }

    Ok(outcome)
}
