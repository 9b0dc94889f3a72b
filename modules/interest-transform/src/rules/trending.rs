use crate::error::Result;
use crate::fields::{self, lower_camel};
use crate::ids::{content_id, preference_id};
use crate::quarantine::QuarantineReason;
use crate::types::{ActionMetadata, MetadataBag, NormalizedAction};

use super::{
    created_date_time, item_object, list_payload, BusinessQuarantine, RuleContext, RuleOutcome,
    DISPLAY_NAME, SPECIFIC_FIELDS,
};

const NEWS_CATEGORY: &str = "NewsCategory";
const PREFERENCE_VALUE: &str = "PreferenceValue";

const TARGET_TYPE: &str = "TrendingOnBing";
const ACTION_TYPE: &str = "Preference";

/// Trending news categories, addressed by their numeric value in source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NewsCategory {
    World = 0,
    Us = 1,
    Business = 2,
    Entertainment = 3,
    ScienceAndTechnology = 4,
    Sports = 5,
    Politics = 6,
    Lifestyle = 7,
    Health = 8,
}

impl NewsCategory {
    pub fn from_value(value: i32) -> Option<Self> {
        Some(match value {
            0 => NewsCategory::World,
            1 => NewsCategory::Us,
            2 => NewsCategory::Business,
            3 => NewsCategory::Entertainment,
            4 => NewsCategory::ScienceAndTechnology,
            5 => NewsCategory::Sports,
            6 => NewsCategory::Politics,
            7 => NewsCategory::Lifestyle,
            8 => NewsCategory::Health,
            _ => return None,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            NewsCategory::World => "World",
            NewsCategory::Us => "US",
            NewsCategory::Business => "Business",
            NewsCategory::Entertainment => "Entertainment",
            NewsCategory::ScienceAndTechnology => "ScienceAndTechnology",
            NewsCategory::Sports => "Sports",
            NewsCategory::Politics => "Politics",
            NewsCategory::Lifestyle => "Lifestyle",
            NewsCategory::Health => "Health",
        }
    }
}

/// Integer categories resolve to their label; anything else (including
/// out-of-range integers) is used verbatim.
pub(crate) fn category_name(raw: &str) -> String {
    raw.trim()
        .parse::<i32>()
        .ok()
        .and_then(NewsCategory::from_value)
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Trending topics: one `Preference` action per item.
///
/// Every item needs a news category. One item without it invalidates the
/// whole record: nothing is emitted and a single quarantine is raised.
pub(super) fn map(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let Some(items) = list_payload(ctx) else {
        return Ok(RuleOutcome::empty());
    };

    let mut outcome = RuleOutcome::empty();
    for (index, item) in items.iter().enumerate() {
        let item = item_object(item, index)?;
        let specific = fields::object_at(item, SPECIFIC_FIELDS)?;

        let Some(news_category) = fields::map_text(specific, NEWS_CATEGORY) else {
            tracing::info!(
                owner_id = ctx.owner_id,
                doc_id = ctx.doc_id.as_deref(),
                index,
                "Skipping trending topics due to missing news category"
            );
            return Ok(RuleOutcome::abandoned(BusinessQuarantine {
                reason: QuarantineReason::TrendingOnBingNoNewsCategory,
                failed_record_raw: ctx.record.to_string(),
            }));
        };

        let mut metadata = MetadataBag::new();
        metadata.insert_present(lower_camel(DISPLAY_NAME), fields::text(item, DISPLAY_NAME));
        metadata.insert_present(lower_camel(NEWS_CATEGORY), Some(news_category.clone()));
        metadata.insert_present(
            lower_camel(PREFERENCE_VALUE),
            fields::map_text(specific, PREFERENCE_VALUE),
        );

        let definition_name = category_name(&news_category);
        let target_id = content_id(&definition_name);
        let action = NormalizedAction {
            id: preference_id(ctx.owner_id, &target_id),
            owner_id: ctx.owner_id.to_string(),
            partition_key: ctx.owner_id.to_string(),
            target_id,
            target_type: TARGET_TYPE.to_string(),
            action_type: ACTION_TYPE.to_string(),
            definition_name,
            degree: None,
            rank: None,
            created_date_time: created_date_time(item)?,
            metadata: ActionMetadata::Bag(metadata),
        };
        outcome.records.push(action.into());
    }

    Ok(outcome)
}
