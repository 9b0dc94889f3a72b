use crate::error::Result;
use crate::fields::{self, lower_camel, scalar_text};
use crate::ids::{compose_id, content_id};
use crate::quarantine::QuarantineReason;
use crate::types::{ActionMetadata, MetadataBag, NormalizedAction};

use super::{
    created_date_time, item_object, list_payload, BusinessQuarantine, RuleContext, RuleOutcome,
    DISPLAY_NAME, FOLLOW, SPECIFIC_FIELDS,
};

const LATITUDE: &str = "Latitude";
const LONGITUDE: &str = "Longitude";
const CORRELATION_GUID: &str = "CorrelationGuid";

const TARGET_TYPE: &str = "Location";
const FAVORITE_LOCATION: &str = "FavoriteLocation";
const FORECAST_NEARBY: &str = "WeatherForecastNearby";

/// Weather locations: one `Follow` action per item with coordinates.
///
/// An item without latitude or longitude is quarantined on its own and the
/// remaining items are still mapped. Ranks count emitted actions only.
pub(super) fn map(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let Some(items) = list_payload(ctx) else {
        return Ok(RuleOutcome::empty());
    };

    let mut outcome = RuleOutcome::empty();
    let mut rank = 0u32;
    for (index, item) in items.iter().enumerate() {
        let item = item_object(item, index)?;
        let specific = fields::object_at(item, SPECIFIC_FIELDS)?;

        let (Some(latitude), Some(longitude)) = (
            fields::map_text(specific, LATITUDE),
            fields::map_text(specific, LONGITUDE),
        ) else {
            tracing::info!(
                owner_id = ctx.owner_id,
                doc_id = ctx.doc_id.as_deref(),
                index,
                "Skipping location due to missing latitude or longitude"
            );
            outcome.quarantines.push(BusinessQuarantine {
                reason: QuarantineReason::WeatherNoLatOrLon,
                failed_record_raw: item.to_string(),
            });
            continue;
        };

        let mut metadata = MetadataBag::new();
        metadata.insert_present(lower_camel(DISPLAY_NAME), fields::text(item, DISPLAY_NAME));
        for (key, value) in specific.into_iter().flatten() {
            metadata.insert_present(lower_camel(key), scalar_text(value));
        }

        let degree = match fields::text(item, CORRELATION_GUID).as_deref() {
            Some(FORECAST_NEARBY) => FORECAST_NEARBY,
            _ => FAVORITE_LOCATION,
        };

        let definition_name = format!("{latitude},{longitude}");
        let target_id = content_id(&definition_name);
        let action = NormalizedAction {
            id: compose_id(FOLLOW, ctx.owner_id, &target_id),
            owner_id: ctx.owner_id.to_string(),
            partition_key: ctx.owner_id.to_string(),
            target_id,
            target_type: TARGET_TYPE.to_string(),
            action_type: FOLLOW.to_string(),
            definition_name,
            degree: Some(degree.to_string()),
            rank: Some(rank),
            created_date_time: created_date_time(item)?,
            metadata: ActionMetadata::Bag(metadata),
        };
        rank += 1;
        outcome.records.push(action.into());
    }

    Ok(outcome)
}
