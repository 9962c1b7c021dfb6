use serde_json::Value;

use super::{Fields, Invalid};
use crate::database::models::CityDraft;
use crate::database::Store;

pub const NAME_MAX: usize = 100;
pub const REGION_MAX: usize = 100;
pub const NAME_TAKEN: &str = "city with this name already exists.";

/// Checks a city payload. `existing` is the id being replaced on update.
pub async fn validate_city(
    store: &dyn Store,
    payload: &Value,
    existing: Option<i64>,
) -> Result<CityDraft, Invalid> {
    let mut fields = Fields::new(payload)?;

    let name = fields.required_str("name", Some(NAME_MAX));
    let region = fields.optional_str("region", Some(REGION_MAX));
    let description = fields.optional_str("description", None);

    if let Some(name) = &name {
        if store.city_name_taken(name, existing).await? {
            fields.error("name", NAME_TAKEN);
        }
    }

    fields.finish(|| {
        Some(CityDraft {
            name: name?,
            region,
            description,
        })
    })
}
