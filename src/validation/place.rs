use serde_json::Value;

use super::{missing_pk, Fields, Invalid};
use crate::database::models::PlaceDraft;
use crate::database::Store;

pub const NAME_MAX: usize = 100;
pub const CATEGORY_MAX: usize = 50;

pub async fn validate_place(
    store: &dyn Store,
    payload: &Value,
) -> Result<PlaceDraft, Invalid> {
    let mut fields = Fields::new(payload)?;

    let name = fields.required_str("name", Some(NAME_MAX));
    let city = fields.required_pk("city");
    let category = fields.optional_str("category", Some(CATEGORY_MAX));
    let description = fields.optional_str("description", None);

    if let Some(city) = city {
        if store.get_city(city).await?.is_none() {
            fields.error("city", missing_pk(city));
        }
    }

    fields.finish(|| {
        Some(PlaceDraft {
            name: name?,
            city: city?,
            category,
            description,
        })
    })
}
