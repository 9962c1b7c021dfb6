use serde_json::Value;

use super::{missing_pk, parse_pk, Fields, Invalid, NOT_NULL, REQUIRED};
use crate::database::models::{CommentDraft, CommentTarget, TargetKind};
use crate::database::Store;

/// Checks a comment payload; `author` comes from the identity, never the body.
///
/// `target` is `{"kind": "city" | "place", "id": <pk>}`.
pub async fn validate_comment(
    store: &dyn Store,
    payload: &Value,
    author: &str,
) -> Result<CommentDraft, Invalid> {
    let mut fields = Fields::new(payload)?;

    let body = fields.required_str("body", None);
    let target = target(&mut fields);

    if let Some(target) = target {
        if !store.target_exists(target).await? {
            fields.error("target", missing_pk(target.id));
        }
    }

    fields.finish(|| {
        Some(CommentDraft {
            body: body?,
            author: author.to_string(),
            target: target?,
        })
    })
}

fn target(fields: &mut Fields<'_>) -> Option<CommentTarget> {
    let raw = match fields.raw("target") {
        None => {
            fields.error("target", REQUIRED);
            return None;
        }
        Some(Value::Null) => {
            fields.error("target", NOT_NULL);
            return None;
        }
        Some(Value::Object(map)) => map,
        Some(_) => {
            fields.error("target", "Expected an object with \"kind\" and \"id\".");
            return None;
        }
    };

    let kind = match raw.get("kind") {
        Some(Value::String(s)) => match TargetKind::parse(s.trim()) {
            Some(kind) => Some(kind),
            None => {
                fields.error("target", format!("\"{}\" is not a valid choice.", s));
                None
            }
        },
        _ => {
            fields.error("target", "kind: This field is required.");
            None
        }
    };

    let id = match raw.get("id").and_then(parse_pk) {
        Some(id) => Some(id),
        None => {
            fields.error("target", "id: A valid integer is required.");
            None
        }
    };

    if fields.has_error("target") {
        return None;
    }
    Some(CommentTarget { kind: kind?, id: id? })
}
