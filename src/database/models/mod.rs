pub mod city;
pub mod comment;
pub mod place;

pub use city::{City, CityDraft};
pub use comment::{Comment, CommentDraft, CommentTarget, TargetKind};
pub use place::{Place, PlaceDraft};
