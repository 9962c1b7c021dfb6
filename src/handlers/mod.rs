// handlers/mod.rs - one handler per (resource, operation) pair
//
// Every handler runs the same steps in order:
//   identity -> capability -> resolve by id -> validate -> persist -> respond
// and stops at the first failing step with the matching `ApiError`.
// List operations skip the capability check; comments have no update.

pub mod city;
pub mod comment;
pub mod place;
pub mod system;
pub mod utils;

pub use city::{add_city, delete_city, list_city, update_city};
pub use comment::{add_comment, delete_comment, list_comments};
pub use place::{add_place, delete_place, list_place, update_place};

#[cfg(test)]
mod tests;
