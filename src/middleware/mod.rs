pub mod auth;
pub mod response;

pub use auth::{authenticate, jwt_auth_middleware};
pub use response::{ApiResponse, ApiResult};
