use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Success body: `{"msg": ...}`, plus one named collection for list endpoints
#[derive(Debug)]
pub struct ApiResponse<T: Serialize = ()> {
    pub msg: String,
    pub status_code: StatusCode,
    pub collection: Option<(&'static str, T)>,
}

impl ApiResponse {
    /// 200 OK with a message only
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            status_code: StatusCode::OK,
            collection: None,
        }
    }

    /// 201 Created with a message only
    pub fn created(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            status_code: StatusCode::CREATED,
            collection: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK carrying `items` under `key`
    pub fn list(msg: impl Into<String>, key: &'static str, items: T) -> Self {
        Self {
            msg: msg.into(),
            status_code: StatusCode::OK,
            collection: Some((key, items)),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut body = json!({ "msg": self.msg });

        if let Some((key, items)) = self.collection {
            match serde_json::to_value(&items) {
                Ok(value) => body[key] = value,
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "msg": "internal server error" })),
                    )
                        .into_response();
                }
            }
        }

        (self.status_code, Json(body)).into_response()
    }
}

// Convenience type aliases
pub type ApiResult<T = ()> = Result<ApiResponse<T>, crate::error::ApiError>;
