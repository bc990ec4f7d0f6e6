use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use connector_service::error::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

/// `{"msg": ...}` body shared by confirmations and most errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub msg: String,
}

impl Message {
    pub fn new(msg: &str) -> Json<Self> {
        Json(Self { msg: msg.to_string() })
    }
}

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    BadBody(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::BadBody(msg) => return (StatusCode::BAD_REQUEST, Message::new(&msg)).into_response(),
            ApiError::Service(err) => err,
        };

        let status = match &err {
            ServiceError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response();
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) | ServiceError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            ServiceError::AlreadyLiked | ServiceError::NotLiked | ServiceError::NothingToDelete(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Upstream(_) | ServiceError::Storage(_) => {
                error!(error = %err, "request failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, Message::new("Server Error")).into_response();
            }
        };

        (status, Message::new(&err.to_string())).into_response()
    }
}
