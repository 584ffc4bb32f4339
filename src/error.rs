use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use thiserror::Error;

use crate::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("uid & message required")]
    MissingFields,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Internal error")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::MissingFields => Status::BadRequest,
            ApiError::MethodNotAllowed => Status::MethodNotAllowed,
            ApiError::MissingApiKey | ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        let details = match self {
            ApiError::Internal(e) => Some(format!("{e:#}")),
            _ => None,
        };
        ErrorResponse {
            error: self.to_string(),
            details,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        (self.status(), Json(self.body())).respond_to(req)
    }
}
