use std::sync::Arc;

use rocket::data::Data;
use rocket::http::{Method, Status};
use rocket::route::{self, Handler, Route};
use rocket::serde::json::Json;
use rocket::{options, post, routes, Build, Request, Rocket, State};
use tracing::{error, info, warn};

use crate::app_state::AppState;
use crate::completion::CompletionRequest;
use crate::config_store::ResolvedConfig;
use crate::cors::Cors;
use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse, Profile};

pub fn build(state: Arc<AppState>) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .attach(Cors)
        .mount("/", routes![preflight, chat])
        .mount("/", MethodNotAllowed)
}

/// CORS 预检：200，无 body
#[options("/")]
pub fn preflight() -> Status {
    Status::Ok
}

#[post("/", data = "<req>")]
pub async fn chat(
    state: &State<Arc<AppState>>,
    req: Option<Json<ChatRequest>>,
) -> Result<Json<ChatResponse>, ApiError> {
    // body 缺失或不是合法 JSON 时按缺字段处理
    let req = req.map(Json::into_inner).unwrap_or_default();
    let Some((uid, message)) = req.required_fields() else {
        warn!("ZENAI_BACKEND: uid & message required");
        return Err(ApiError::MissingFields);
    };

    info!(
        uid,
        message_length = message.chars().count(),
        profile_name = req
            .profile
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or("unknown"),
        "ZENAI_BACKEND: Received request"
    );

    match generate_reply(state, message, req.profile.as_ref()).await {
        Ok(reply) => {
            info!("ZENAI_BACKEND: Successfully generated reply");
            Ok(Json(ChatResponse { reply }))
        }
        Err(e) => {
            let body = e.body();
            error!(error = %body.error, details = ?body.details, "ZENAI_BACKEND: Error");
            Err(e)
        }
    }
}

async fn generate_reply(
    state: &AppState,
    message: &str,
    profile: Option<&Profile>,
) -> Result<String, ApiError> {
    let config = state.store.fetch().await?;
    let resolved = ResolvedConfig::resolve(config, profile, &state.default_model);

    info!(
        model = %resolved.model,
        temperature = resolved.temperature,
        system_prompt_length = resolved.system_prompt.chars().count(),
        "ZENAI_BACKEND: Using config"
    );

    let engine = state.engine.as_ref().ok_or(ApiError::MissingApiKey)?;

    let request = CompletionRequest {
        model: resolved.model,
        temperature: resolved.temperature,
        max_tokens: resolved.max_tokens,
        system_prompt: resolved.system_prompt,
        user_message: message.to_string(),
    };
    Ok(engine.complete(&request).await?)
}

/// `/` 上除 POST / OPTIONS 外的所有方法都返回 405
#[derive(Clone)]
pub struct MethodNotAllowed;

#[rocket::async_trait]
impl Handler for MethodNotAllowed {
    async fn handle<'r>(&self, req: &'r Request<'_>, _data: Data<'r>) -> route::Outcome<'r> {
        warn!(method = %req.method(), "ZENAI_BACKEND: Method not allowed");
        route::Outcome::from(req, ApiError::MethodNotAllowed)
    }
}

impl From<MethodNotAllowed> for Vec<Route> {
    fn from(handler: MethodNotAllowed) -> Vec<Route> {
        [Method::Get, Method::Put, Method::Patch, Method::Delete]
            .into_iter()
            .map(|method| Route::new(method, "/", handler.clone()))
            .collect()
    }
}
