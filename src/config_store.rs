use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info};

use crate::config::Settings;
use crate::firestore::{Document, FirestoreClient, StoreInitError};
use crate::prompt::build_default_system_prompt;
use crate::types::Profile;

const EMULATOR_PROJECT_ID: &str = "demo-project";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 400;

/// Firestore 中的 spirit code 配置；字段都可缺省
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpiritCodeConfig {
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl SpiritCodeConfig {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            system_prompt: doc.string("systemPrompt").map(str::to_string),
            model: doc.string("model").map(str::to_string),
            temperature: doc.number("temperature"),
            max_tokens: doc.integer("maxTokens").and_then(|n| u32::try_from(n).ok()),
        }
    }
}

/// 合并默认值之后真正用于补全调用的参数
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub system_prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ResolvedConfig {
    /// systemPrompt / model 为空字符串时同样回退到默认值；
    /// temperature / maxTokens 只在缺省时回退，0 会被保留
    pub fn resolve(config: SpiritCodeConfig, profile: Option<&Profile>, default_model: &str) -> Self {
        let system_prompt = config
            .system_prompt
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| build_default_system_prompt(profile));
        let model = config
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model.to_string());

        Self {
            system_prompt,
            model,
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

/// 配置来源抽象，handler 只依赖这个 trait
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// 文档不存在时返回空配置，只有传输层错误才返回 Err
    async fn fetch(&self) -> Result<SpiritCodeConfig>;
}

/// 基于 Firestore 的配置来源。
///
/// 进程内只构造一次并注入到 Rocket 的 managed state。底层客户端（解析凭证、
/// 构造签名密钥）由 `OnceLock` 懒加载：并发的第一批请求会等待同一次初始化，
/// 凭证不会被重复解析。初始化失败也会被缓存，之后每次 `fetch` 都返回同一个错误。
pub struct FirestoreConfigStore {
    settings: Settings,
    client: OnceLock<Result<FirestoreClient, StoreInitError>>,
}

impl FirestoreConfigStore {
    pub fn new(settings: Settings) -> Arc<Self> {
        Arc::new(Self {
            settings,
            client: OnceLock::new(),
        })
    }

    /// 触发一次初始化（冷启动时调用），重复调用是空操作
    pub fn initialize(&self) -> Result<&FirestoreClient, StoreInitError> {
        self.client
            .get_or_init(|| {
                let result = connect(&self.settings);
                match &result {
                    Ok(_) => info!("ZENAI_BACKEND: Firestore client initialized"),
                    Err(e) => error!(error = %e, "ZENAI_BACKEND: Firestore initialization error"),
                }
                result
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

fn connect(settings: &Settings) -> Result<FirestoreClient, StoreInitError> {
    if let Some(host) = &settings.firestore_emulator_host {
        let project_id = settings
            .firestore_project_id
            .clone()
            .or_else(|| project_id_hint(settings.firebase_service_account.as_deref()))
            .unwrap_or_else(|| EMULATOR_PROJECT_ID.to_string());
        return Ok(FirestoreClient::emulator(host, &project_id));
    }

    let credential = settings
        .firebase_service_account
        .as_deref()
        .ok_or(StoreInitError::MissingCredential)?;
    FirestoreClient::from_service_account_json(
        credential,
        &settings.firestore_base_url,
        settings.firestore_project_id.as_deref(),
    )
}

// 模拟器模式下只借用凭证里的 project_id，不需要私钥
fn project_id_hint(credential: Option<&str>) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(credential?).ok()?;
    value.get("project_id")?.as_str().map(str::to_string)
}

#[async_trait]
impl ConfigStore for FirestoreConfigStore {
    async fn fetch(&self) -> Result<SpiritCodeConfig> {
        let client = self.initialize()?;
        let config = client
            .get_document(&self.settings.document_path)
            .await?
            .map(|doc| SpiritCodeConfig::from_document(&doc))
            .unwrap_or_default();
        Ok(config)
    }
}
