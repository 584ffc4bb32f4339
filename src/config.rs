use std::env;

use crate::completion::DEFAULT_OPENAI_BASE_URL;
use crate::firestore::DEFAULT_FIRESTORE_BASE_URL;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_DOCUMENT_PATH: &str = "config/spiritCode";

/// 启动时从环境变量读取的全部设置
#[derive(Debug, Clone)]
pub struct Settings {
    pub firebase_service_account: Option<String>,
    pub firestore_emulator_host: Option<String>,
    pub firestore_project_id: Option<String>,
    pub firestore_base_url: String,
    pub document_path: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub default_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            firebase_service_account: None,
            firestore_emulator_host: None,
            firestore_project_id: None,
            firestore_base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
            document_path: DEFAULT_DOCUMENT_PATH.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    /// 读取进程环境；`.env` 文件（如果有）由 main 先加载
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 空字符串等同于未设置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            firebase_service_account: get("FIREBASE_SERVICE_ACCOUNT"),
            firestore_emulator_host: get("FIRESTORE_EMULATOR_HOST"),
            firestore_project_id: get("FIRESTORE_PROJECT_ID"),
            firestore_base_url: defaults.firestore_base_url,
            document_path: get("SPIRIT_CODE_DOCUMENT").unwrap_or(defaults.document_path),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            default_model: get("DEFAULT_MODEL").unwrap_or(defaults.default_model),
        }
    }
}
