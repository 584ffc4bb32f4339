use serde::{Deserialize, Serialize};

/// 用户资料，所有字段都可缺省
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default, alias = "userId")]
    pub uid: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

impl ChatRequest {
    /// uid 和 message 都非空时返回它们
    pub fn required_fields(&self) -> Option<(&str, &str)> {
        let uid = self.uid.as_deref().filter(|s| !s.is_empty())?;
        let message = self.message.as_deref().filter(|s| !s.is_empty())?;
        Some((uid, message))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
