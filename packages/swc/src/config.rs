use serde::Deserialize;

use crate::errors::TransformError;
use crate::value::ReplacementValue;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// 按顺序执行的替换规则
    /// 例如：[{ "value": "/^v(\\d+)$/", "newValue": "ver-$1" }]
    #[serde(default)]
    pub values: Vec<ValueRule>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueRule {
    /// 精确匹配的字符串，或 `/pattern/flags` 形式的正则
    pub value: String,

    pub new_value: ReplacementValue,

    /// 为 true 时字符串替换值按表达式输出：`attr={foo.bar}`
    #[serde(default)]
    pub literal: bool,
}

impl PluginConfig {
    /// 解析宿主传入的插件配置，缺省时视为空规则列表
    pub fn from_json(raw: Option<&str>) -> Result<Self, TransformError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(raw) => serde_json::from_str(raw)
                .map_err(|err| TransformError::InvalidConfig(err.to_string())),
        }
    }

    pub fn validate(&self) {
        // 非字符串的 newValue 不受 literal 影响
        for rule in &self.values {
            match &rule.new_value {
                ReplacementValue::String(_) => {}
                ReplacementValue::Unsupported(other) => {
                    tracing::warn!(
                        value = %rule.value,
                        new_value = %other,
                        "unsupported newValue, exact matches of this rule are ignored"
                    );
                }
                _ if rule.literal => {
                    tracing::warn!(value = %rule.value, "`literal` only applies to string newValue");
                }
                _ => {}
            }
        }
    }
}
