use serde::Deserialize;

/// 配置中的 `newValue`
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ReplacementValue {
    String(String),
    Boolean(bool),
    Number(f64),
    /// null、数组、对象等，永远不会被写回属性
    Unsupported(serde_json::Value),
}

/// 与具体 AST 无关的属性值，由 `materialize` 转换成 SWC 节点
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// `attr="text"`
    Text(String),
    /// `attr={<expression>}`，源码在物化时才解析
    Expression(String),
    /// `attr={true}`
    Boolean(bool),
    /// `attr={42}`
    Number(f64),
}

impl ReplacementValue {
    pub fn resolve(&self, literal: bool) -> Option<AttributeValue> {
        match self {
            Self::String(value) if literal => Some(AttributeValue::Expression(value.clone())),
            Self::String(value) => Some(AttributeValue::Text(value.clone())),
            Self::Boolean(value) => Some(AttributeValue::Boolean(*value)),
            Self::Number(value) => Some(AttributeValue::Number(*value)),
            Self::Unsupported(_) => None,
        }
    }

    /// 正则替换时使用的文本形式，等同于 JS 中的字符串强制转换
    pub fn replacement_text(&self) -> Option<String> {
        match self {
            Self::String(value) => Some(value.clone()),
            Self::Boolean(value) => Some(value.to_string()),
            Self::Number(value) => Some(number_to_string(*value)),
            Self::Unsupported(_) => None,
        }
    }
}

fn number_to_string(value: f64) -> String {
    // -0 同样输出 "0"
    if value == 0.0 {
        return "0".to_string();
    }

    // 与 JS 一致：绝对值 >= 1e21 或 < 1e-6 时使用指数形式，例如 `1e+21`
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }

    value.to_string()
}
