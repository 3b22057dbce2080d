use swc_core::common::{errors::HANDLER, Span};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// `value` 形如 `/pattern/flags`，但正则本身无法编译
    #[error("invalid regular expression `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// `literal: true` 的替换值不是合法的表达式
    #[error("`{expression}` is not a valid expression: {reason}")]
    MalformedExpression { expression: String, reason: String },

    #[error("invalid plugin options: {0}")]
    InvalidConfig(String),
}

/// 报告替换失败，宿主会中止当前文件的转换
pub fn report_transform_error(error: &TransformError, span: Span) {
    HANDLER.with(|handler| {
        handler
            .struct_span_err(span, &format!("[replace-jsx-attribute-value] {}", error))
            .emit();
    });
}
