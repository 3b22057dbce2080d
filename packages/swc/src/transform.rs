use swc_core::ecma::{
    ast::*,
    visit::{VisitMut, VisitMutWith},
};

use crate::config::PluginConfig;
use crate::errors::{report_transform_error, TransformError};
use crate::materialize::materialize_attr_value;
use crate::rules::RuleSet;

pub struct ReplaceJsxAttributeValueTransformer {
    rules: RuleSet,
}

/// 字符串字面量的值，包含孤立代理项时返回 `None`
fn string_value(str_lit: &Str) -> Option<&str> {
    str_lit.value.as_str()
}

impl ReplaceJsxAttributeValueTransformer {
    pub fn new(config: PluginConfig) -> Self {
        config.validate();
        Self { rules: RuleSet::new(config.values) }
    }

    /// 对单个属性执行所有规则
    ///
    /// 只处理 `attr="..."` 形式的属性；出错时属性保持原样。
    /// 返回属性是否被修改。
    pub fn rewrite_attr(&self, attr: &mut JSXAttr) -> Result<bool, TransformError> {
        let Some(JSXAttrValue::Str(current)) = &attr.value else {
            return Ok(false);
        };
        let Some(current_text) = string_value(current) else {
            return Ok(false);
        };
        let span = current.span;

        let Some(next) = self.rules.evaluate(current_text)? else {
            return Ok(false);
        };

        attr.value = Some(materialize_attr_value(next, span)?);
        Ok(true)
    }
}

impl VisitMut for ReplaceJsxAttributeValueTransformer {
    fn visit_mut_jsx_attr(&mut self, attr: &mut JSXAttr) {
        // 先访问子节点，替换进来的表达式不会被再次处理
        attr.visit_mut_children_with(self);

        if self.rules.is_empty() {
            return;
        }

        if let Err(err) = self.rewrite_attr(attr) {
            report_transform_error(&err, attr.span);
        }
    }
}
