use crate::config::ValueRule;
use crate::errors::TransformError;
use crate::pattern::{parse_pattern, Pattern};
use crate::value::{AttributeValue, ReplacementValue};

#[derive(Debug)]
enum Matcher {
    Exact,
    Pattern(Pattern),
    /// 正则编译失败，只有真正遇到字符串属性时才报告
    Malformed(TransformError),
}

#[derive(Debug)]
struct CompiledRule {
    rule: ValueRule,
    matcher: Matcher,
}

/// 按声明顺序执行的规则列表
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ValueRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let matcher = match parse_pattern(&rule.value) {
                    Ok(Some(pattern)) => {
                        tracing::trace!(source = %pattern.source, flags = %pattern.flags, "compiled pattern");
                        Matcher::Pattern(pattern)
                    }
                    Ok(None) => Matcher::Exact,
                    Err(err) => Matcher::Malformed(err),
                };
                CompiledRule { rule, matcher }
            })
            .collect();

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 计算字符串属性值经过所有规则后的结果
    ///
    /// 后面的规则看到的是前面规则修改后的值；一旦值变成表达式容器，
    /// 后续规则不再生效，但无法编译的正则依然报错。没有任何规则生效时返回 `Ok(None)`。
    pub fn evaluate(&self, original: &str) -> Result<Option<AttributeValue>, TransformError> {
        let mut current: Option<AttributeValue> = None;

        for compiled in &self.rules {
            let text = match &current {
                None => original,
                Some(AttributeValue::Text(text)) => text.as_str(),
                Some(_) => {
                    if let Matcher::Malformed(err) = &compiled.matcher {
                        return Err(err.clone());
                    }
                    continue;
                }
            };

            match compiled.apply(text)? {
                Some(next) => {
                    tracing::debug!(rule = %compiled.rule.value, from = %text, to = ?next, "rule applied");
                    current = Some(next);
                }
                None => {
                    tracing::trace!(rule = %compiled.rule.value, value = %text, "rule skipped");
                }
            }
        }

        Ok(current)
    }
}

impl CompiledRule {
    fn apply(&self, current: &str) -> Result<Option<AttributeValue>, TransformError> {
        let ValueRule { value, new_value, literal } = &self.rule;

        match &self.matcher {
            Matcher::Malformed(err) => Err(err.clone()),

            // 空字符串不参与正则替换
            Matcher::Pattern(_) if current.is_empty() => Ok(None),

            Matcher::Pattern(pattern) => {
                let Some(replacement) = new_value.replacement_text() else {
                    return Ok(None);
                };
                Ok(pattern
                    .replace(current, &replacement)
                    .and_then(|text| ReplacementValue::String(text).resolve(*literal)))
            }

            Matcher::Exact if current == value.as_str() => Ok(new_value.resolve(*literal)),

            Matcher::Exact => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(value: &str, new_value: ReplacementValue) -> ValueRule {
        ValueRule { value: value.into(), new_value, literal: false }
    }

    fn text(value: &str) -> ReplacementValue {
        ReplacementValue::String(value.into())
    }

    fn evaluate(rules: Vec<ValueRule>, original: &str) -> Option<AttributeValue> {
        RuleSet::new(rules).evaluate(original).unwrap()
    }

    #[test]
    fn exact_match_requires_equality() {
        let rules = vec![rule("foo", text("bar"))];
        assert_eq!(evaluate(rules.clone(), "foo"), Some(AttributeValue::Text("bar".into())));
        assert_eq!(evaluate(rules, "foobar"), None);
    }

    #[test]
    fn exact_match_replaces_with_typed_values() {
        assert_eq!(
            evaluate(vec![rule("on", ReplacementValue::Boolean(true))], "on"),
            Some(AttributeValue::Boolean(true))
        );
        assert_eq!(
            evaluate(vec![rule("size", ReplacementValue::Number(42.0))], "size"),
            Some(AttributeValue::Number(42.0))
        );
        assert_eq!(
            evaluate(
                vec![ValueRule { value: "x".into(), new_value: text("foo.bar"), literal: true }],
                "x"
            ),
            Some(AttributeValue::Expression("foo.bar".into()))
        );
    }

    #[test]
    fn empty_value_can_be_matched_exactly() {
        assert_eq!(
            evaluate(vec![rule("", text("filled"))], ""),
            Some(AttributeValue::Text("filled".into()))
        );
        assert_eq!(evaluate(vec![rule("/^$/", text("filled"))], ""), None);
    }

    #[test]
    fn regex_substitutes_first_or_all_matches() {
        assert_eq!(
            evaluate(vec![rule("/a/", text("b"))], "aaa"),
            Some(AttributeValue::Text("baa".into()))
        );
        assert_eq!(
            evaluate(vec![rule("/a/g", text("b"))], "aaa"),
            Some(AttributeValue::Text("bbb".into()))
        );
        assert_eq!(evaluate(vec![rule("/^v(\\d+)$/", text("ver-$1"))], "version2"), None);
    }

    #[test]
    fn regex_rules_never_fall_back_to_exact_match() {
        // 属性值恰好等于 "/z/"，但规则按正则处理
        assert_eq!(evaluate(vec![rule("/z/", text("b"))], "/z/"), None);
    }

    #[test]
    fn regex_substitution_uses_text_form_of_typed_values() {
        assert_eq!(
            evaluate(vec![rule("/count-(\\d+)/", ReplacementValue::Number(3.0))], "count-1"),
            Some(AttributeValue::Text("3".into()))
        );
        assert_eq!(
            evaluate(vec![rule("/yes/", ReplacementValue::Boolean(true))], "yes"),
            Some(AttributeValue::Text("true".into()))
        );
    }

    #[test]
    fn regex_result_can_become_an_expression() {
        let rules = vec![ValueRule {
            value: "/^theme-(\\w+)$/".into(),
            new_value: text("theme.$1"),
            literal: true,
        }];
        assert_eq!(evaluate(rules, "theme-primary"), Some(AttributeValue::Expression("theme.primary".into())));
    }

    #[test]
    fn later_rules_observe_earlier_results() {
        // 第二条规则只有在第一条生效后才能匹配
        let rules = vec![rule("/^btn$/", text("button")), rule("button", text("button primary"))];
        assert_eq!(evaluate(rules.clone(), "btn"), Some(AttributeValue::Text("button primary".into())));

        let reversed = rules.into_iter().rev().collect();
        assert_eq!(evaluate(reversed, "btn"), Some(AttributeValue::Text("button".into())));
    }

    #[test]
    fn expression_results_stop_the_chain() {
        let rules = vec![
            rule("on", ReplacementValue::Boolean(true)),
            rule("/.*/", text("never")),
            rule("true", text("never")),
        ];
        assert_eq!(evaluate(rules, "on"), Some(AttributeValue::Boolean(true)));
    }

    #[test]
    fn malformed_pattern_fails_after_expression_results() {
        let rules = RuleSet::new(vec![
            rule("on", ReplacementValue::Boolean(true)),
            rule("/[/", text("x")),
        ]);
        assert!(matches!(
            rules.evaluate("on"),
            Err(TransformError::MalformedPattern { ref pattern, .. }) if pattern == "/[/"
        ));
    }

    #[test]
    fn unsupported_values_are_ignored() {
        let rules = vec![
            rule("foo", ReplacementValue::Unsupported(serde_json::Value::Null)),
            rule("/foo/", ReplacementValue::Unsupported(serde_json::json!([1, 2]))),
        ];
        assert_eq!(evaluate(rules, "foo"), None);
    }

    #[test]
    fn malformed_pattern_fails_on_string_attributes() {
        let rules = RuleSet::new(vec![rule("foo", text("bar")), rule("/(/", text("x"))]);
        assert!(matches!(
            rules.evaluate("foo"),
            Err(TransformError::MalformedPattern { ref pattern, .. }) if pattern == "/(/"
        ));
    }
}
