use swc_core::atoms::Atom;
use swc_core::common::{sync::Lrc, FileName, SourceMap, Span, DUMMY_SP};
use swc_core::ecma::{
    ast::*,
    parser::{parse_file_as_expr, EsSyntax, Syntax},
    visit::{VisitMut, VisitMutWith},
};

use crate::errors::TransformError;
use crate::value::AttributeValue;

/// 把规则计算出的值转换成可以直接写回 `JSXAttr` 的节点
pub fn materialize_attr_value(value: AttributeValue, span: Span) -> Result<JSXAttrValue, TransformError> {
    let expr = match value {
        AttributeValue::Text(text) => {
            let mut str_lit = Str::from(Atom::from(text));
            str_lit.span = span;
            return Ok(JSXAttrValue::Str(str_lit));
        }
        AttributeValue::Expression(source) => parse_expression(&source)?,
        AttributeValue::Boolean(value) => Box::new(Expr::Lit(Lit::Bool(Bool { span: DUMMY_SP, value }))),
        AttributeValue::Number(value) => number_expr(value),
    };

    Ok(JSXAttrValue::JSXExprContainer(JSXExprContainer {
        span,
        expr: JSXExpr::Expr(expr),
    }))
}

/// 把一段源码解析成单个表达式，所有 span 重置为 `DUMMY_SP`
pub(crate) fn parse_expression(source: &str) -> Result<Box<Expr>, TransformError> {
    let malformed = |reason: String| TransformError::MalformedExpression {
        expression: source.to_string(),
        reason,
    };

    // 用括号包裹，多余的 token（例如 `foo bar`）会导致解析失败
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Anon.into(), format!("(\n{}\n)", source));
    let syntax = Syntax::Es(EsSyntax {
        jsx: true,
        ..Default::default()
    });

    let mut recovered = Vec::new();
    let expr = parse_file_as_expr(&fm, syntax, EsVersion::latest(), None, &mut recovered)
        .map_err(|err| malformed(err.into_kind().msg().into_owned()))?;

    if let Some(err) = recovered.into_iter().next() {
        return Err(malformed(err.into_kind().msg().into_owned()));
    }

    // 顶层必须正好是外层括号，否则源码里有未配对的括号，例如 `a) + (b`
    let mut expr = match *expr {
        Expr::Paren(ParenExpr { span, expr, .. }) if span.lo == fm.start_pos && span.hi == fm.end_pos => expr,
        _ => return Err(malformed("unbalanced parentheses".to_string())),
    };
    expr.visit_mut_with(&mut SpanResetter);

    Ok(expr)
}

/// 负数输出为 `-n`
fn number_expr(value: f64) -> Box<Expr> {
    let literal = |value: f64| {
        Box::new(Expr::Lit(Lit::Num(Number {
            span: DUMMY_SP,
            value,
            raw: None,
        })))
    };

    if value < 0.0 {
        return Box::new(Expr::Unary(UnaryExpr {
            span: DUMMY_SP,
            op: UnaryOp::Minus,
            arg: literal(-value),
        }));
    }

    literal(value.abs())
}

/// 解析出的节点来自独立的 SourceMap，不能保留原来的位置
struct SpanResetter;

impl VisitMut for SpanResetter {
    fn visit_mut_span(&mut self, span: &mut Span) {
        *span = DUMMY_SP;
    }
}
