use swc_core::common::DUMMY_SP;
use swc_core::ecma::{
    ast::{Pass, Program},
    visit::{visit_mut_pass, VisitMutWith},
};
use swc_core::plugin::{plugin_transform, proxies::TransformPluginProgramMetadata};

mod config;
mod errors;
mod materialize;
mod pattern;
mod rules;
mod transform;
mod value;

pub use config::{PluginConfig, ValueRule};
pub use errors::TransformError;
pub use transform::ReplaceJsxAttributeValueTransformer;
pub use value::{AttributeValue, ReplacementValue};

/// 供其他 Rust 宿主直接组合使用的 pass
pub fn replace_jsx_attribute_value(config: PluginConfig) -> impl Pass {
    visit_mut_pass(ReplaceJsxAttributeValueTransformer::new(config))
}

#[plugin_transform]
pub fn process_transform(mut program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let raw_config = metadata.get_transform_plugin_config();

    let config = match PluginConfig::from_json(raw_config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            errors::report_transform_error(&err, DUMMY_SP);
            return program;
        }
    };

    tracing::debug!(rules = config.values.len(), "replace-jsx-attribute-value configured");

    program.visit_mut_with(&mut ReplaceJsxAttributeValueTransformer::new(config));
    program
}
