//! Attribute patcher.

use crate::host::Host;
use crate::types::{NativeId, Value};

use super::PropPatch;

/// Writes props as string attributes.
///
/// `Null` and `false` remove the attribute, `true` sets it to the empty
/// string. `className` and `htmlFor` map to `class` and `for`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributePatcher;

fn attribute_name(name: &str) -> &str {
    match name {
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    }
}

impl PropPatch for AttributePatcher {
    fn patch_prop(
        &self,
        host: &mut dyn Host,
        node: NativeId,
        name: &str,
        old: Option<&Value>,
        new: Option<&Value>,
        _is_svg: bool,
    ) {
        if name == "children" || name == "key" {
            return;
        }
        let attribute = attribute_name(name);
        match new {
            Some(value) if !value.is_absent() => {
                if old == Some(value) {
                    return;
                }
                let text = match value {
                    Value::Bool(true) => String::new(),
                    other => other.to_string(),
                };
                host.set_attribute(node, attribute, &text);
            }
            _ => {
                if old.is_some_and(|old| !old.is_absent()) {
                    host.remove_attribute(node, attribute);
                }
            }
        }
    }
}
