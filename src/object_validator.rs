//! Object Validator - depth, property count, and property-name safety for
//! an object-literal node. Delegates each property's value expression back
//! to whichever validator is appropriate for its shape.

use swc_ecma_ast::{Expr, ObjectLit, Prop, PropName, PropOrSpread};

use crate::argument_validator;
use crate::chain_validator;
use crate::governor::DepthKind;
use crate::session::Session;

/// Validates an object literal at the given nesting `depth`. Returns `true`
/// iff no error-severity issue was produced for this object (warnings do
/// not fail validation). Stops at the first failing property per the
/// short-circuit policy; all issues accumulated up to that point remain in
/// the session's reporter.
pub fn validate_object(obj: &ObjectLit, depth: u32, sess: &mut Session) -> bool {
    let cache_key = obj as *const ObjectLit as usize;
    if let Some(cached) = sess.cached_object_result(cache_key) {
        return cached;
    }

    let result = validate_object_uncached(obj, depth, sess);
    sess.cache_object_result(cache_key, result);
    result
}

fn validate_object_uncached(obj: &ObjectLit, depth: u32, sess: &mut Session) -> bool {
    if sess.governor.check_timeout_aggressive().is_err() {
        sess.report_error(obj.span, "Validation timed out", "ObjectExpression");
        return false;
    }

    if sess.governor.track_depth(depth, DepthKind::Object).is_err() {
        sess.report_error(
            obj.span,
            format!(
                "Object exceeds maximum nesting depth of {}",
                sess.config.max_object_depth
            ),
            "ObjectExpression",
        );
        return false;
    }

    let max_properties = sess.config.max_properties_per_object;
    if obj.props.len() > max_properties {
        sess.report_error(
            obj.span,
            format!("Object exceeds maximum property count of {}", max_properties),
            "ObjectExpression",
        );
        return false;
    }

    for prop_or_spread in &obj.props {
        if sess.governor.increment_node().is_err() {
            sess.report_error(obj.span, "Object validation exceeded resource limits", "ObjectExpression");
            return false;
        }

        if !validate_property(prop_or_spread, depth, sess) {
            return false;
        }
    }

    if sess.governor.check_timeout().is_err() {
        sess.report_error(obj.span, "Validation timed out", "ObjectExpression");
        return false;
    }

    true
}

fn validate_property(prop_or_spread: &PropOrSpread, depth: u32, sess: &mut Session) -> bool {
    match prop_or_spread {
        PropOrSpread::Spread(spread) => {
            sess.report_error(
                spread.dot3_token,
                "Spread elements are not allowed in objects",
                "SpreadElement",
            );
            false
        }
        PropOrSpread::Prop(prop) => match prop.as_ref() {
            Prop::Method(method) => {
                sess.report_error(method.function.span, "Object methods not allowed", "MethodProp");
                false
            }
            Prop::Getter(getter) => {
                sess.report_error(getter.span, "Getter/setter methods are not allowed", "GetterProp");
                false
            }
            Prop::Setter(setter) => {
                sess.report_error(setter.span, "Getter/setter methods are not allowed", "SetterProp");
                false
            }
            Prop::Shorthand(ident) => validate_property_name(&ident.sym, ident.span, sess),
            Prop::Assign(assign) => validate_property_name(&assign.key.sym, assign.key.span, sess),
            Prop::KeyValue(kv) => {
                let (name, name_span) = match &kv.key {
                    PropName::Ident(ident) => (ident.sym.to_string(), ident.span),
                    PropName::Str(s) => (s.value.to_string_lossy().into_owned(), s.span),
                    PropName::Computed(computed) => {
                        if !sess.config.allow_computed_properties {
                            sess.report_error(
                                computed.span,
                                "Computed properties are not allowed",
                                "ObjectProperty",
                            );
                            return false;
                        }
                        return validate_value(&kv.value, depth, sess);
                    }
                    PropName::Num(num) => {
                        sess.report_error(num.span, "Object property keys must be identifiers or strings", "ObjectProperty");
                        return false;
                    }
                    PropName::BigInt(big) => {
                        sess.report_error(big.span, "Object property keys must be identifiers or strings", "ObjectProperty");
                        return false;
                    }
                };

                if !validate_property_name(&name, name_span, sess) {
                    return false;
                }
                validate_value(&kv.value, depth, sess)
            }
        },
    }
}

fn validate_property_name(name: &str, span: swc_common::Span, sess: &mut Session) -> bool {
    let safety = &sess.config.property_safety;

    if safety.denied_properties.contains(name) {
        sess.report_warning(
            span,
            format!("Property name '{}' is not allowed", name),
            "ObjectProperty",
        );
    }

    if let Some(prefix) = safety.denied_prefixes.iter().find(|p| name.starts_with(p.as_str())) {
        sess.report_error(
            span,
            format!("Property name '{}' uses a forbidden prefix '{}'", name, prefix),
            "ObjectProperty",
        );
        return false;
    }

    if !safety.allowed_properties.is_empty() && !safety.allowed_properties.contains(name) {
        sess.report_error(
            span,
            format!("Property name '{}' is not in the allowed list", name),
            "ObjectProperty",
        );
        return false;
    }

    true
}

fn validate_value(value: &Expr, depth: u32, sess: &mut Session) -> bool {
    match value {
        Expr::Object(nested) => validate_object(nested, depth + 1, sess),
        Expr::Call(_) => chain_validator::validate_chain(value, 0, sess),
        _ => argument_validator::validate_standalone_literal(value, sess),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::test_support::parse_expr;

    fn object_of(src: &str) -> swc_ecma_ast::ObjectLit {
        match parse_expr(src) {
            Expr::Object(obj) => obj,
            other => panic!("expected object literal, got {:?}", other),
        }
    }

    #[test]
    fn rejects_spread() {
        let config = presets::relaxed();
        let obj = object_of("({ ...rest, name: 'a' })");
        let mut sess = Session::new(&config, Default::default());
        assert!(!validate_object(&obj, 0, &mut sess));
        assert!(sess.issues.issues()[0].message.contains("Spread elements"));
    }

    #[test]
    fn rejects_computed_when_disallowed() {
        let mut config = presets::relaxed();
        config.allow_computed_properties = false;
        let obj = object_of(r#"({ ["computed"]: "value" })"#);
        let mut sess = Session::new(&config, Default::default());
        assert!(!validate_object(&obj, 0, &mut sess));
        assert!(sess.issues.issues()[0].message.contains("Computed properties"));
    }

    #[test]
    fn denied_property_name_is_a_warning() {
        let config = presets::relaxed();
        let obj = object_of("({ constructor: 1 })");
        let mut sess = Session::new(&config, Default::default());
        let valid = validate_object(&obj, 0, &mut sess);
        assert!(valid, "a denied-but-not-prefixed property is a warning, not an error");
        assert!(sess.issues.issues()[0].message.contains("'constructor' is not allowed"));
    }

    #[test]
    fn denied_prefix_is_an_error() {
        let config = presets::extremely_safe();
        let obj = object_of("({ __proto__value: 1 })");
        let mut sess = Session::new(&config, Default::default());
        assert!(!validate_object(&obj, 0, &mut sess));
    }

    #[test]
    fn depth_cap_trips() {
        let mut config = presets::relaxed();
        config.max_object_depth = 1;
        let obj = object_of("({ a: { b: { c: 1 } } })");
        let mut sess = Session::new(&config, Default::default());
        assert!(!validate_object(&obj, 0, &mut sess));
        assert!(sess.issues.has_errors());
    }
}
