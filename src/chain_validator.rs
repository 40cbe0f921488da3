//! Chain Validator - recognizes the `z.<ctor>().<method>().<method>()...`
//! grammar and rejects anything that doesn't reduce to it: a non-`z` root,
//! a computed member access, a non-identifier method name, or a method name
//! absent from the allow-list. Delegates argument checking to the Argument
//! Validator for any call whose method has an entry in the argument-rule
//! table.

use swc_common::Spanned;
use swc_ecma_ast::{Callee, Expr, MemberProp};

use crate::allowlist;
use crate::argument_validator;
use crate::governor::DepthKind;
use crate::session::Session;

/// Validates `expr` as a schema-construction chain at the given call depth
/// (0 for the outermost call). Returns `true` iff the whole chain resolves
/// back to the `z` root through allowed method names with valid arguments.
pub fn validate_chain(expr: &Expr, depth: u32, sess: &mut Session) -> bool {
    if sess.governor.check_timeout_aggressive().is_err() {
        sess.report_error(expr.span(), "Validation timed out", "CallExpression");
        return false;
    }

    if sess.governor.increment_node().is_err() {
        sess.report_error(expr.span(), "Chain validation exceeded resource limits", "CallExpression");
        return false;
    }

    if sess.governor.track_depth(depth, DepthKind::Chain).is_err() {
        sess.report_error(
            expr.span(),
            format!(
                "Method chain exceeds maximum depth of {}",
                sess.config.max_chain_depth
            ),
            "CallExpression",
        );
        return false;
    }

    let result = validate_chain_shape(expr, depth, sess);

    if result && sess.governor.check_timeout().is_err() {
        sess.report_error(expr.span(), "Validation timed out", "CallExpression");
        return false;
    }

    result
}

fn validate_chain_shape(expr: &Expr, depth: u32, sess: &mut Session) -> bool {
    match expr {
        Expr::Ident(ident) => {
            if ident.sym.as_ref() == "z" {
                true
            } else {
                sess.report_error(
                    ident.span,
                    format!("Schema chains must root at 'z', found '{}'", ident.sym),
                    "Identifier",
                );
                false
            }
        }
        Expr::Member(member) => {
            let method_name = match &member.prop {
                MemberProp::Ident(ident) => ident.sym.to_string(),
                MemberProp::PrivateName(private) => {
                    sess.report_error(private.span, "Private member access is not allowed", "MemberExpression");
                    return false;
                }
                MemberProp::Computed(computed) => {
                    sess.report_error(
                        computed.span,
                        "Computed member access is not allowed in a schema chain",
                        "MemberExpression",
                    );
                    return false;
                }
            };

            if !allowlist::is_allowed_method(&method_name) {
                sess.report_error(
                    member.span,
                    format!("Method '{}' is not an allowed schema method", method_name),
                    "MemberExpression",
                );
                return false;
            }

            validate_chain(&member.obj, depth, sess)
        }
        Expr::Call(call) => {
            let callee = match &call.callee {
                Callee::Expr(callee_expr) => callee_expr.as_ref(),
                _ => {
                    sess.report_error(call.span, "Unsupported call form in schema chain", "CallExpression");
                    return false;
                }
            };

            let method_name = match callee {
                Expr::Ident(ident) if ident.sym.as_ref() == "z" => None,
                Expr::Member(member) => match &member.prop {
                    MemberProp::Ident(ident) => Some(ident.sym.to_string()),
                    _ => {
                        sess.report_error(
                            member.span,
                            "Schema chain calls must use a plain method name",
                            "MemberExpression",
                        );
                        return false;
                    }
                },
                _ => {
                    sess.report_error(call.span, "Unrecognized schema chain call", "CallExpression");
                    return false;
                }
            };

            if !validate_chain(callee, depth + 1, sess) {
                return false;
            }

            if let Some(name) = method_name {
                if let Some(rule) = allowlist::ARG_RULES.get(name.as_str()) {
                    return argument_validator::validate_arguments(&name, rule, &call.args, depth, sess);
                }
            }

            // No rule recorded for this method: still validate each argument
            // as a standalone expression so nested schema chains and object
            // literals are checked even without a dedicated rule.
            call.args
                .iter()
                .all(|arg| argument_validator::validate_standalone_literal(&arg.expr, sess))
        }
        other => {
            sess.report_error(
                other.span(),
                "Expression is not a recognized schema chain",
                "Expression",
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::test_support::parse_expr;

    fn check<'c>(src: &str, config: &'c crate::config::Config) -> (bool, Session<'c>) {
        let (expr, source_map) = parse_expr(src);
        let mut sess = Session::new(config, source_map);
        let ok = validate_chain(&expr, 0, &mut sess);
        (ok, sess)
    }

    #[test]
    fn accepts_simple_chain() {
        let config = presets::relaxed();
        let (ok, _) = check("z.string().min(3).max(10)", &config);
        assert!(ok);
    }

    #[test]
    fn rejects_non_z_root() {
        let config = presets::relaxed();
        let (ok, sess) = check("w.string()", &config);
        assert!(!ok);
        assert!(sess.issues.has_errors());
    }

    #[test]
    fn rejects_computed_member() {
        let config = presets::relaxed();
        let (ok, _) = check("z.string()['min'](3)", &config);
        assert!(!ok);
    }

    #[test]
    fn rejects_disallowed_method() {
        let config = presets::relaxed();
        let (ok, _) = check("z.string().__proto__()", &config);
        assert!(!ok);
    }

    #[test]
    fn chain_depth_cap_trips() {
        let mut config = presets::relaxed();
        config.max_chain_depth = 2;
        let (expr, source_map) = parse_expr("z.string().min(1).max(2).trim()");
        let mut sess = Session::new(&config, source_map);
        assert!(!validate_chain(&expr, 0, &mut sess));
    }
}
