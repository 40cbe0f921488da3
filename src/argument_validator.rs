//! Argument Validator - arity and shape checks for a method call's argument
//! list, plus the function-body safety predicate used by `refine`/`transform`
//! callbacks.

use swc_common::Spanned;
use swc_ecma_ast::{
    ArrowExpr, BlockStmtOrExpr, Callee, Expr, ExprOrSpread, Function, Lit, MemberProp, Stmt,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::allowlist::ArgRule;
use crate::chain_validator;
use crate::governor::DepthKind;
use crate::object_validator;
use crate::regex_safety;
use crate::session::Session;

/// Validates the arguments of a call to `method_name`, governed by `rule`.
pub fn validate_arguments(
    method_name: &str,
    rule: &ArgRule,
    args: &[ExprOrSpread],
    depth: u32,
    sess: &mut Session,
) -> bool {
    if sess.governor.check_timeout_aggressive().is_err() {
        sess.report_error(
            args.first().map(|a| a.span()).unwrap_or_default(),
            "Validation timed out",
            "CallExpression",
        );
        return false;
    }

    if sess.governor.track_depth(depth, DepthKind::Argument).is_err() {
        sess.report_error(
            args.first().map(|a| a.span()).unwrap_or_default(),
            format!(
                "Argument nesting exceeds maximum depth of {}",
                sess.config.max_argument_nesting
            ),
            "CallExpression",
        );
        return false;
    }

    if args.iter().any(|a| a.spread.is_some()) {
        sess.report_error(
            args.first().map(|a| a.span()).unwrap_or_default(),
            format!("Spread arguments are not allowed in call to '{}'", method_name),
            "CallExpression",
        );
        return false;
    }

    if args.len() < rule.min || args.len() > rule.max {
        sess.report_error(
            args.first().map(|a| a.span()).unwrap_or_default(),
            format!(
                "'{}' expects between {} and {} arguments, found {}",
                method_name,
                rule.min,
                rule.max,
                args.len()
            ),
            "CallExpression",
        );
        return false;
    }

    for (index, arg) in args.iter().enumerate() {
        let is_primary = index == 0;
        let ok = if is_primary && rule.allow_function {
            validate_function_argument(&arg.expr, rule, sess)
        } else if rule.allow_schema && is_primary {
            chain_validator::validate_chain(&arg.expr, depth + 1, sess)
        } else if rule.validate_regex && is_primary {
            validate_regex_argument(&arg.expr, sess)
        } else {
            validate_standalone_literal(&arg.expr, sess)
        };

        if !ok {
            return false;
        }
    }

    if sess.governor.check_timeout().is_err() {
        sess.report_error(
            args.first().map(|a| a.span()).unwrap_or_default(),
            "Validation timed out",
            "CallExpression",
        );
        return false;
    }

    true
}

fn validate_function_argument(expr: &Expr, rule: &ArgRule, sess: &mut Session) -> bool {
    match expr {
        Expr::Arrow(arrow) => {
            if !rule.validate_function {
                return true;
            }
            validate_arrow_safety(arrow, sess)
        }
        Expr::Fn(fn_expr) => {
            if !rule.validate_function {
                return true;
            }
            validate_function_safety(&fn_expr.function, sess)
        }
        Expr::Ident(_) => {
            sess.report_error(expr.span(), "A named function reference is not an inline callback", "Identifier");
            false
        }
        _ => {
            sess.report_error(expr.span(), "Expected an inline function argument", "Expression");
            false
        }
    }
}

fn validate_regex_argument(expr: &Expr, sess: &mut Session) -> bool {
    match expr {
        Expr::Lit(Lit::Regex(regex_lit)) => {
            if regex_safety::is_safe_regex(&regex_lit.exp) {
                true
            } else {
                sess.report_error(
                    regex_lit.span,
                    format!("Pattern '{}' is not safe: it may be vulnerable to catastrophic backtracking", regex_lit.exp),
                    "RegExpLiteral",
                );
                false
            }
        }
        _ => {
            sess.report_error(expr.span(), "Expected a regular expression literal", "Expression");
            false
        }
    }
}

/// Validates any argument that is not a recognized function/schema/regex
/// shape for its position: literals pass, nested object literals recurse,
/// nested schema chains recurse, everything else is rejected.
pub fn validate_standalone_literal(expr: &Expr, sess: &mut Session) -> bool {
    match expr {
        Expr::Lit(lit) => validate_literal(lit, sess),
        Expr::Object(obj) => object_validator::validate_object(obj, 0, sess),
        Expr::Array(array) => {
            if sess
                .governor
                .validate_size(array.elems.len(), sess.config.max_properties_per_object, "array")
                .is_err()
            {
                sess.report_error(
                    array.span,
                    format!(
                        "Array literal exceeds maximum size of {}",
                        sess.config.max_properties_per_object
                    ),
                    "ArrayExpression",
                );
                return false;
            }
            array
                .elems
                .iter()
                .flatten()
                .all(|elem| validate_standalone_literal(&elem.expr, sess))
        }
        Expr::Call(_) => chain_validator::validate_chain(expr, 0, sess),
        Expr::Ident(_) => true,
        Expr::Unary(unary) => validate_standalone_literal(&unary.arg, sess),
        other => {
            sess.report_error(other.span(), "Unsupported argument expression", "Expression");
            false
        }
    }
}

fn validate_literal(lit: &Lit, sess: &mut Session) -> bool {
    if let Lit::Str(s) = lit {
        if s.value.len() > sess.config.max_string_length {
            sess.report_error(
                s.span,
                format!(
                    "String literal exceeds maximum length of {}",
                    sess.config.max_string_length
                ),
                "StringLiteral",
            );
            return false;
        }
    }
    true
}

fn validate_arrow_safety(arrow: &ArrowExpr, sess: &mut Session) -> bool {
    if arrow.is_async || arrow.is_generator {
        sess.report_error(arrow.span, "Async and generator callbacks are not allowed", "ArrowFunctionExpression");
        return false;
    }

    let mut collector = UnsafeConstructCollector::new(sess.config.allow_loops, sess.config.allow_template_exprs);
    match arrow.body.as_ref() {
        BlockStmtOrExpr::BlockStmt(block) => block.visit_with(&mut collector),
        BlockStmtOrExpr::Expr(expr) => expr.visit_with(&mut collector),
    }

    report_unsafe_constructs(collector, sess)
}

fn validate_function_safety(function: &Function, sess: &mut Session) -> bool {
    if function.is_async || function.is_generator {
        sess.report_error(function.span, "Async and generator callbacks are not allowed", "FunctionExpression");
        return false;
    }

    let mut collector = UnsafeConstructCollector::new(sess.config.allow_loops, sess.config.allow_template_exprs);
    if let Some(body) = &function.body {
        body.visit_with(&mut collector);
    }

    report_unsafe_constructs(collector, sess)
}

fn report_unsafe_constructs(collector: UnsafeConstructCollector, sess: &mut Session) -> bool {
    if let Some(span) = collector.violation {
        sess.report_error(span, collector.violation_message, "FunctionExpression");
        false
    } else {
        true
    }
}

/// Walks a callback body looking for constructs disallowed by the function
/// safety predicate: `await`/`yield`/`throw`, assignment expressions, calls
/// to anything other than a recognized schema chain or built-in, and
/// (unless permitted by config) loops or template expressions.
struct UnsafeConstructCollector {
    allow_loops: bool,
    allow_template_exprs: bool,
    violation: Option<swc_common::Span>,
    violation_message: String,
}

impl UnsafeConstructCollector {
    fn new(allow_loops: bool, allow_template_exprs: bool) -> Self {
        Self {
            allow_loops,
            allow_template_exprs,
            violation: None,
            violation_message: String::new(),
        }
    }

    fn flag(&mut self, span: swc_common::Span, message: &str) {
        if self.violation.is_none() {
            self.violation = Some(span);
            self.violation_message = message.to_string();
        }
    }
}

impl Visit for UnsafeConstructCollector {
    fn visit_await_expr(&mut self, node: &swc_ecma_ast::AwaitExpr) {
        self.flag(node.span, "'await' is not allowed inside a schema callback");
        node.visit_children_with(self);
    }

    fn visit_yield_expr(&mut self, node: &swc_ecma_ast::YieldExpr) {
        self.flag(node.span, "'yield' is not allowed inside a schema callback");
        node.visit_children_with(self);
    }

    fn visit_throw_stmt(&mut self, node: &swc_ecma_ast::ThrowStmt) {
        self.flag(node.span, "'throw' is not allowed inside a schema callback");
        node.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, node: &swc_ecma_ast::AssignExpr) {
        self.flag(node.span, "Assignment is not allowed inside a schema callback");
        node.visit_children_with(self);
    }

    fn visit_stmt(&mut self, node: &Stmt) {
        if !self.allow_loops {
            let loop_span = match node {
                Stmt::While(s) => Some(s.span),
                Stmt::DoWhile(s) => Some(s.span),
                Stmt::For(s) => Some(s.span),
                Stmt::ForIn(s) => Some(s.span),
                Stmt::ForOf(s) => Some(s.span),
                _ => None,
            };
            if let Some(span) = loop_span {
                self.flag(span, "Loops are not allowed inside a schema callback");
            }
        }
        node.visit_children_with(self);
    }

    fn visit_tpl(&mut self, node: &swc_ecma_ast::Tpl) {
        if !self.allow_template_exprs && !node.exprs.is_empty() {
            self.flag(node.span, "Template expressions are not allowed inside a schema callback");
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &swc_ecma_ast::CallExpr) {
        if let Callee::Expr(callee) = &node.callee {
            let is_recognized = match callee.as_ref() {
                Expr::Ident(ident) => ident.sym.as_ref() == "z",
                Expr::Member(member) => matches!(member.prop, MemberProp::Ident(_)),
                _ => false,
            };
            if !is_recognized {
                self.flag(node.span, "Calls inside a schema callback must target a recognized schema method");
            }
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::test_support::parse_expr;

    fn check(src: &str, config: &crate::config::Config) -> bool {
        let (expr, source_map) = parse_expr(src);
        let mut sess = Session::new(config, source_map);
        match &expr {
            Expr::Call(call) => {
                if let Callee::Expr(callee) = &call.callee {
                    if let Expr::Member(member) = callee.as_ref() {
                        if let MemberProp::Ident(ident) = &member.prop {
                            let name = ident.sym.to_string();
                            if let Some(rule) = crate::allowlist::ARG_RULES.get(name.as_str()) {
                                return validate_arguments(&name, rule, &call.args, 0, &mut sess);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        panic!("expected a recognized method call with an argument rule")
    }

    #[test]
    fn refine_accepts_pure_predicate() {
        let config = presets::relaxed();
        assert!(check("z.string().refine(x => x.length > 0)", &config));
    }

    #[test]
    fn refine_rejects_await() {
        let config = presets::relaxed();
        assert!(!check("z.string().refine(async x => await check(x))", &config));
    }

    #[test]
    fn refine_rejects_assignment() {
        let config = presets::relaxed();
        assert!(!check("z.string().refine(x => (y = x))", &config));
    }

    #[test]
    fn regex_rule_rejects_catastrophic_pattern() {
        let config = presets::relaxed();
        assert!(!check("z.string().regex(/(a+)+/)", &config));
    }

    #[test]
    fn regex_rule_accepts_ordinary_pattern() {
        let config = presets::relaxed();
        assert!(check("z.string().regex(/^[a-z]+$/)", &config));
    }

    #[test]
    fn oversized_array_argument_is_rejected() {
        let mut config = presets::relaxed();
        config.max_properties_per_object = 2;
        let (expr, source_map) = parse_expr("[1, 2, 3]");
        let mut sess = Session::new(&config, source_map);
        assert!(!validate_standalone_literal(&expr, &mut sess));
        assert!(sess.issues.issues()[0].message.contains("exceeds maximum size"));
    }
}
