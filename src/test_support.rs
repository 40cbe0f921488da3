//! Shared test-only parsing helpers. Not part of the public API.

#![cfg(test)]

use std::sync::Arc;

use swc_common::{input::StringInput, SourceMap};
use swc_ecma_ast::Expr;
use swc_ecma_parser::{lexer::Lexer, Parser, Syntax, TsSyntax};

/// Parse a single expression from `src` (which should itself already be a
/// valid expression, e.g. wrapped in parens if it's an object literal) and
/// return the owned `Expr` along with the `SourceMap` its spans are relative
/// to (needed by `Session::new` so span-to-line/column lookups succeed).
pub fn parse_expr(src: &str) -> (Expr, Arc<SourceMap>) {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        swc_common::FileName::Custom("test.ts".into()).into(),
        src.to_string(),
    );
    let lexer = Lexer::new(
        Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);
    let mut expr = parser.parse_expr().expect("valid test expression");
    while let Expr::Paren(paren) = *expr {
        expr = paren.expr;
    }
    (*expr, cm)
}

/// Parse a full module body from `src`.
pub fn parse_module(src: &str) -> (swc_ecma_ast::Module, Arc<SourceMap>) {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        swc_common::FileName::Custom("test.ts".into()).into(),
        src.to_string(),
    );
    let lexer = Lexer::new(
        Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);
    let module = parser.parse_module().expect("valid test module");
    (module, cm)
}
