//! Printer - renders a cleaned AST back to source text. Wraps
//! `swc_ecma_codegen`'s emitter, which only knows how to print whole
//! modules; a lone expression is printed by wrapping it in a throwaway
//! single-statement module and trimming the trailing semicolon it adds.

use std::sync::Arc;

use swc_common::comments::{Comments, SingleThreadedComments};
use swc_common::{SourceMap, Spanned};
use swc_ecma_ast::{Expr, ExprStmt, Module, ModuleItem, Stmt};
use swc_ecma_codegen::{text_writer::JsWriter, Config as CodegenConfig, Emitter};

pub fn print_module(
    module: &Module,
    source_map: &Arc<SourceMap>,
    comments: Option<&SingleThreadedComments>,
) -> Result<String, String> {
    let mut buf = Vec::new();
    {
        let writer = JsWriter::new(source_map.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: CodegenConfig::default(),
            cm: source_map.clone(),
            comments: comments.map(|c| c as &dyn Comments),
            wr: writer,
        };
        emitter
            .emit_module(module)
            .map_err(|err| format!("failed to print module: {}", err))?;
    }
    String::from_utf8(buf).map_err(|err| format!("printer produced invalid UTF-8: {}", err))
}

pub fn print_expr(expr: &Expr, source_map: &Arc<SourceMap>) -> Result<String, String> {
    let wrapper = Module {
        span: expr.span(),
        body: vec![ModuleItem::Stmt(Stmt::Expr(ExprStmt {
            span: expr.span(),
            expr: Box::new(expr.clone()),
        }))],
        shebang: None,
    };
    let printed = print_module(&wrapper, source_map, None)?;
    Ok(printed.trim_end().trim_end_matches(';').to_string())
}
