//! Schema Orchestrator - the top-level entry point. Parses source text,
//! checks for the required `zod` import, classifies and removes
//! non-conforming top-level statements, auto-exports what survives, prints
//! the cleaned tree, and optionally computes schema groups.

use std::sync::Arc;

use serde::Serialize;
use swc_common::comments::SingleThreadedComments;
use swc_common::{input::StringInput, FileName, SourceMap, Spanned};
use swc_ecma_ast::{
    Callee, Decl, ExportDecl, Expr, ImportDecl, ImportSpecifier, Module, ModuleDecl, ModuleItem,
    Stmt, VarDecl, VarDeclKind,
};
use swc_ecma_parser::{lexer::Lexer, Parser, Syntax, TsSyntax};

use crate::chain_validator;
use crate::config::Config;
use crate::dependency_analyzer::{self, SchemaGroup};
use crate::issues::{Issue, IssueReporter, Severity};
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub cleaned_code: String,
    pub issues: Vec<Issue>,
    pub root_schema_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_groups: Option<Vec<SchemaGroupOut>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGroupOut {
    pub schema_names: Vec<String>,
    pub code: String,
    pub schema_count: usize,
    pub total_lines: usize,
    pub complexity: f64,
}

impl From<SchemaGroup> for SchemaGroupOut {
    fn from(group: SchemaGroup) -> Self {
        Self {
            schema_names: group.schema_names,
            code: group.code,
            schema_count: group.metrics.schema_count,
            total_lines: group.metrics.total_lines,
            complexity: group.metrics.complexity,
        }
    }
}

pub(crate) fn parse_source(
    source: &str,
) -> Result<(Module, Arc<SourceMap>, SingleThreadedComments), String> {
    let source_map: Arc<SourceMap> = Default::default();
    let file = source_map.new_source_file(
        FileName::Custom("schema.ts".into()).into(),
        source.to_string(),
    );
    let comments = SingleThreadedComments::default();
    let lexer = Lexer::new(
        Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        Default::default(),
        StringInput::from(&*file),
        Some(&comments),
    );
    let mut parser = Parser::new_from(lexer);
    let module = parser
        .parse_module()
        .map_err(|err| format!("{:?}", err))?;
    Ok((module, source_map, comments))
}

fn has_zod_z_import(module: &Module) -> bool {
    module.body.iter().any(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
            import.src.value.as_wtf8() == "zod"
                && import.specifiers.iter().any(|spec| match spec {
                    ImportSpecifier::Default(default) => default.local.sym.as_ref() == "z",
                    ImportSpecifier::Named(named) => named.local.sym.as_ref() == "z",
                    ImportSpecifier::Namespace(_) => false,
                })
        }
        _ => false,
    })
}

fn leftmost_ident(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.as_ref()),
        Expr::Member(member) => leftmost_ident(&member.obj),
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => leftmost_ident(callee),
            _ => None,
        },
        _ => None,
    }
}

fn looks_like_schema(name: &str, init: &Expr) -> bool {
    name.to_lowercase().contains("schema") || leftmost_ident(init) == Some("z")
}

enum Classification {
    Keep,
    Remove,
    RemoveWithError { message: String, node_kind: &'static str },
}

/// Decides what to do with one top-level item, per the declaration
/// classification rules. Validation side effects (issues, root schema
/// names) are applied directly to `sess`/`root_names` as a side effect of
/// classifying a variable declaration; the return value only says whether
/// to keep or drop the statement from the tree.
fn classify_item(item: &ModuleItem, sess: &mut Session, root_names: &mut Vec<String>) -> Classification {
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => classify_import(import),
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
            Decl::Var(var_decl) => classify_var_decl(var_decl, sess, root_names),
            _ => Classification::RemoveWithError {
                message: "Invalid statement type: ExportDecl(non-variable)".to_string(),
                node_kind: "ExportDecl",
            },
        },
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(_)) => Classification::Keep,
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(var_decl))) => classify_var_decl(var_decl, sess, root_names),
        other => Classification::RemoveWithError {
            message: format!("Invalid statement type: {}", statement_kind_name(other)),
            node_kind: "Statement",
        },
    }
}

fn statement_kind_name(item: &ModuleItem) -> &'static str {
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::ExportAll(_)) => "ExportAll",
        ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(_)) => "ExportNamed",
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(_)) => "ExportDefaultDecl",
        ModuleItem::ModuleDecl(ModuleDecl::TsImportEquals(_)) => "TsImportEquals",
        ModuleItem::ModuleDecl(ModuleDecl::TsExportAssignment(_)) => "TsExportAssignment",
        ModuleItem::ModuleDecl(ModuleDecl::TsNamespaceExport(_)) => "TsNamespaceExport",
        ModuleItem::Stmt(_) => "Statement",
        _ => "Unknown",
    }
}

fn classify_import(import: &ImportDecl) -> Classification {
    if import.src.value.as_wtf8() == "zod" {
        Classification::Keep
    } else {
        Classification::RemoveWithError {
            message: format!(
                "Invalid import from '{}'. Only 'zod' imports are allowed",
                import.src.value.to_string_lossy()
            ),
            node_kind: "ImportDeclaration",
        }
    }
}

fn classify_var_decl(var_decl: &VarDecl, sess: &mut Session, root_names: &mut Vec<String>) -> Classification {
    if var_decl.kind != VarDeclKind::Const {
        return Classification::RemoveWithError {
            message: "Schema declarations must use 'const'".to_string(),
            node_kind: "VariableDeclaration",
        };
    }

    let mut any_invalid = false;
    let mut any_schema_shaped = false;
    let mut candidate_names = Vec::new();

    for declarator in &var_decl.decls {
        let name = match &declarator.name {
            swc_ecma_ast::Pat::Ident(binding) => binding.id.sym.to_string(),
            _ => continue,
        };

        let init = match &declarator.init {
            Some(init) => init.as_ref(),
            None => {
                sess.report_error(declarator.span, "Schema declaration must have an initializer", "VariableDeclarator");
                any_invalid = true;
                continue;
            }
        };

        if matches!(init, Expr::Ident(ident) if ident.sym.as_ref() == "undefined") {
            sess.report_error(declarator.span, "Schema declaration must have an initializer", "VariableDeclarator");
            any_invalid = true;
            continue;
        }

        if !looks_like_schema(&name, init) {
            continue;
        }
        any_schema_shaped = true;

        if chain_validator::validate_chain(init, 0, sess) {
            candidate_names.push(name);
        } else {
            any_invalid = true;
        }
    }

    if any_invalid {
        Classification::Remove
    } else if any_schema_shaped {
        root_names.extend(candidate_names);
        Classification::Keep
    } else {
        // No declarator looked schema-shaped: silent removal, no error.
        Classification::Remove
    }
}

fn wrap_as_named_export(item: ModuleItem) -> ModuleItem {
    match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(var_decl))) => {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
                span: var_decl.span,
                decl: Decl::Var(var_decl),
            }))
        }
        other => other,
    }
}

/// Runs the full pipeline over `source` under `config`.
pub fn validate_schema(source: &str, config: &Config) -> ValidationResult {
    let (module, source_map, comments) = match parse_source(source) {
        Ok(triple) => triple,
        Err(reason) => {
            let mut issues = IssueReporter::new();
            issues.push(Issue::file_level(
                format!("Failed to parse schema: {}", reason),
                Severity::Error,
            ));
            return ValidationResult {
                is_valid: false,
                cleaned_code: String::new(),
                issues: issues.issues().to_vec(),
                root_schema_names: Vec::new(),
                schema_groups: None,
            };
        }
    };

    let mut sess = Session::new(config, source_map.clone());

    if !has_zod_z_import(&module) {
        sess.report_file("Missing 'z' import from 'zod'");
    }

    let mut root_names = Vec::new();
    let mut kept_items = Vec::new();

    for item in &module.body {
        match classify_item(item, &mut sess, &mut root_names) {
            Classification::Keep => kept_items.push(wrap_as_named_export(item.clone())),
            Classification::Remove => {}
            Classification::RemoveWithError { message, node_kind } => {
                sess.report_error(item.span(), message, node_kind);
            }
        }
    }

    let is_valid = !sess.issues.has_errors();

    let cleaned_code = if root_names.is_empty() {
        String::new()
    } else {
        let cleaned_module = Module {
            span: module.span,
            body: kept_items,
            shebang: module.shebang.clone(),
        };
        match crate::printer::print_module(&cleaned_module, &source_map, Some(&comments)) {
            Ok(code) => code,
            Err(reason) => {
                sess.report_file(format!("Failed to print cleaned schema: {}", reason));
                String::new()
            }
        }
    };

    let schema_groups = if config.schema_unification.enabled && !cleaned_code.is_empty() {
        let groups = dependency_analyzer::compute_groups_from_source(&cleaned_code, config, &mut sess.issues);
        Some(groups.into_iter().map(SchemaGroupOut::from).collect())
    } else {
        None
    };

    ValidationResult {
        is_valid: is_valid && !sess.issues.has_errors(),
        cleaned_code,
        issues: sess.issues.issues().to_vec(),
        root_schema_names: root_names,
        schema_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;

    const PREAMBLE: &str = "import { z } from 'zod';\n";

    fn source(body: &str) -> String {
        format!("{}{}", PREAMBLE, body)
    }

    #[test]
    fn accepts_a_well_formed_schema() {
        let config = presets::relaxed();
        let result = validate_schema(&source("export const userSchema = z.object({ name: z.string() });"), &config);
        assert!(result.is_valid);
        assert_eq!(result.root_schema_names, vec!["userSchema"]);
        assert!(result.cleaned_code.contains("export const userSchema"));
    }

    #[test]
    fn missing_zod_import_is_an_error() {
        let config = presets::relaxed();
        let result = validate_schema("export const userSchema = z.string();", &config);
        assert!(!result.is_valid);
        assert!(result.issues.iter().any(|i| i.message.contains("Missing 'z' import")));
    }

    #[test]
    fn denied_property_name_warns_but_stays_valid() {
        let config = presets::relaxed();
        let result = validate_schema(&source("export const userSchema = z.object({ constructor: z.string() });"), &config);
        assert!(result.is_valid, "a denylisted property name is a warning, not an error");
        assert!(result.issues.iter().any(|i| i.message.contains("constructor")));
    }

    #[test]
    fn computed_property_is_rejected() {
        let config = presets::relaxed();
        let mut strict = config.clone();
        strict.allow_computed_properties = false;
        let result = validate_schema(&source("export const userSchema = z.object({ [key]: z.string() });"), &strict);
        assert!(!result.is_valid);
        assert_eq!(result.root_schema_names.len(), 0);
    }

    #[test]
    fn chain_depth_cap_invalidates_declaration() {
        let mut config = presets::relaxed();
        config.max_chain_depth = 2;
        let result = validate_schema(&source("export const userSchema = z.string().min(1).max(2).trim();"), &config);
        assert!(!result.is_valid);
    }

    #[test]
    fn unsafe_regex_invalidates_declaration() {
        let config = presets::relaxed();
        let result = validate_schema(&source("export const userSchema = z.string().regex(/(a+)+/);"), &config);
        assert!(!result.is_valid);
    }

    #[test]
    fn non_const_declaration_is_removed() {
        let config = presets::relaxed();
        let result = validate_schema(&source("export let userSchema = z.string();"), &config);
        assert_eq!(result.root_schema_names.len(), 0);
        assert!(result.cleaned_code.is_empty());
    }

    #[test]
    fn non_schema_shaped_declarator_is_silently_dropped() {
        let config = presets::relaxed();
        let result = validate_schema(&source("export const helperCount = 3;"), &config);
        assert!(result.is_valid);
        assert!(result.issues.is_empty());
        assert!(result.cleaned_code.is_empty());
    }

    #[test]
    fn schema_grouping_inlines_dependencies() {
        let mut config = presets::relaxed();
        config.schema_unification.enabled = true;
        let result = validate_schema(
            &source("export const idSchema = z.string(); export const userSchema = z.object({ id: idSchema });"),
            &config,
        );
        assert!(result.is_valid);
        let groups = result.schema_groups.expect("grouping enabled");
        assert_eq!(groups.len(), 1);
        assert!(groups[0].code.contains("z.string()"));
    }

    #[test]
    fn top_level_array_schema_is_unwrapped_when_configured() {
        let mut config = presets::relaxed();
        config.schema_unification.enabled = true;
        config.schema_unification.unwrap_array_root = true;
        let result = validate_schema(&source("export const listSchema = z.array(z.string());"), &config);
        let groups = result.schema_groups.expect("grouping enabled");
        assert_eq!(groups[0].code, "z.string()");
    }

    #[test]
    fn nested_array_schema_is_only_unwrapped_at_the_outer_level() {
        let mut config = presets::relaxed();
        config.schema_unification.enabled = true;
        config.schema_unification.unwrap_array_root = true;
        let result = validate_schema(
            &source("export const gridSchema = z.array(z.array(z.string()));"),
            &config,
        );
        let groups = result.schema_groups.expect("grouping enabled");
        assert_eq!(groups[0].code, "z.array(z.string())");
    }

    #[test]
    fn invalid_declarator_removes_whole_statement() {
        let config = presets::relaxed();
        let result = validate_schema(
            &source("export const userSchema = z.string(), brokenSchema = z.bogusMethod();"),
            &config,
        );
        assert_eq!(result.root_schema_names.len(), 0);
        assert!(!result.is_valid);
    }
}
