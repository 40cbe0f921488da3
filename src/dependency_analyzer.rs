//! Dependency Analyzer - finds connected components among top-level schema
//! declarations and renders each component as one self-contained,
//! dependency-inlined source fragment.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use swc_common::SourceMap;
use swc_ecma_ast::{Callee, Expr, Ident, MemberProp, Module, VarDeclarator};
use swc_ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use crate::config::Config;
use crate::issues::IssueReporter;
use crate::printer;

#[derive(Debug, Clone, Default)]
pub struct GroupMetrics {
    pub schema_count: usize,
    pub total_lines: usize,
    pub complexity: f64,
}

#[derive(Debug, Clone)]
pub struct SchemaGroup {
    pub schema_names: Vec<String>,
    pub code: String,
    pub metrics: GroupMetrics,
}

struct SchemaInfo {
    name: String,
    init: Expr,
}

/// Collects every variable declarator at any depth whose initializer is
/// present, keyed by declarator name. Later declarators with a name already
/// seen overwrite the earlier entry, matching source-order precedence.
struct DeclaratorCollector {
    found: Vec<SchemaInfo>,
}

impl Visit for DeclaratorCollector {
    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let (swc_ecma_ast::Pat::Ident(binding), Some(init)) = (&node.name, &node.init) {
            self.found.push(SchemaInfo {
                name: binding.id.sym.to_string(),
                init: init.as_ref().clone(),
            });
        }
        node.visit_children_with(self);
    }
}

/// Records every free identifier reached while walking an expression.
struct IdentCollector {
    names: HashSet<String>,
}

impl Visit for IdentCollector {
    fn visit_ident(&mut self, node: &Ident) {
        self.names.insert(node.sym.to_string());
    }
}

fn collect_declarators(module: &Module) -> Vec<SchemaInfo> {
    let mut collector = DeclaratorCollector { found: Vec::new() };
    module.visit_with(&mut collector);
    collector.found
}

fn referenced_names(expr: &Expr) -> HashSet<String> {
    let mut collector = IdentCollector { names: HashSet::new() };
    expr.visit_with(&mut collector);
    collector.names
}

/// Deep-copies `expr`, substituting every identifier whose name is a key in
/// `inits` with a recursively inlined copy of that name's own initializer.
/// A name re-encountered while already being expanded is a cycle: inlining
/// stops there and the cycle is recorded rather than recursing forever.
struct Inliner<'a> {
    inits: &'a HashMap<String, Expr>,
    in_progress: HashSet<String>,
    cycle: Option<String>,
}

impl VisitMut for Inliner<'_> {
    fn visit_mut_expr(&mut self, node: &mut Expr) {
        if let Expr::Ident(ident) = node {
            let name = ident.sym.to_string();
            if let Some(init) = self.inits.get(&name) {
                if self.in_progress.contains(&name) {
                    self.cycle = Some(name);
                    return;
                }
                self.in_progress.insert(name.clone());
                let mut replacement = init.clone();
                replacement.visit_mut_with(self);
                self.in_progress.remove(&name);
                *node = replacement;
                return;
            }
        }
        node.visit_mut_children_with(self);
    }
}

fn inline_root(root_name: &str, inits: &HashMap<String, Expr>) -> (Expr, Option<String>) {
    let mut expr = inits.get(root_name).cloned().expect("root name present in inits");
    let mut inliner = Inliner {
        inits,
        in_progress: HashSet::from([root_name.to_string()]),
        cycle: None,
    };
    expr.visit_mut_with(&mut inliner);
    (expr, inliner.cycle)
}

fn unwrap_array_root_once(expr: Expr) -> Expr {
    if let Expr::Call(call) = &expr {
        if call.args.len() == 1 && call.args[0].spread.is_none() {
            if let Callee::Expr(callee) = &call.callee {
                if let Expr::Member(member) = callee.as_ref() {
                    let is_z_array = matches!(member.obj.as_ref(), Expr::Ident(ident) if ident.sym.as_ref() == "z")
                        && matches!(&member.prop, MemberProp::Ident(ident) if ident.sym.as_ref() == "array");
                    if is_z_array {
                        return *call.args[0].expr.clone();
                    }
                }
            }
        }
    }
    expr
}

fn connected_components(names: &[String], forward: &HashMap<String, HashSet<String>>, reverse: &HashMap<String, HashSet<String>>) -> Vec<Vec<String>> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut components = Vec::new();

    for start in names {
        if visited.contains(start) {
            continue;
        }
        let mut stack = vec![start.clone()];
        let mut component = Vec::new();
        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            component.push(name.clone());
            if let Some(deps) = forward.get(&name) {
                for dep in deps {
                    if !visited.contains(dep) {
                        stack.push(dep.clone());
                    }
                }
            }
            if let Some(referrers) = reverse.get(&name) {
                for referrer in referrers {
                    if !visited.contains(referrer) {
                        stack.push(referrer.clone());
                    }
                }
            }
        }
        components.push(component);
    }

    components
}

fn choose_root(component: &[String], forward: &HashMap<String, HashSet<String>>, reverse: &HashMap<String, HashSet<String>>) -> String {
    component
        .iter()
        .find(|name| {
            let has_outgoing = forward.get(*name).is_some_and(|deps| !deps.is_empty());
            let has_incoming = reverse.get(*name).is_some_and(|refs| !refs.is_empty());
            has_outgoing && !has_incoming
        })
        .cloned()
        .unwrap_or_else(|| component[0].clone())
}

fn compute_metrics(code: &str, schema_count: usize) -> GroupMetrics {
    let total_lines = code.lines().count();
    let z_count = code.matches("z.").count() as f64;
    let object_count = code.matches("object(").count() as f64;
    let array_count = code.matches("array(").count() as f64;
    GroupMetrics {
        schema_count,
        total_lines,
        complexity: z_count + 2.0 * object_count + 1.5 * array_count,
    }
}

/// Runs the full analysis over the cleaned module and returns the ordered
/// list of schema groups, as described by step 6-7 of the grouping
/// algorithm. `unwrap_array_root` comes from `config.schema_unification`.
pub fn compute_schema_groups(
    module: &Module,
    source_map: &Arc<SourceMap>,
    config: &Config,
    issues: &mut IssueReporter,
) -> Vec<SchemaGroup> {
    let collected = collect_declarators(module);
    let mut inits: HashMap<String, Expr> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for info in collected {
        if !inits.contains_key(&info.name) {
            order.push(info.name.clone());
        }
        inits.insert(info.name, info.init);
    }

    let mut forward: HashMap<String, HashSet<String>> = HashMap::new();
    let mut reverse: HashMap<String, HashSet<String>> = HashMap::new();
    for name in &order {
        let refs = referenced_names(&inits[name]);
        let deps: HashSet<String> = refs
            .into_iter()
            .filter(|candidate| candidate != name && inits.contains_key(candidate))
            .collect();
        for dep in &deps {
            reverse.entry(dep.clone()).or_default().insert(name.clone());
        }
        forward.insert(name.clone(), deps);
    }

    let components = connected_components(&order, &forward, &reverse);
    let mut groups = Vec::new();

    for component in components {
        let root = choose_root(&component, &forward, &reverse);
        let (mut inlined, cycle) = inline_root(&root, &inits);
        if let Some(cyclic_name) = cycle {
            issues.push(crate::issues::Issue::file_level(
                format!("Cyclic schema reference involving '{}'", cyclic_name),
                crate::issues::Severity::Warning,
            ));
        }

        if config.schema_unification.unwrap_array_root {
            inlined = unwrap_array_root_once(inlined);
        }

        let code = match printer::print_expr(&inlined, source_map) {
            Ok(code) => code,
            Err(reason) => {
                issues.push(crate::issues::Issue::file_level(
                    format!("Schema grouping failed: {}", reason),
                    crate::issues::Severity::Warning,
                ));
                continue;
            }
        };

        let mut schema_names = vec![root.clone()];
        schema_names.extend(component.iter().filter(|name| *name != &root).cloned());

        let metrics = compute_metrics(&code, component.len());
        groups.push(SchemaGroup {
            schema_names,
            code,
            metrics,
        });
    }

    groups.sort_by(|a, b| {
        b.metrics
            .schema_count
            .cmp(&a.metrics.schema_count)
            .then_with(|| b.metrics.complexity.partial_cmp(&a.metrics.complexity).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| b.metrics.total_lines.cmp(&a.metrics.total_lines))
    });

    groups
}

/// Convenience used by the orchestrator: re-parses `cleaned_code` and runs
/// the grouping pass over it, reusing the orchestrator's own parse helper.
pub fn compute_groups_from_source(
    cleaned_code: &str,
    config: &Config,
    issues: &mut IssueReporter,
) -> Vec<SchemaGroup> {
    match crate::orchestrator::parse_source(cleaned_code) {
        Ok((module, source_map, _comments)) => compute_schema_groups(&module, &source_map, config, issues),
        Err(reason) => {
            issues.push(crate::issues::Issue::file_level(
                format!("Schema grouping failed: {}", reason),
                crate::issues::Severity::Warning,
            ));
            Vec::new()
        }
    }
}
