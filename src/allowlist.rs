//! Allow-lists and argument rules for the schema-construction grammar.
//!
//! Two immutable sets of method names gate what the Chain Validator will
//! recognize: names reachable as `z.<name>(...)` (constructors) and names
//! reachable as `<schema>.<name>(...)` (chain methods). A handful of names
//! appear in both; `object` is the clearest example, usable either as the
//! root constructor or, via `.merge`/`.extend`-like helpers, as a method.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

pub static CONSTRUCTORS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "string", "number", "boolean", "bigint", "date", "symbol", "undefined", "null", "void",
        "any", "unknown", "never", "array", "object", "union", "discriminatedUnion", "tuple",
        "record", "map", "set", "function", "lazy", "enum", "nativeEnum", "literal", "promise",
        "instanceof", "custom", "nan", "intersection",
    ]
    .into_iter()
    .collect()
});

pub static CHAIN_METHODS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "optional", "nullable", "nullish", "default", "catch", "describe", "brand", "readonly",
        "refine", "superRefine", "transform", "pipe", "extend", "merge", "pick", "omit",
        "partial", "deepPartial", "required", "passthrough", "strict", "strip", "shape",
        "keyof", "element", "min", "max", "length", "int", "positive", "negative", "nonnegative",
        "nonpositive", "gte", "lte", "gt", "lt", "multipleOf", "step", "finite", "safe", "trim",
        "toLowerCase", "toUpperCase", "email", "url", "uuid", "cuid", "cuid2", "ulid", "regex",
        "includes", "startsWith", "endsWith", "datetime", "ip", "emoji", "nanoid", "nonempty",
        "array", "object",
    ]
    .into_iter()
    .collect()
});

pub fn is_allowed_method(name: &str) -> bool {
    CONSTRUCTORS.contains(name) || CHAIN_METHODS.contains(name)
}

/// Per-method argument rules consulted by the Argument Validator. A method
/// absent from this table accepts any arguments - the Chain Validator still
/// gates the method name itself.
#[derive(Debug, Clone, Copy)]
pub struct ArgRule {
    pub min: usize,
    pub max: usize,
    pub allow_function: bool,
    pub allow_schema: bool,
    pub validate_function: bool,
    pub validate_regex: bool,
}

impl ArgRule {
    const fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            allow_function: false,
            allow_schema: false,
            validate_function: false,
            validate_regex: false,
        }
    }

    const fn allow_function(mut self) -> Self {
        self.allow_function = true;
        self
    }

    const fn allow_schema(mut self) -> Self {
        self.allow_schema = true;
        self
    }

    const fn validate_function(mut self) -> Self {
        self.validate_function = true;
        self
    }

    const fn validate_regex(mut self) -> Self {
        self.validate_regex = true;
        self
    }
}

pub static ARG_RULES: LazyLock<HashMap<&'static str, ArgRule>> = LazyLock::new(|| {
    HashMap::from([
        (
            "refine",
            ArgRule::new(1, 2).allow_function().validate_function(),
        ),
        (
            "transform",
            ArgRule::new(1, 1).allow_function().validate_function(),
        ),
        ("pipe", ArgRule::new(1, 1).allow_schema()),
        ("regex", ArgRule::new(1, 2).validate_regex()),
        ("object", ArgRule::new(1, 1)),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_methods_are_allowed() {
        assert!(is_allowed_method("string"));
        assert!(is_allowed_method("object"));
        assert!(is_allowed_method("refine"));
        assert!(!is_allowed_method("constructor"));
        assert!(!is_allowed_method("__proto__"));
    }

    #[test]
    fn object_appears_in_both_lists() {
        assert!(CONSTRUCTORS.contains("object"));
        assert!(CHAIN_METHODS.contains("object"));
    }

    #[test]
    fn refine_rule_requires_a_function() {
        let rule = ARG_RULES.get("refine").unwrap();
        assert_eq!(rule.min, 1);
        assert_eq!(rule.max, 2);
        assert!(rule.allow_function);
        assert!(rule.validate_function);
    }

    #[test]
    fn unknown_method_has_no_rule() {
        assert!(ARG_RULES.get("min").is_none());
    }
}
