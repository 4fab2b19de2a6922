//! Parsed expression with cached free variables.

use std::collections::HashMap;

use tracing::trace;

use crate::ast::Expr;
use crate::error::ParseResult;
use crate::parser::parse;
use crate::printer::unparse;
use crate::scope::visit_free_reads;

/// An expression parsed once and queried many times.
#[derive(Debug, Clone, PartialEq)]
pub struct Analyzer {
    source: String,
    tree: Expr,
    free: Vec<String>,
}

impl Analyzer {
    pub fn parse(source: &str) -> ParseResult<Self> {
        let mut tree = parse(source)?;
        let mut free: Vec<String> = Vec::new();
        visit_free_reads(&mut tree, |name| {
            if !free.iter().any(|seen| seen == name) {
                free.push(name.clone());
            }
        });
        trace!(source, ?free, "analyzed expression");
        Ok(Self {
            source: source.to_string(),
            tree,
            free,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Expr {
        &self.tree
    }

    /// Free variables, deduplicated, in first-use order.
    pub fn free_variables(&self) -> &[String] {
        &self.free
    }

    /// Canonical text with free reads renamed through `mapping`.
    ///
    /// Names missing from `mapping` are kept as they are.
    pub fn substitute(&self, mapping: &HashMap<String, String>) -> String {
        if mapping.is_empty() {
            return self.canonical();
        }
        let mut tree = self.tree.clone();
        visit_free_reads(&mut tree, |name| {
            if let Some(replacement) = mapping.get(name.as_str()) {
                *name = replacement.clone();
            }
        });
        unparse(&tree)
    }

    pub fn canonical(&self) -> String {
        unparse(&self.tree)
    }
}

/// Free variables of `source` in first-use order.
pub fn free_variables(source: &str) -> ParseResult<Vec<String>> {
    Ok(Analyzer::parse(source)?.free)
}

/// Rename the free reads of `source` and print the result canonically.
pub fn substitute(source: &str, mapping: &HashMap<String, String>) -> ParseResult<String> {
    Ok(Analyzer::parse(source)?.substitute(mapping))
}
