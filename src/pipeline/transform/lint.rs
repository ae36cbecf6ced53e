//! Script linting with oxc.
//!
//! Syntax and scoping errors are always reported; rule violations
//! (`debugger`, `with`) are warnings. Nothing fails the step unless
//! `strict` is set, matching a lint pass that only formats its findings.

use std::fmt;

use anyhow::{Result, bail};
use oxc::allocator::Allocator;
use oxc::ast::AstKind;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::{GetSpan, SourceType};

use crate::log;
use crate::pipeline::{Asset, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One finding, positioned by 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}:{} {}: {}", self.line, self.column, label, self.message)
    }
}

/// Lint a script source.
pub fn check(source: &str) -> Vec<Diagnostic> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

    let mut found: Vec<Diagnostic> = parsed
        .errors
        .iter()
        .map(|e| diagnostic(source, first_offset(e), Severity::Error, e.to_string()))
        .collect();
    if parsed.panicked {
        return found;
    }

    let semantic = SemanticBuilder::new()
        .with_check_syntax_error(true)
        .build(&parsed.program);
    found.extend(
        semantic
            .errors
            .iter()
            .map(|e| diagnostic(source, first_offset(e), Severity::Error, e.to_string())),
    );

    for node in semantic.semantic.nodes().iter() {
        let message = match node.kind() {
            AstKind::DebuggerStatement(_) => "unexpected `debugger` statement",
            AstKind::WithStatement(_) => "unexpected `with` statement",
            _ => continue,
        };
        let offset = node.kind().span().start as usize;
        found.push(diagnostic(source, offset, Severity::Warning, message.into()));
    }

    found.sort_by_key(|d| (d.line, d.column));
    found
}

fn first_offset(error: &oxc::diagnostics::OxcDiagnostic) -> usize {
    error
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map(|label| label.offset())
        .unwrap_or(0)
}

fn diagnostic(source: &str, offset: usize, severity: Severity, message: String) -> Diagnostic {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
    Diagnostic {
        severity,
        line,
        column,
        message,
    }
}

/// Pass-through stage that reports diagnostics.
pub struct Lint {
    strict: bool,
}

impl Lint {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }
}

impl Transform for Lint {
    fn name(&self) -> &str {
        "lint"
    }

    fn apply(&self, asset: Asset) -> Result<Option<Asset>> {
        let found = check(asset.text()?);
        if found.is_empty() {
            return Ok(Some(asset));
        }

        let report = found
            .iter()
            .map(|d| format!("{}:{}", asset.path.display(), d))
            .collect::<Vec<_>>()
            .join("\n");
        if self.strict {
            bail!("{} problem(s)\n{}", found.len(), report);
        }
        log!("lint"; "{}", report);
        Ok(Some(asset))
    }
}
