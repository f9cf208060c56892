//! Caret Inspections
//!
//! Inspections walk an analysed file and report problems as
//! [`Diagnostic`]s. Each inspection implements [`Inspection`] and registers
//! its findings with a [`ProblemsHolder`].
//!
//! ```text
//! source ──► parse_file ──► SemanticModel ──► Inspection::check ──► ProblemsHolder ──► Vec<Diagnostic>
//! ```
//!
//! - `type_checker` - argument and operand type mismatches

pub mod type_checker;

pub use type_checker::{operator_signature, TypeCheckerInspection};

use caret_diagnostics::span::SourceSpan;
use caret_diagnostics::Diagnostic;
use caret_parser::parse_file;
use caret_semantics::SemanticModel;
use caret_syntax::Span;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// A check over one analysed file.
pub trait Inspection {
    /// Stable identifier, also used as the diagnostic code
    fn code(&self) -> &'static str;

    /// Name shown to users
    fn display_name(&self) -> &'static str;

    fn check(&self, model: &SemanticModel, holder: &mut ProblemsHolder);
}

/// Collects the problems an inspection finds in one file.
#[derive(Debug)]
pub struct ProblemsHolder {
    file: PathBuf,
    code: &'static str,
    problems: Vec<Diagnostic>,
}

impl ProblemsHolder {
    pub fn new(file: impl Into<PathBuf>, code: &'static str) -> Self {
        Self {
            file: file.into(),
            code,
            problems: Vec::new(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn source_span(&self, span: Span) -> SourceSpan {
        SourceSpan::new(self.file.clone(), span.start, span.end)
    }

    /// A warning on a span of the file, not yet registered.
    pub fn problem(&self, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::warning(self.code, message).with_primary_span(self.source_span(span), "")
    }

    /// Report a warning on a span of the file.
    pub fn register_problem(&mut self, span: Span, message: impl Into<String>) {
        let problem = self.problem(span, message);
        self.register(problem);
    }

    pub fn register(&mut self, problem: Diagnostic) {
        self.problems.push(problem);
    }

    pub fn problems(&self) -> &[Diagnostic] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<Diagnostic> {
        self.problems
    }
}

/// Run an inspection over an analysed file.
pub fn run_inspection(
    inspection: &dyn Inspection,
    file: impl Into<PathBuf>,
    model: &SemanticModel,
) -> Vec<Diagnostic> {
    let start = Instant::now();
    let mut holder = ProblemsHolder::new(file, inspection.code());
    inspection.check(model, &mut holder);
    debug!(
        inspection = inspection.display_name(),
        problems = holder.problems().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "inspection finished"
    );
    holder.into_problems()
}

/// Parse, analyse and inspect a source text.
pub fn inspect_source(
    inspection: &dyn Inspection,
    file: impl Into<PathBuf>,
    source: &str,
) -> Vec<Diagnostic> {
    let parsed = parse_file(source);
    let model = SemanticModel::build(parsed.tree);
    run_inspection(inspection, file, &model)
}
