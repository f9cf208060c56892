//! Locations of problems in named source files.

use std::path::PathBuf;

/// Byte range `start..end` of a named source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub file: PathBuf,
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(file: impl Into<PathBuf>, start: usize, end: usize) -> Self {
        Self {
            file: file.into(),
            start,
            end,
        }
    }
}

/// Whether a label marks the problem itself or a related location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: SourceSpan,
    pub message: String,
    pub style: LabelStyle,
}

/// Labels of one diagnostic. The first primary label is where it points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSpan {
    primary: Option<SourceSpan>,
    labels: Vec<Label>,
}

impl MultiSpan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_span(&self) -> Option<&SourceSpan> {
        self.primary.as_ref()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn push(&mut self, span: SourceSpan, message: impl Into<String>, style: LabelStyle) {
        if style == LabelStyle::Primary && self.primary.is_none() {
            self.primary = Some(span.clone());
        }
        self.labels.push(Label {
            span,
            message: message.into(),
            style,
        });
    }
}

/// 1-based line and display column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl LineColumn {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A span resolved against its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub span: SourceSpan,
    pub start: LineColumn,
    pub end: LineColumn,
    pub source_lines: Vec<String>,
}

impl ResolvedSpan {
    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primary_span_is_first_primary_label() {
        let mut multi = MultiSpan::new();
        multi.push(SourceSpan::new("A.java", 1, 2), "declared here", LabelStyle::Secondary);
        assert!(multi.primary_span().is_none());
        multi.push(SourceSpan::new("A.java", 10, 20), "", LabelStyle::Primary);
        multi.push(SourceSpan::new("A.java", 30, 40), "", LabelStyle::Primary);
        assert_eq!(multi.primary_span().map(|s| s.start), Some(10));
        let styles: Vec<_> = multi.labels().iter().map(|l| l.style).collect();
        assert_eq!(
            styles,
            vec![LabelStyle::Secondary, LabelStyle::Primary, LabelStyle::Primary]
        );
    }
}
