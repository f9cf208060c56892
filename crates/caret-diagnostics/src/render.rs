//! Diagnostic rendering for terminal output.

use crate::span::{Label, LabelStyle, LineColumn, ResolvedSpan, SourceSpan};
use crate::{Diagnostic, DiagnosticError, DiagnosticResult, DiagnosticSeverity};
use std::collections::HashMap;
use std::io::Write;
use termcolor::{Color, ColorSpec, NoColor, WriteColor};
use unicode_width::UnicodeWidthStr;

/// Configuration for the diagnostic renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum line width for source lines.
    pub max_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { max_width: 100 }
    }
}

/// Source texts by file name, used to show context lines.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<String, String>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }

    pub fn get_source(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(|s| s.as_str())
    }

    /// Resolves a span to line/column information and source text.
    pub fn resolve_span(&self, span: &SourceSpan) -> Option<ResolvedSpan> {
        let path = span.file.to_string_lossy();
        let source = self.get_source(&path)?;

        let start = offset_to_line_col(source, span.start);
        let end = offset_to_line_col(source, span.end);

        let source_lines = source
            .lines()
            .skip(start.line.saturating_sub(1))
            .take(end.line - start.line + 1)
            .map(String::from)
            .collect();

        Some(ResolvedSpan {
            span: span.clone(),
            start,
            end,
            source_lines,
        })
    }
}

/// Converts a byte offset to a line and display column.
pub fn offset_to_line_col(source: &str, offset: usize) -> LineColumn {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = before.matches('\n').count() + 1;
    LineColumn::new(line, before[line_start..].width() + 1)
}

/// Renders diagnostics to a color-capable stream.
pub struct TerminalRenderer<W: WriteColor> {
    config: RenderConfig,
    stream: W,
}

impl<W: WriteColor> TerminalRenderer<W> {
    pub fn new(stream: W, config: RenderConfig) -> Self {
        Self { config, stream }
    }

    pub fn into_inner(self) -> W {
        self.stream
    }

    fn severity_color(severity: DiagnosticSeverity) -> Color {
        match severity {
            DiagnosticSeverity::Error => Color::Red,
            DiagnosticSeverity::Warning => Color::Yellow,
        }
    }

    fn write_colored(&mut self, text: &str, color: Color, bold: bool) -> DiagnosticResult<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(bold);
        self.stream.set_color(&spec)?;
        write!(self.stream, "{}", text)?;
        self.stream.reset()?;
        Ok(())
    }

    /// Renders one diagnostic followed by a blank line.
    pub fn render(&mut self, diagnostic: &Diagnostic, sources: &SourceCache) -> DiagnosticResult<()> {
        let color = Self::severity_color(diagnostic.severity);
        let mut header = diagnostic.severity.prefix().to_string();
        if let Some(code) = &diagnostic.code {
            header.push_str(&format!("[{}]", code));
        }
        self.write_colored(&header, color, true)?;
        writeln!(self.stream, ": {}", diagnostic.message)?;

        if let Some(primary) = diagnostic.spans.primary_span() {
            let resolved = sources
                .resolve_span(primary)
                .ok_or_else(|| DiagnosticError::SourceNotFound(primary.file.display().to_string()))?;
            self.render_snippet(diagnostic, &resolved, sources)?;
        }

        writeln!(self.stream)?;
        Ok(())
    }

    fn render_snippet(
        &mut self,
        diagnostic: &Diagnostic,
        resolved: &ResolvedSpan,
        sources: &SourceCache,
    ) -> DiagnosticResult<()> {
        let labels: Vec<(&Label, ResolvedSpan)> = diagnostic
            .spans
            .labels()
            .iter()
            .filter_map(|label| sources.resolve_span(&label.span).map(|r| (label, r)))
            .collect();
        let last_line = labels
            .iter()
            .map(|(_, r)| r.start.line)
            .fold(resolved.end.line, usize::max);
        let gutter = last_line.to_string().len().max(2);
        writeln!(
            self.stream,
            " --> {}:{}:{}",
            resolved.span.file.display(),
            resolved.start.line,
            resolved.start.column
        )?;
        self.write_colored(&format!("{:>gutter$} |", ""), Color::Blue, false)?;
        writeln!(self.stream)?;

        for (i, line) in resolved.source_lines.iter().enumerate() {
            let number = resolved.start.line + i;
            let shown = self.truncate(line, gutter);
            self.write_colored(&format!("{:>gutter$} |", number), Color::Blue, false)?;
            writeln!(self.stream, " {}", shown)?;
        }

        for (label, label_resolved) in &labels {
            if label_resolved.start.line == resolved.start.line {
                self.write_underline(label, label_resolved, diagnostic.severity, gutter)?;
            }
        }

        // related locations on other lines get their own source line
        for (label, label_resolved) in &labels {
            if label_resolved.start.line == resolved.start.line {
                continue;
            }
            let line = label_resolved.source_lines.first().map(String::as_str).unwrap_or("");
            let shown = self.truncate(line, gutter);
            self.write_colored(&format!("{:>gutter$} |", label_resolved.start.line), Color::Blue, false)?;
            writeln!(self.stream, " {}", shown)?;
            self.write_underline(label, label_resolved, diagnostic.severity, gutter)?;
        }
        Ok(())
    }

    fn truncate(&self, line: &str, gutter: usize) -> String {
        let room = self.config.max_width.saturating_sub(gutter + 3);
        if line.width() <= room {
            return line.to_string();
        }
        let mut out = String::new();
        for ch in line.chars() {
            if out.width() + 4 > room {
                break;
            }
            out.push(ch);
        }
        out.push_str("...");
        out
    }

    fn write_underline(
        &mut self,
        label: &Label,
        resolved: &ResolvedSpan,
        severity: DiagnosticSeverity,
        gutter: usize,
    ) -> DiagnosticResult<()> {
        let (marker, color) = match label.style {
            LabelStyle::Primary => (severity.underline_char(), Self::severity_color(severity)),
            LabelStyle::Secondary => ('-', Color::Blue),
        };
        self.write_colored(&format!("{:>gutter$} |", ""), Color::Blue, false)?;
        write!(self.stream, " {:>pad$}", "", pad = resolved.start.column - 1)?;

        let width = if resolved.is_multiline() {
            resolved
                .source_lines
                .first()
                .map(|l| l.width() + 1 - resolved.start.column)
                .unwrap_or(1)
        } else {
            resolved.end.column - resolved.start.column
        };
        let underline: String = std::iter::repeat(marker).take(width.max(1)).collect();
        self.write_colored(&underline, color, false)?;
        if !label.message.is_empty() {
            write!(self.stream, " ")?;
            self.write_colored(&label.message, color, false)?;
        }
        writeln!(self.stream)?;
        Ok(())
    }
}

/// Renders a diagnostic as plain text.
pub fn render_to_string(diagnostic: &Diagnostic, sources: &SourceCache) -> DiagnosticResult<String> {
    let mut renderer = TerminalRenderer::new(NoColor::new(Vec::new()), RenderConfig::default());
    renderer.render(diagnostic, sources)?;
    Ok(String::from_utf8_lossy(&renderer.into_inner().into_inner()).into_owned())
}
