//! Terminal rendering of diagnostics through `ariadne`.

use std::ops::Range;

use ariadne::{Config, Label as ReportLabel, Report, ReportKind, Source};

use crate::Diagnostic;

/// Render `diagnostic` against `source` as a multi-line report.
///
/// `source_name` is printed in the report header. Label spans past the end
/// of the source are clamped. Falls back to the one-line `Display` form if
/// the report cannot be written.
pub fn render(diagnostic: &Diagnostic, source_name: &str, source: &str, colors: bool) -> String {
    let offset = diagnostic
        .primary_span()
        .map_or(0, |span| clamp(span.to_range(), source.len()).start);

    let mut builder = Report::<(&str, Range<usize>)>::build(ReportKind::Error, source_name, offset)
        .with_code(diagnostic.code)
        .with_message(&diagnostic.message)
        .with_config(Config::default().with_color(colors));

    for label in &diagnostic.labels {
        let range = clamp(label.span.to_range(), source.len());
        builder =
            builder.with_label(ReportLabel::new((source_name, range)).with_message(&label.message));
    }
    for note in &diagnostic.notes {
        builder = builder.with_note(note);
    }

    let mut out = Vec::new();
    match builder
        .finish()
        .write((source_name, Source::from(source.to_string())), &mut out)
    {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => diagnostic.to_string(),
    }
}

fn clamp(range: Range<usize>, len: usize) -> Range<usize> {
    let start = range.start.min(len);
    let end = range.end.clamp(start, len);
    start..end
}

#[cfg(test)]
mod tests;
