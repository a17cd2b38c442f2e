//! Markdown rendering and filename derivation for saved reports

use crate::research::ReportDocument;
use chrono::NaiveDateTime;

/// Timestamp format used inside the report body
const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format used in report filenames
const FILENAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Render a report to the on-disk markdown format
///
/// Output is fully determined by the arguments. Follow-up questions are
/// joined by newlines with no trailing newline after the last one.
pub fn render_report(query: &str, report: &ReportDocument, generated_at: &NaiveDateTime) -> String {
    let questions = report
        .follow_up_questions
        .iter()
        .map(|q| format!("- {}", q))
        .collect::<Vec<_>>()
        .join("\n");

    let mut out = String::with_capacity(
        report.markdown_report.len() + report.short_summary.len() + questions.len() + 256,
    );
    out.push_str(&format!("# Research Report\n\n**Query:** {}\n\n", query));
    out.push_str(&format!(
        "**Generated:** {}\n\n---\n\n",
        generated_at.format(GENERATED_FORMAT)
    ));
    out.push_str(&format!("## Summary\n\n{}\n\n---\n\n", report.short_summary));
    out.push_str(&format!(
        "{}\n\n---\n\n## Follow-up Questions\n\n",
        report.markdown_report
    ));
    out.push_str(&questions);
    out
}

/// Derive the filesystem-safe prefix of a query
///
/// Takes the first `max_chars` characters, keeps alphanumerics, spaces,
/// hyphens and underscores, trims, then turns spaces into underscores.
pub fn sanitize_query_prefix(query: &str, max_chars: usize) -> String {
    query
        .chars()
        .take(max_chars)
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// Build `report_<timestamp>_<prefix>.md`
pub fn report_filename(query: &str, generated_at: &NaiveDateTime, max_chars: usize) -> String {
    format!(
        "report_{}_{}.md",
        generated_at.format(FILENAME_FORMAT),
        sanitize_query_prefix(query, max_chars)
    )
}
