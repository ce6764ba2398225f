//! Fixed report template for notifications.
//!
//! The rendered body mirrors the HTTP report: a summary table with the
//! watch root and counts, the changed file list with nested change
//! descriptions, the unchanged list when requested, and a footer.

use std::fmt::Write as _;

use crate::check::ChangeEntry;

/// Fields the report template is parameterized by.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    /// Watch root path.
    pub root: &'a str,

    /// Total files considered.
    pub num_files: usize,

    /// Changed file count.
    pub num_changed: usize,

    /// Unchanged file count.
    pub num_unchanged: usize,

    /// Changed files with their descriptions.
    pub changed: &'a [ChangeEntry],

    /// Unchanged files (filename only).
    pub unchanged: &'a [ChangeEntry],
}

/// Build the notification subject.
#[must_use]
pub fn subject(ctx: &ReportContext<'_>) -> String {
    format!(
        "Filewatch report for {}: {} of {} files changed",
        ctx.root, ctx.num_changed, ctx.num_files
    )
}

/// Escape text for inclusion in HTML.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn push_entry_list(body: &mut String, entries: &[ChangeEntry]) {
    body.push_str("    <ol>\n");
    for entry in entries {
        let _ = writeln!(body, "      <li>{}", escape_html(&entry.filename));
        if !entry.changes.is_empty() {
            body.push_str("        <ol>\n");
            for change in &entry.changes {
                let _ = writeln!(body, "          <li>{}</li>", escape_html(change));
            }
            body.push_str("        </ol>\n");
        }
        body.push_str("      </li>\n");
    }
    body.push_str("    </ol>\n");
}

/// Render the HTML report body.
///
/// The unchanged list is included only when `report_unchanged` is set
/// and there are unchanged entries to show.
#[must_use]
pub fn render_html(ctx: &ReportContext<'_>, report_unchanged: bool) -> String {
    let root = escape_html(ctx.root);
    let mut body = String::new();

    body.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    let _ = writeln!(body, "  <title>Filewatch report for {root}</title>");
    body.push_str("</head>\n<body>\n");

    body.push_str("  <div id=\"summary\">\n");
    let _ = writeln!(body, "    <h1>Filewatch report for {root}</h1>");
    body.push_str("    <table class=\"meta\">\n");
    let _ = writeln!(body, "      <tr><th>Filename:</th><td><pre>{root}</pre></td></tr>");
    let _ = writeln!(
        body,
        "      <tr><th>Total number of files:</th><td>{}</td></tr>",
        ctx.num_files
    );
    let _ = writeln!(
        body,
        "      <tr><th>Changed files:</th><td>{}</td></tr>",
        ctx.num_changed
    );
    let _ = writeln!(
        body,
        "      <tr><th>Unchanged files:</th><td>{}</td></tr>",
        ctx.num_unchanged
    );
    body.push_str("    </table>\n  </div>\n");

    if !ctx.changed.is_empty() {
        body.push_str("  <div id=\"changed\">\n    <p>Changed files</p>\n");
        push_entry_list(&mut body, ctx.changed);
        body.push_str("  </div>\n");
    }

    if report_unchanged && !ctx.unchanged.is_empty() {
        body.push_str("  <div id=\"unchanged\">\n    <p>Unchanged files</p>\n");
        push_entry_list(&mut body, ctx.unchanged);
        body.push_str("  </div>\n");
    }

    body.push_str(
        "  <div id=\"explanation\">\n    <p>\n      This report was automatically generated. \
         Please do not respond to this mail.\n    </p>\n  </div>\n</body>\n</html>\n",
    );

    body
}
