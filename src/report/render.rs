//! Text and HTML rendering of reports

use super::{
    ColumnDrift, DataDriftReport, DataQualityReport, PerformanceReport, QualityWarning, Report,
    ReportSet, TargetDriftReport, WindowQuality,
};
use crate::training::RegressionMetrics;
use std::fmt::Write;

/// Turns computed reports into a document
pub trait ReportRenderer {
    fn render(&self, report: &Report) -> String;

    fn render_set(&self, set: &ReportSet) -> String;
}

/// Plain-text tables for terminals and logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

/// Self-contained HTML page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn metric_rows(
    reference: &RegressionMetrics,
    current: &RegressionMetrics,
) -> Vec<(&'static str, String, String)> {
    vec![
        ("count", reference.count.to_string(), current.count.to_string()),
        (
            "mean error",
            format!("{:.4}", reference.mean_error),
            format!("{:.4}", current.mean_error),
        ),
        ("MAE", format!("{:.4}", reference.mae), format!("{:.4}", current.mae)),
        ("MSE", format!("{:.4}", reference.mse), format!("{:.4}", current.mse)),
        ("RMSE", format!("{:.4}", reference.rmse), format!("{:.4}", current.rmse)),
        ("R2", format!("{:.4}", reference.r2), format!("{:.4}", current.r2)),
        (
            "max abs error",
            format!("{:.4}", reference.max_abs_error),
            format!("{:.4}", current.max_abs_error),
        ),
        ("error std", format!("{:.4}", reference.error_std), format!("{:.4}", current.error_std)),
        ("MAPE", fmt_opt(reference.mape), fmt_opt(current.mape)),
    ]
}

fn warning_text(warning: &QualityWarning) -> String {
    match warning {
        QualityWarning::HighMissingness { column, ratio } => {
            format!("{}: {:.1}% missing", column, ratio * 100.0)
        }
        QualityWarning::HighCardinality {
            column,
            unique_count,
            total_count,
        } => format!("{}: {} distinct of {} rows", column, unique_count, total_count),
        QualityWarning::DuplicateRows { count, total } => {
            format!("{} duplicate rows of {}", count, total)
        }
        QualityWarning::ConstantColumn { column } => format!("{}: constant", column),
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

impl TextRenderer {
    fn performance(out: &mut String, r: &PerformanceReport) {
        let _ = writeln!(out, "target: {}  prediction: {}", r.target, r.prediction);
        let _ = writeln!(out, "{:<16}{:>14}{:>14}", "metric", "reference", "current");
        for (name, reference, current) in metric_rows(&r.reference, &r.current) {
            let _ = writeln!(out, "{:<16}{:>14}{:>14}", name, reference, current);
        }
        let _ = writeln!(
            out,
            "delta: MAE {:+.4}  RMSE {:+.4}  R2 {:+.4}",
            r.delta.mae, r.delta.rmse, r.delta.r2
        );
    }

    fn drift_header(out: &mut String) {
        let _ = writeln!(
            out,
            "{:<22}{:>14}{:>12}{:>12}{:>10}",
            "column", "test", "statistic", "p-value", "drift"
        );
    }

    fn drift_row(out: &mut String, c: &ColumnDrift) {
        let _ = writeln!(
            out,
            "{:<22}{:>14}{:>12.4}{:>12}{:>10}",
            c.column,
            c.stat_test,
            c.statistic,
            fmt_opt(c.p_value),
            yes_no(c.drift_detected)
        );
    }

    fn target_drift(out: &mut String, r: &TargetDriftReport) {
        Self::drift_header(out);
        Self::drift_row(out, &r.target);
        Self::drift_row(out, &r.prediction);
        let _ = writeln!(
            out,
            "correlation: reference {}  current {}",
            fmt_opt(r.reference_correlation),
            fmt_opt(r.current_correlation)
        );
    }

    fn data_drift(out: &mut String, r: &DataDriftReport) {
        let _ = writeln!(
            out,
            "drifted columns: {}/{} ({:.1}%)  dataset drift: {}",
            r.number_of_drifted_columns,
            r.number_of_columns,
            r.share_of_drifted_columns * 100.0,
            yes_no(r.dataset_drift)
        );
        Self::drift_header(out);
        for c in &r.columns {
            Self::drift_row(out, c);
        }
    }

    fn window_quality(out: &mut String, window: &str, q: &WindowQuality) {
        let _ = writeln!(
            out,
            "[{}] rows {}  missing cells {}  duplicate rows {}",
            window, q.rows, q.missing_cells, q.duplicate_rows
        );
        let _ = writeln!(
            out,
            "{:<22}{:>8}{:>9}{:>10}{:>12}{:>12}{:>12}",
            "column", "count", "missing", "distinct", "min", "mean", "max"
        );
        for c in &q.column_stats {
            let _ = writeln!(
                out,
                "{:<22}{:>8}{:>9}{:>10}{:>12}{:>12}{:>12}",
                c.column,
                c.count,
                c.missing,
                c.distinct,
                fmt_opt(c.min),
                fmt_opt(c.mean),
                fmt_opt(c.max)
            );
        }
        for w in &q.warnings {
            let _ = writeln!(out, "  warning: {}", warning_text(w));
        }
    }

    fn data_quality(out: &mut String, r: &DataQualityReport) {
        Self::window_quality(out, "reference", &r.reference);
        Self::window_quality(out, "current", &r.current);
    }
}

impl ReportRenderer for TextRenderer {
    fn render(&self, report: &Report) -> String {
        let title = report.kind().title();
        let mut out = format!("{}\n{}\n", title, "=".repeat(title.len()));
        match report {
            Report::Performance(r) => Self::performance(&mut out, r),
            Report::TargetDrift(r) => Self::target_drift(&mut out, r),
            Report::DataDrift(r) => Self::data_drift(&mut out, r),
            Report::DataQuality(r) => Self::data_quality(&mut out, r),
        }
        out
    }

    fn render_set(&self, set: &ReportSet) -> String {
        let mut out = format!("Generated at {}\n\n", set.generated_at.to_rfc3339());
        for report in &set.reports {
            out.push_str(&self.render(report));
            out.push('\n');
        }
        for failure in &set.failures {
            let _ = writeln!(out, "{} report failed: {}", failure.kind, failure.error);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin:1em 0}\
th,td{border:1px solid #ccc;padding:4px 10px;text-align:right}\
th:first-child,td:first-child{text-align:left}\
.drift{color:#b00020;font-weight:bold}\
.failure{color:#b00020}";

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn html_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::from("<table><tr>");
    for h in headers {
        let _ = write!(out, "<th>{}</th>", escape_html(h));
    }
    out.push_str("</tr>");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape_html(cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    out
}

fn drift_cells(c: &ColumnDrift) -> Vec<String> {
    vec![
        c.column.clone(),
        c.stat_test.clone(),
        format!("{:.4}", c.statistic),
        fmt_opt(c.p_value),
        yes_no(c.drift_detected).to_string(),
    ]
}

const DRIFT_HEADERS: [&str; 5] = ["column", "test", "statistic", "p-value", "drift"];

impl HtmlRenderer {
    fn body(report: &Report) -> String {
        let mut out = format!("<section><h2>{}</h2>", escape_html(report.kind().title()));
        match report {
            Report::Performance(r) => {
                let _ = write!(
                    out,
                    "<p>target <code>{}</code>, prediction <code>{}</code></p>",
                    escape_html(&r.target),
                    escape_html(&r.prediction)
                );
                let rows: Vec<Vec<String>> = metric_rows(&r.reference, &r.current)
                    .into_iter()
                    .map(|(name, a, b)| vec![name.to_string(), a, b])
                    .collect();
                out.push_str(&html_table(&["metric", "reference", "current"], &rows));
            }
            Report::TargetDrift(r) => {
                let rows = vec![drift_cells(&r.target), drift_cells(&r.prediction)];
                out.push_str(&html_table(&DRIFT_HEADERS, &rows));
                let _ = write!(
                    out,
                    "<p>correlation: reference {}, current {}</p>",
                    fmt_opt(r.reference_correlation),
                    fmt_opt(r.current_correlation)
                );
            }
            Report::DataDrift(r) => {
                let class = if r.dataset_drift { " class=\"drift\"" } else { "" };
                let _ = write!(
                    out,
                    "<p{}>{} of {} columns drifted, dataset drift: {}</p>",
                    class,
                    r.number_of_drifted_columns,
                    r.number_of_columns,
                    yes_no(r.dataset_drift)
                );
                let rows: Vec<Vec<String>> = r.columns.iter().map(drift_cells).collect();
                out.push_str(&html_table(&DRIFT_HEADERS, &rows));
            }
            Report::DataQuality(r) => {
                for (window, q) in [("reference", &r.reference), ("current", &r.current)] {
                    let _ = write!(
                        out,
                        "<h3>{}</h3><p>{} rows, {} missing cells, {} duplicate rows</p>",
                        window, q.rows, q.missing_cells, q.duplicate_rows
                    );
                    let rows: Vec<Vec<String>> = q
                        .column_stats
                        .iter()
                        .map(|c| {
                            vec![
                                c.column.clone(),
                                c.count.to_string(),
                                c.missing.to_string(),
                                c.distinct.to_string(),
                                fmt_opt(c.min),
                                fmt_opt(c.mean),
                                fmt_opt(c.max),
                            ]
                        })
                        .collect();
                    out.push_str(&html_table(
                        &["column", "count", "missing", "distinct", "min", "mean", "max"],
                        &rows,
                    ));
                    if !q.warnings.is_empty() {
                        out.push_str("<ul>");
                        for w in &q.warnings {
                            let _ = write!(out, "<li>{}</li>", escape_html(&warning_text(w)));
                        }
                        out.push_str("</ul>");
                    }
                }
            }
        }
        out.push_str("</section>");
        out
    }

    fn page(title: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>{}</body></html>\n",
            escape_html(title),
            STYLE,
            body
        )
    }
}

impl ReportRenderer for HtmlRenderer {
    fn render(&self, report: &Report) -> String {
        Self::page(report.kind().title(), &Self::body(report))
    }

    fn render_set(&self, set: &ReportSet) -> String {
        let mut body = format!(
            "<h1>Flight Delay Monitoring</h1><p>Generated at {}</p>",
            escape_html(&set.generated_at.to_rfc3339())
        );
        for report in &set.reports {
            body.push_str(&Self::body(report));
        }
        for failure in &set.failures {
            let _ = write!(
                body,
                "<p class=\"failure\">{} report failed: {}</p>",
                failure.kind,
                escape_html(&failure.error)
            );
        }
        Self::page("Flight Delay Monitoring", &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportEngine, ReportKind, ReportSelection};
    use crate::schema::ColumnSchema;
    use polars::prelude::*;

    fn report_set() -> ReportSet {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0, 4.0],
            "y" => &[1.0, 2.0, 3.0, 4.0],
            "prediction" => &[1.5, 2.0, 2.5, 4.0],
        )
        .unwrap();
        let schema = ColumnSchema::numeric("y", "prediction", vec!["a".to_string()]);
        ReportEngine::default().compute_selected(&ReportSelection::all(), &df, &df, &schema)
    }

    #[test]
    fn test_text_contains_every_title() {
        let set = report_set();
        let text = TextRenderer.render_set(&set);
        for kind in ReportKind::ALL {
            assert!(text.contains(kind.title()), "missing {}", kind);
        }
        assert!(text.contains("MAE"));
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(escape_html("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");

        let html = HtmlRenderer.render_set(&report_set());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2>Data Drift Report</h2>"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
