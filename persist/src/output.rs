//! Output formatting for run reports and plans.

use crate::plan::Plan;
use crate::producer::ContentSource;
use crate::report::{PersistedFileResult, RunReport, display_path};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Formats a run report in the requested output format.
pub fn format_report(report: &RunReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        OutputFormat::Table => Ok(report_to_table(report)),
    }
}

/// Renders a plan as one line per item, without running anything.
pub fn format_plan(plan: &Plan) -> String {
    let mut out = String::new();
    let width = plan
        .items()
        .iter()
        .map(|item| item.basename.len())
        .max()
        .unwrap_or(8);

    for item in plan.items() {
        let kind = match item.content {
            ContentSource::Literal(_) => "literal",
            ContentSource::Command(_) => "command",
            ContentSource::Rejected(_) => "invalid",
        };
        out.push_str(&format!(
            "{:>3}  {:<width$}  {:<7}  {:<16}  {}\n",
            item.provenance.ordinal,
            item.basename,
            kind,
            item.provenance.confidentiality(),
            item.provenance.source_path.display(),
            width = width
        ));
    }
    out
}

fn status(result: &PersistedFileResult) -> &'static str {
    if result.is_success() { "OK" } else { "FAIL" }
}

fn source_of(result: &PersistedFileResult) -> String {
    result
        .provenance
        .as_ref()
        .map(|p| p.entry.source.clone())
        .unwrap_or_else(|| "<?>".to_string())
}

fn report_to_markdown(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Emit Report: {}\n\n", report.identity));
    out.push_str(&format!("- **Generated:** {}\n", report.generated_at));
    out.push_str(&format!("- **Driver:** `{}`\n", report.driver.display()));
    out.push_str(&format!("- **Succeeded:** {}\n", report.succeeded));
    out.push_str(&format!("- **Failed:** {}\n", report.failed));

    if !report.results.is_empty() {
        out.push_str("\n## Files\n\n");
        out.push_str("| File | Source | Confidentiality | Status |\n");
        out.push_str("|------|--------|-----------------|--------|\n");
        for result in &report.results {
            let confidentiality = result
                .confidentiality()
                .map(|c| c.to_string())
                .unwrap_or_default();
            out.push_str(&format!(
                "| `{}` | `{}` | {confidentiality} | {} |\n",
                result.basename(),
                source_of(result),
                status(result)
            ));
        }
    }

    let failures: Vec<&PersistedFileResult> = report.failures().collect();
    if !failures.is_empty() {
        out.push_str("\n## Failures\n\n");
        for result in failures {
            let code = result
                .failure_code
                .map(|c| format!("[{c}] "))
                .unwrap_or_default();
            let error = result.error.as_deref().unwrap_or("");
            out.push_str(&format!("- `{}`: {code}{error}\n", source_of(result)));
        }
    }

    out
}

fn report_to_table(report: &RunReport) -> String {
    let mut out = String::new();
    let base = report.driver.parent();
    let width = report
        .results
        .iter()
        .map(|r| display_path(&r.dest_file, base).len())
        .max()
        .unwrap_or(4);

    for result in &report.results {
        out.push_str(&format!(
            "{:<width$}  {:<4}",
            display_path(&result.dest_file, base),
            status(result),
            width = width
        ));
        if let Some(code) = result.failure_code {
            out.push_str(&format!("  [{code}]"));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "{}: {} succeeded, {} failed, driver {}\n",
        report.identity,
        report.succeeded,
        report.failed,
        report.driver.display()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FailureCode;
    use pgdcp_core::{Confidentiality, ProvenanceEntry, ResolvedProvenance};
    use std::path::{Path, PathBuf};

    fn resolved(source: &str, ordinal: u32) -> ResolvedProvenance {
        ResolvedProvenance {
            entry: ProvenanceEntry::literal(source, "SELECT 1;")
                .with_confidentiality(Confidentiality::ContainsSecrets),
            source_path: PathBuf::from(format!("/gen/{source}")),
            ordinal,
        }
    }

    fn sample_report() -> RunReport {
        RunReport {
            identity: "pgdcp".to_string(),
            generated_at: "2026-01-01T00:00:00+00:00".to_string(),
            driver: PathBuf::from("/out/driver.auto.psql"),
            succeeded: 1,
            failed: 1,
            results: vec![
                PersistedFileResult {
                    dest_file: PathBuf::from("/out/000_a.auto.psql"),
                    provenance: Some(resolved("a", 0)),
                    error: None,
                    failure_code: None,
                    checksum: Some("abc123".to_string()),
                },
                PersistedFileResult {
                    dest_file: PathBuf::from("/out/005_b.auto.psql"),
                    provenance: Some(resolved("b.sqla.sh", 5)),
                    error: Some("'b.sqla.sh' exited with exit code 1".to_string()),
                    failure_code: Some(FailureCode::NonZeroExit),
                    checksum: None,
                },
            ],
        }
    }

    #[test]
    fn test_format_report_json() {
        let json = format_report(&sample_report(), OutputFormat::Json).unwrap();
        assert!(json.contains("\"identity\": \"pgdcp\""));
        assert!(json.contains("\"failure_code\": \"non_zero_exit\""));
        assert!(json.contains("\"confidentiality\": \"contains-secrets\""));
    }

    #[test]
    fn test_format_report_yaml() {
        let yaml = format_report(&sample_report(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("identity: pgdcp"));
        assert!(yaml.contains("succeeded: 1"));
    }

    #[test]
    fn test_format_report_markdown() {
        let md = format_report(&sample_report(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("# Emit Report: pgdcp"));
        assert!(md.contains("**Failed:** 1"));
        assert!(md.contains("| `000_a.auto.psql` | `a` | contains-secrets | OK |"));
        assert!(md.contains("## Failures"));
        assert!(md.contains("[non_zero_exit]"));
    }

    #[test]
    fn test_format_report_table() {
        let table = format_report(&sample_report(), OutputFormat::Table).unwrap();
        assert!(table.contains("000_a.auto.psql  OK"));
        assert!(table.contains("005_b.auto.psql  FAIL  [non_zero_exit]"));
        assert!(table.contains("pgdcp: 1 succeeded, 1 failed"));
    }

    #[test]
    fn test_format_plan_lists_items() {
        let entries = vec![
            ProvenanceEntry::literal("a", "SELECT 1;"),
            ProvenanceEntry::command("b.sqla.sh").with_index(5),
            ProvenanceEntry::literal("c", "SELECT 2;").with_index(5),
        ];
        let plan = crate::plan::plan(&entries, Path::new("/gen"));
        let text = format_plan(&plan);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  0  000_a.auto.psql"));
        assert!(lines[0].contains("literal"));
        assert!(lines[1].starts_with("  5  005_b.auto.psql"));
        assert!(lines[1].contains("command"));
        assert!(lines[1].ends_with("/gen/b.sqla.sh"));
        assert!(lines[2].starts_with("  5  005_c.auto.psql"));
        assert!(lines[2].contains("invalid"));
    }
}
