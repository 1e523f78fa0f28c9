use crate::compare::Comparison;
use crate::error::OutputError;
use crate::parser::{risk_label, FindingCard, LabelValueItem, ReportDocument, TableData};
use std::fs;
use std::path::Path;

/// Write a parsed document as `<name>.report.json` and `<name>.report.md`
pub fn write_document(
    report_dir: &Path,
    name: &str,
    document: &ReportDocument,
) -> Result<(), OutputError> {
    // Ensure directory exists
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let json_path = report_dir.join(format!("{}.report.json", name));
    let json = serde_json::to_string_pretty(document)?;
    fs::write(&json_path, json).map_err(OutputError::WriteReport)?;

    let md_path = report_dir.join(format!("{}.report.md", name));
    fs::write(&md_path, render_document(name, document)).map_err(OutputError::WriteReport)?;

    Ok(())
}

/// Render a parsed document as normalised markdown
pub fn render_document(name: &str, document: &ReportDocument) -> String {
    let mut content = String::new();

    // Header
    content.push_str(&format!("# {}\n\n", name));

    // Metadata table
    content.push_str("| Metric | Value |\n");
    content.push_str("|--------|-------|\n");
    content.push_str(&format!("| Kind | {:?} |\n", document.kind));
    content.push_str(&format!("| Format | {} |\n", document.convention));
    if let Some(provider) = &document.provider {
        content.push_str(&format!("| Provider | {} |\n", provider));
    }
    content.push_str(&format!("| Sections | {} |\n", document.sections.len()));
    content.push_str(&format!("| Findings | {} |\n", document.findings().count()));
    content.push_str(&format!(
        "| Highest Severity | {} |\n",
        document
            .highest_severity
            .map(|l| l.label())
            .unwrap_or("None")
    ));
    content.push_str("\n---\n\n");

    if let Some(text) = &document.unstructured {
        content.push_str(text);
        content.push_str("\n\n");
    }

    for section in &document.sections {
        content.push_str(&format!("## {}\n\n", section.title));

        if let Some(table) = &section.table {
            content.push_str(&render_table(table));
        } else if let Some(items) = &section.label_values {
            content.push_str(&render_label_values(items));
        } else if !section.body.is_empty() {
            content.push_str(&section.body);
            content.push('\n');
        }
        content.push('\n');
    }

    if !document.instruction_analysis.is_empty() {
        content.push_str("## Instruction-level Security Analysis\n\n");
        content.push_str(&render_records(&document.instruction_analysis));
        content.push('\n');
    }

    content
}

/// Render a baseline comparison
pub fn render_comparison(comparison: &Comparison) -> String {
    let mut md = String::new();

    md.push_str("# Baseline Comparison\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!(
        "| Analysis Severity | {} |\n",
        comparison
            .analysis_severity
            .map(|l| l.label())
            .unwrap_or("None")
    ));
    md.push_str(&format!(
        "| Baseline Severity | {} |\n",
        comparison
            .baseline_severity
            .map(|l| l.label())
            .unwrap_or("None")
    ));
    md.push_str(&format!(
        "| Escalated | {} |\n\n",
        if comparison.escalated { "⚠️ yes" } else { "no" }
    ));

    if comparison.is_unchanged() {
        md.push_str("*No differences from baseline*\n");
        return md;
    }

    push_list(&mut md, "Sections Added", &comparison.sections_added);
    push_list(&mut md, "Sections Removed", &comparison.sections_removed);
    push_list(&mut md, "Sections Changed", &comparison.sections_changed);
    push_findings(&mut md, "New Findings", &comparison.new_findings);
    push_findings(&mut md, "Resolved Findings", &comparison.resolved_findings);

    md
}

fn push_list(md: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    md.push_str(&format!("## {}\n\n", heading));
    for item in items {
        md.push_str(&format!("- {}\n", item));
    }
    md.push('\n');
}

fn push_findings(md: &mut String, heading: &str, findings: &[FindingCard]) {
    if findings.is_empty() {
        return;
    }
    md.push_str(&format!("## {}\n\n", heading));
    for finding in findings {
        let level = finding.risk_level.map(|l| l.label()).unwrap_or("Unrated");
        md.push_str(&format!("- [{}] {}\n", level, finding.title));
    }
    md.push('\n');
}

fn render_label_values(items: &[LabelValueItem]) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            LabelValueItem::Item(lv) => {
                // Continuation lines stay inside the bullet
                let value = lv.value.replace('\n', "\n  ");
                out.push_str(&format!("- **{}:** {}\n", lv.label, value));
            }
            LabelValueItem::Break => out.push('\n'),
        }
    }
    out
}

fn render_table(table: &TableData) -> String {
    let risk_column = table.risk_column();
    let mut out = String::new();

    out.push_str(&format!("| {} |\n", table.headers.join(" | ")));
    out.push_str(&format!(
        "|{}\n",
        table.headers.iter().map(|_| "---|").collect::<String>()
    ));
    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if Some(i) == risk_column {
                    risk_label(cell)
                } else {
                    cell.clone()
                }
            })
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

/// Instruction records as a table keyed by the first record's fields
fn render_records(records: &[serde_json::Value]) -> String {
    let columns: Vec<String> = records
        .iter()
        .find_map(|r| r.as_object())
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();

    if columns.is_empty() {
        return records
            .iter()
            .map(|r| format!("- {}\n", r))
            .collect();
    }

    let mut out = String::new();
    out.push_str(&format!("| {} |\n", columns.join(" | ")));
    out.push_str(&format!(
        "|{}\n",
        columns.iter().map(|_| "---|").collect::<String>()
    ));
    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| match record.get(col) {
                Some(serde_json::Value::String(s)) if col == "risk_level" => risk_label(s),
                Some(serde_json::Value::String(s)) => s.replace('|', "\\|"),
                Some(other) => other.to_string().replace('|', "\\|"),
                None => String::new(),
            })
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}
