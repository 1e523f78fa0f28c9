use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A markdown pipe table. Cells are raw strings and rows may be ragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    /// First column whose header names a risk, severity or level
    pub fn risk_column(&self) -> Option<usize> {
        self.headers.iter().position(|h| {
            let h = h.to_lowercase();
            h.contains("risk") || h.contains("severity") || h.contains("level")
        })
    }

    /// Cells of one column, skipping rows too short to have it
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index).map(String::as_str))
    }
}

/// Parse the first markdown pipe table in a section body
pub fn extract_table(body: &str) -> Option<TableData> {
    table_runs(body).into_iter().find_map(|run| parse_run(&run))
}

/// Like [`extract_table`] but only accepts a table with a header cell
/// containing `keyword` (case-insensitive)
pub fn extract_table_with_header(body: &str, keyword: &str) -> Option<TableData> {
    let keyword = keyword.to_lowercase();
    table_runs(body)
        .into_iter()
        .filter_map(|run| parse_run(&run))
        .find(|table| {
            table
                .headers
                .iter()
                .any(|h| h.to_lowercase().contains(&keyword))
        })
}

/// Groups of consecutive lines that start with `|`
fn table_runs(body: &str) -> Vec<Vec<&str>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for line in body.lines().map(str::trim) {
        if line.starts_with('|') {
            current.push(line);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Header, separator and at least one data row
fn parse_run(run: &[&str]) -> Option<TableData> {
    if run.len() < 3 || !is_separator(run[1]) {
        return None;
    }

    let headers = split_cells(run[0]);
    if headers.is_empty() {
        return None;
    }
    let rows = run[2..].iter().map(|row| split_cells(row)).collect();

    Some(TableData { headers, rows })
}

fn split_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(String::from)
        .collect()
}

fn is_separator(line: &str) -> bool {
    line.contains('-')
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_implications_table() {
        let md = r#"
The following risks were identified:

| Risk | Impact | Recommendation |
|------|:------:|----------------|
| Logic bomb in OB1 | Critical | Remove timer-triggered writes |
| Hardcoded setpoint | Medium | Move to DB parameters |

Review with the plant engineer.
"#;
        let table = extract_table(md).unwrap();
        assert_eq!(table.headers, vec!["Risk", "Impact", "Recommendation"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Logic bomb in OB1");
        assert_eq!(table.rows[1][2], "Move to DB parameters");
    }

    #[test]
    fn test_two_line_table_is_rejected() {
        let md = "| Risk | Impact |\n|------|--------|";
        assert!(extract_table(md).is_none());
    }

    #[test]
    fn test_three_line_table_has_one_row() {
        let md = "| Risk | Impact |\n|------|--------|\n| Tamper | High |";
        let table = extract_table(md).unwrap();
        assert_eq!(table.rows, vec![vec!["Tamper".to_string(), "High".to_string()]]);
    }

    #[test]
    fn test_ragged_rows_pass_through() {
        let md = "| A | B | C |\n|---|---|---|\n| 1 | 2 |\n| 1 | | 3 | 4 |";
        let table = extract_table(md).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2"]);
        assert_eq!(table.rows[1], vec!["1", "3", "4"]);
    }

    #[test]
    fn test_rows_must_be_consecutive() {
        let md = "| Risk | Impact |\n|------|--------|\n\n| Tamper | High |";
        assert!(extract_table(md).is_none());
    }

    #[test]
    fn test_keyword_selects_later_table() {
        let md = "| Step | Owner |\n|---|---|\n| Patch | OT |\n\n| Risk Area | Severity |\n|---|---|\n| Alarms | High |";
        assert_eq!(extract_table(md).unwrap().headers, vec!["Step", "Owner"]);

        let risk = extract_table_with_header(md, "risk").unwrap();
        assert_eq!(risk.headers, vec!["Risk Area", "Severity"]);
        assert_eq!(risk.risk_column(), Some(0));
        assert_eq!(risk.column(1).collect::<Vec<_>>(), vec!["High"]);
    }

    #[test]
    fn test_no_table() {
        assert!(extract_table("No findings here").is_none());
        assert!(extract_table_with_header("| a |\n|---|\n| b |", "risk").is_none());
    }
}
