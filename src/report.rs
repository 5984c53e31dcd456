//! Console rendering of the lifetime value report.

use std::fmt::Write as _;

use crate::models::LtvRow;

pub const EMPTY_REPORT: &str = "No data found for report.";

/// Fixed-width text table, one line per row.
pub fn render_table(rows: &[LtvRow]) -> String {
    if rows.is_empty() {
        return format!("{}\n", EMPTY_REPORT);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<32} {:<24} {:>14} {:>8}",
        "Rank", "Identity", "Name", "Total", "Orders"
    );
    let _ = writeln!(out, "{}", "-".repeat(86));
    for (rank, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<32} {:<24} {:>14.2} {:>8}",
            rank + 1,
            row.identity,
            row.display_name,
            row.total_amount,
            row.order_count
        );
    }
    out
}

/// Pretty JSON array of rows.
pub fn render_json(rows: &[LtvRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<LtvRow> {
        vec![
            LtvRow {
                identity: "a@x".into(),
                display_name: "Alice2".into(),
                total_amount: 100.0,
                order_count: 1,
            },
            LtvRow {
                identity: "b@x".into(),
                display_name: "Bob".into(),
                total_amount: 50.5,
                order_count: 3,
            },
        ]
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render_table(&[]), "No data found for report.\n");
    }

    #[test]
    fn test_table_lists_rows_in_rank_order() {
        let table = render_table(&rows());
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with("1  a@x"));
        assert!(lines[2].contains("100.00"));
        assert!(lines[3].contains("Bob"));
        assert!(lines[3].contains("50.50"));
    }

    #[test]
    fn test_json_output() {
        let json = render_json(&rows()).unwrap();
        let parsed: Vec<LtvRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rows());
    }
}
