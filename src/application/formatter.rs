//! Terminal output for stored chat records.

use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::ChatRecord;

/// Formats a table listing of chat records, in the export column order.
pub fn format_records_table(records: &[ChatRecord]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(super::exporter::ExportDocument::header());

    for record in records {
        table.add_row(vec![
            record.id.to_string(),
            record.scope_id.clone(),
            record.user_id.clone(),
            truncate(&record.username, 16),
            truncate(&record.content, 40),
            record.time.clone(),
        ]);
    }

    table.to_string()
}

/// Truncates the first line of a string to max chars with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world!", 8), "hello...");
        assert_eq!(truncate("first\nsecond", 10), "first");
        assert_eq!(truncate("你好你好你好", 5), "你好...");
    }

    #[test]
    fn test_table_has_export_header() {
        let records = vec![ChatRecord {
            id: 12,
            scope_id: "g1".into(),
            user_id: "u1".into(),
            username: "alice".into(),
            time: "2024-01-05 08:03:09".into(),
            content: "hi".into(),
        }];

        let table = format_records_table(&records);
        assert!(table.contains("scopeId"));
        assert!(table.contains("Content"));
        assert!(table.contains("12"));
        assert!(table.contains("2024-01-05 08:03:09"));
    }
}
