use itertools::Itertools;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Panel, Style, object::Rows},
};

use crate::{
    constants::{DEFAULT_TITLE, IDENTITY_HEADER},
    table::ProgressTable,
};

/// Renders the table for a terminal: one header row, then one row per loaded
/// student with a colored marker per exercise.
pub fn terminal(table: &ProgressTable, class_name: Option<&str>) -> String {
    let mut builder = Builder::default();
    builder.push_record(
        std::iter::once(IDENTITY_HEADER.to_string())
            .chain(table.columns().iter().map(|e| e.name().to_string())),
    );
    for row in table.rows() {
        builder.push_record(
            std::iter::once(row.username().to_string())
                .chain(table.symbols(row).map(|s| s.colored())),
        );
    }

    builder
        .build()
        .with(Panel::header(class_name.unwrap_or(DEFAULT_TITLE)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

/// Renders the table as a standalone HTML document.
pub fn html(table: &ProgressTable, class_name: Option<&str>) -> String {
    let title = escape(class_name.unwrap_or(DEFAULT_TITLE));

    let header = std::iter::once(IDENTITY_HEADER)
        .chain(table.columns().iter().map(|e| e.name()))
        .map(|name| format!("<th>{}</th>", escape(name)))
        .join("\n");
    let body = table
        .rows()
        .iter()
        .map(|row| {
            let cells = std::iter::once(format!("<td>{}</td>", escape(row.username())))
                .chain(table.symbols(row).map(|symbol| format!("<td>{symbol}</td>")))
                .join("\n");
            format!("<tr>\n{cells}\n</tr>")
        })
        .join("\n");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n\
         <body>\n<h1>{title}</h1>\n<table>\n<thead>\n<tr>\n{header}\n</tr>\n</thead>\n\
         <tbody>\n{body}\n</tbody>\n</table>\n</body>\n</html>\n"
    )
}

/// Escapes text for HTML element content.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        table::{RowStore, TableRow},
        types::{Exercise, LatestStatusMap, Student},
    };

    fn table() -> ProgressTable {
        let columns = vec![Exercise::new("arrays"), Exercise::new("loops")];
        let roster = vec![Student::new(1, "<ann>")];
        let latest: LatestStatusMap = [("loops".to_string(), "Completed".to_string())].into();
        let mut store = RowStore::new();
        store.upsert(TableRow::compute("<ann>", &columns, &latest));
        ProgressTable::assemble(&columns, &roster, &store)
    }

    #[test]
    fn html_escapes_and_uses_symbols() {
        let out = html(&table(), Some("CS & Co"));
        assert!(out.contains("<title>CS &amp; Co</title>"));
        assert!(out.contains("<td>&lt;ann&gt;</td>"));
        assert!(out.contains("<td>✅</td>"));
        assert!(out.contains("<td></td>"));
    }

    #[test]
    fn html_without_rows_is_a_complete_page() {
        let columns = vec![Exercise::new("loops")];
        let empty = ProgressTable::assemble(&columns, &[], &RowStore::new());
        let out = html(&empty, None);

        assert!(out.starts_with("<!DOCTYPE html>\n"));
        assert!(out.contains("<th>Github Username</th>\n<th>loops</th>"));
        assert!(!out.contains("<tr>\n<td>"));
        assert!(out.ends_with("</table>\n</body>\n</html>\n"));
    }

    #[test]
    fn terminal_lists_headers_and_users() {
        let out = terminal(&table(), None);
        assert!(out.contains(DEFAULT_TITLE));
        assert!(out.contains(IDENTITY_HEADER));
        assert!(out.contains("arrays"));
        assert!(out.contains("<ann>"));
    }
}
