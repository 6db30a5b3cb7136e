use serde::Serialize;
use sentinel_links::prelude::*;

pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

impl<T: TableRow> TableRow for &T {
    fn headers() -> &'static [&'static str] {
        T::headers()
    }

    fn row(&self) -> Vec<String> {
        (*self).row()
    }
}

pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();
    let widths = column_widths(headers, &rows);

    let mut out = String::new();
    out.push_str(&format_row(
        &headers.iter().map(ToString::to_string).collect::<Vec<_>>(),
        &widths,
    ));
    out.push('\n');
    out.push_str(&format_separator(&widths));

    for row in rows {
        out.push('\n');
        out.push_str(&format_row(&row, &widths));
    }

    out
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if idx >= widths.len() {
                widths.push(len);
            } else {
                widths[idx] = widths[idx].max(len);
            }
        }
    }
    widths
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    for (idx, cell) in row.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        let width = widths.get(idx).copied().unwrap_or(0);
        let _ = write!(out, "{cell:<width$}");
    }
    out.trim_end().to_string()
}

fn format_separator(widths: &[usize]) -> String {
    let mut out = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        out.push_str(&"-".repeat(*width));
    }
    out
}

impl TableRow for Link {
    fn headers() -> &'static [&'static str] {
        &["id", "title", "category", "source", "url"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.category.clone(),
            self.source.to_string(),
            self.open_url().to_string(),
        ]
    }
}

/// A category and its link count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub count: usize,
}

impl TableRow for CategoryRow {
    fn headers() -> &'static [&'static str] {
        &["category", "links"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.count.to_string()]
    }
}
