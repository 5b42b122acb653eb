//! Markdown building blocks for the reports.
//!
//! Report tables are mostly "label, count" pairs, with count columns aligned
//! right. [`Table`] collects rows and renders them once.

/// Escape a table cell: pipes and backslashes are escaped, line breaks become `<br>`.
fn escape_cell(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    out.push_str("<br>");
                }
            }
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone)]
struct TableColumn {
    header: String,
    align: Align,
}

/// A pipe table. Rows shorter than the header are padded with empty cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<TableColumn>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// A left-aligned label column followed by a right-aligned count column.
    pub fn counts(label_header: &str, count_header: &str) -> Self {
        Self::new().text(label_header).count(count_header)
    }

    pub fn text(self, header: &str) -> Self {
        self.column(header, Align::Left)
    }

    pub fn count(self, header: &str) -> Self {
        self.column(header, Align::Right)
    }

    fn column(mut self, header: &str, align: Align) -> Self {
        self.columns.push(TableColumn {
            header: header.to_string(),
            align,
        });
        self
    }

    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Append a `label | count` row.
    pub fn push_count(&mut self, label: impl Into<String>, count: u64) {
        self.rows.push(vec![label.into(), count.to_string()]);
    }

    /// Append a label followed by several counts.
    pub fn push_counts(&mut self, label: impl Into<String>, counts: impl IntoIterator<Item = u64>) {
        let mut row = vec![label.into()];
        row.extend(counts.into_iter().map(|c| c.to_string()));
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        out.push('|');
        for column in &self.columns {
            out.push(' ');
            out.push_str(&escape_cell(&column.header));
            out.push_str(" |");
        }
        out.push('\n');

        out.push('|');
        for column in &self.columns {
            out.push_str(match column.align {
                Align::Left => "---|",
                Align::Right => "---:|",
            });
        }
        out.push('\n');

        for row in &self.rows {
            out.push('|');
            for i in 0..self.columns.len() {
                out.push(' ');
                if let Some(cell) = row.get(i) {
                    out.push_str(&escape_cell(cell));
                }
                out.push_str(" |");
            }
            out.push('\n');
        }
        out
    }
}

/// Format a Markdown heading at the given level (clamped to 1..=6).
pub fn format_heading(level: u8, text: &str) -> String {
    let hashes = "#".repeat(level.clamp(1, 6) as usize);
    format!("{hashes} {text}\n")
}

/// Format a bullet list item indented `level` steps.
pub fn format_list_item(level: u8, text: &str) -> String {
    let indent = "  ".repeat(level as usize);
    format!("{indent}- {}\n", escape_cell(text))
}
