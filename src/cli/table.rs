/// Column alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn left(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Left,
        }
    }

    pub fn right(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Right,
        }
    }
}

/// Plain-text table; cells may carry ANSI colour codes.
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| visible_width(cell))
                    .fold(visible_width(&column.header), usize::max)
            })
            .collect()
    }

    fn render_row(&self, cells: &[String], widths: &[usize]) -> String {
        self.columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let text = cells.get(idx).map(String::as_str).unwrap_or("");
                pad(text, *width, column.alignment)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut lines = vec![self.render_row(&headers, &widths)];
        lines.push(
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join("  "),
        );
        lines.extend(self.rows.iter().map(|row| self.render_row(row, &widths)));
        lines.join("\n")
    }
}

fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    let fill = " ".repeat(width.saturating_sub(visible_width(text)));
    match alignment {
        Alignment::Left => format!("{text}{fill}"),
        Alignment::Right => format!("{fill}{text}"),
    }
}

/// Character count ignoring ANSI escape sequences.
pub fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        width += 1;
    }
    width
}
