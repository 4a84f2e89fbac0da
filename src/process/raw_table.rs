use std::fmt;

/// One cell of a source table as the loader found it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Blank,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Classify a raw field: whitespace-only is blank, a finite float is a number.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Blank;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Blank => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// The cell as text, `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Blank => Ok(()),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(raw: &str) -> Self {
        Cell::from_raw(raw)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column names as the file states them, newlines already flattened.
    pub headers: Vec<String>,
    /// Data rows below the header row. Rows may be shorter than `headers`.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Cell at (`row`, `col`), `Blank` past the end of a short row.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static BLANK: Cell = Cell::Blank;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_raw_fields() {
        assert_eq!(Cell::from_raw("  "), Cell::Blank);
        assert_eq!(Cell::from_raw("42"), Cell::Number(42.0));
        assert_eq!(Cell::from_raw(" -5 "), Cell::Number(-5.0));
        assert_eq!(Cell::from_raw("1,234"), Cell::Text("1,234".into()));
        assert_eq!(Cell::from_raw("NaN"), Cell::Text("NaN".into()));
    }

    #[test]
    fn short_rows_read_as_blank() {
        let t = RawTable::new(
            vec!["State".into(), "City".into(), "Violent crime".into()],
            vec![vec![Cell::from("Texas"), Cell::from("Austin")]],
        );
        assert_eq!(t.cell(0, 1), &Cell::Text("Austin".into()));
        assert!(t.cell(0, 2).is_blank());
        assert!(t.cell(5, 0).is_blank());
        assert_eq!(Cell::Number(30.0).to_string(), "30");
    }
}
