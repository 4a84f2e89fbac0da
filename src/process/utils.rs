use once_cell::sync::Lazy;
use regex::Regex;

use crate::process::raw_table::Cell;

static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").expect("static regex"));
static TRAILING_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\s*\d)+\s*$").expect("static regex"));
static TRAILING_NON_ALPHA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z]+$").expect("static regex"));

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lower-case and collapse every whitespace run (newlines included) to one space.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Coerce a cell to a count.
///
/// Numbers pass through untouched. Text loses its thousands separators and
/// keeps only the leading digit run, so `"1,234"` → 1234 and `"57 3"` → 57.
/// Blank cells and text that does not start with a digit give `None`.
pub fn normalize_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Blank => None,
        Cell::Number(v) => Some(*v),
        Cell::Text(s) => {
            let stripped = clean_str(&s.replace(',', ""));
            LEADING_DIGITS
                .find(&stripped)
                .and_then(|m| m.as_str().parse::<f64>().ok())
        }
    }
}

/// Drop footnote digits glued to a city name: "Aransas Pass7" → "Aransas Pass".
///
/// Stable under repeated application. A name made only of digits is kept as-is.
pub fn clean_city(raw: &str) -> String {
    let trimmed = raw.trim();
    let cleaned = TRAILING_FOOTNOTE.replace(trimmed, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        trimmed.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Strip trailing non-letters from a state label ("TEXAS3" → "TEXAS").
/// `None` when nothing alphabetic is left.
pub fn clean_state(raw: &str) -> Option<String> {
    let cleaned = TRAILING_NON_ALPHA.replace(raw.trim(), "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Clean each state label and carry the last seen state down over blanks.
pub fn forward_fill_states<I>(raw_states: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut last: Option<String> = None;
    raw_states
        .into_iter()
        .map(|raw| {
            if let Some(state) = raw.as_deref().and_then(clean_state) {
                last = Some(state);
            }
            last.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("Aggravated  Assault\n"), "aggravated assault");
        assert_eq!(normalize_name("  Violent\ncrime "), "violent crime");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn normalizes_values() {
        assert_eq!(normalize_value(&Cell::Number(12.0)), Some(12.0));
        assert_eq!(normalize_value(&Cell::Number(-5.0)), Some(-5.0));
        assert_eq!(normalize_value(&Cell::Text("1,234".into())), Some(1234.0));
        assert_eq!(normalize_value(&Cell::Text(" 57 3".into())), Some(57.0));
        assert_eq!(normalize_value(&Cell::Text("210a".into())), Some(210.0));
        assert_eq!(normalize_value(&Cell::Text("\"88\"".into())), Some(88.0));
        assert_eq!(normalize_value(&Cell::Text("n/a".into())), None);
        assert_eq!(normalize_value(&Cell::Text("".into())), None);
        assert_eq!(normalize_value(&Cell::Blank), None);
    }

    #[test]
    fn city_footnotes_are_stripped_idempotently() {
        let once = clean_city("Aransas Pass7");
        assert_eq!(once, "Aransas Pass");
        assert_eq!(clean_city(&once), once);

        let twice = clean_city("Abilene 4 5");
        assert_eq!(twice, "Abilene");
        assert_eq!(clean_city(&twice), twice);

        assert_eq!(clean_city("  Austin "), "Austin");
        assert_eq!(clean_city("1234"), "1234");
    }

    #[test]
    fn state_labels_are_cleaned() {
        assert_eq!(clean_state("TEXAS3").as_deref(), Some("TEXAS"));
        assert_eq!(clean_state("NEW YORK4, 5").as_deref(), Some("NEW YORK"));
        assert_eq!(clean_state("Ohio").as_deref(), Some("Ohio"));
        assert_eq!(clean_state("12"), None);
        assert_eq!(clean_state("   "), None);
    }

    #[test]
    fn states_are_forward_filled() {
        let raw = vec![Some("Texas".to_string()), None, Some(" ".to_string()), Some("Ohio".into())];
        let filled = forward_fill_states(raw);
        assert_eq!(
            filled,
            vec![
                Some("Texas".to_string()),
                Some("Texas".to_string()),
                Some("Texas".to_string()),
                Some("Ohio".to_string())
            ]
        );

        let leading_blank = forward_fill_states(vec![None, Some("ALASKA1".to_string())]);
        assert_eq!(leading_blank, vec![None, Some("ALASKA".to_string())]);
    }
}
