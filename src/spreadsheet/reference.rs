//! Conversions between A1-style cell references and 0-based indexes.

use regex::Captures;
use regex::Regex;
use std::sync::OnceLock;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\$?([A-Za-z]+)\$?(\d+)$").expect("Hardcode regex pattern"))
}

fn formula_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\$?)([A-Za-z]{1,3})(\$?)(\d+)").expect("Hardcode regex pattern"))
}

/// Converts column letters to a 0-based column index ("A" = 0, "AA" = 26).
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .chars()
        .map(|letter| letter as usize - 'A' as usize + 1)
        .try_fold(0usize, |index, digit| index.checked_mul(26)?.checked_add(digit))
        .map(|column| column - 1)
}

/// Converts a 1-based row number to a 0-based row index.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Parses a reference such as "B3" into (row, col).
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = reference_pattern().captures(reference)?;
    let col = col_to_index(captures.get(1)?.as_str())?;
    let row = row_to_index(captures.get(2)?.as_str())?;
    Some((row, col))
}

/// Converts a 0-based column index to column letters.
pub(crate) fn index_to_col(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        letters.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    letters
}

/// Formats (row, col) as an Excel-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

/// Moves the relative A1 references of a formula by `rows` and `cols`.
///
/// Absolute parts (`$A`, `$1`), quoted text and sheet names, and function
/// names such as `LOG10` are left as they are. A reference moved before
/// row 1 or column A becomes `#REF!`.
pub(crate) fn shift_formula(formula: &str, rows: isize, cols: isize) -> String {
    let mut shifted = String::with_capacity(formula.len());
    let mut quote = None::<char>;
    let mut start = 0;
    for (i, c) in formula.char_indices() {
        match quote {
            Some(q) if c == q => {
                shifted.push_str(&formula[start..=i]);
                quote = None;
                start = i + 1;
            }
            Some(_) => {}
            None if c == '"' || c == '\'' => {
                shifted.push_str(&shift_references(&formula[start..i], rows, cols));
                quote = Some(c);
                start = i;
            }
            None => {}
        }
    }
    match quote {
        Some(_) => shifted.push_str(&formula[start..]),
        None => shifted.push_str(&shift_references(&formula[start..], rows, cols)),
    }
    shifted
}

fn shift_references(segment: &str, rows: isize, cols: isize) -> String {
    let is_name = |c: char| c.is_alphanumeric() || c == '_' || c == '.';
    let mut shifted = String::with_capacity(segment.len());
    let mut last = 0;
    for captures in formula_reference_pattern().captures_iter(segment) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let before = segment[..whole.start()].chars().next_back();
        let after = segment[whole.end()..].chars().next();
        if before.is_some_and(|c| is_name(c) || c == '$') || after.is_some_and(|c| is_name(c) || c == '(') {
            continue;
        }
        shifted.push_str(&segment[last..whole.start()]);
        shifted.push_str(&shift_reference(&captures, rows, cols));
        last = whole.end();
    }
    shifted.push_str(&segment[last..]);
    shifted
}

fn shift_reference(captures: &Captures, rows: isize, cols: isize) -> String {
    let (col_absolute, row_absolute) = (&captures[1], &captures[3]);
    let (Some(col), Some(row)) = (col_to_index(&captures[2]), row_to_index(&captures[4])) else {
        return captures[0].to_owned();
    };
    let col = if col_absolute.is_empty() { col.checked_add_signed(cols) } else { Some(col) };
    let row = if row_absolute.is_empty() { row.checked_add_signed(rows) } else { Some(row) };
    match row.zip(col) {
        Some((row, col)) => format!("{}{}{}{}", col_absolute, index_to_col(col), row_absolute, row + 1),
        None => "#REF!".to_owned(),
    }
}
