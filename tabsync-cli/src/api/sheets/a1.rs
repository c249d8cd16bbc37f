//! A1 notation helpers

use anyhow::Result;

/// Widest sheet Google Sheets allows (column ZZZ)
const MAX_COLUMNS: usize = 18_278;

/// Zero-based index of a column letter ("A" → 0, "AA" → 26)
pub fn column_index(letters: &str) -> Result<usize> {
    if letters.is_empty() {
        anyhow::bail!("Empty column letter");
    }

    let mut index = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            anyhow::bail!("Invalid column letter: {}", letters);
        }
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .filter(|&i| i <= MAX_COLUMNS)
            .ok_or_else(|| anyhow::anyhow!("Column letter out of range: {}", letters))?;
    }
    Ok(index - 1)
}

/// Column letter for a zero-based index (0 → "A", 26 → "AA")
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Sheet name as it must appear in a range
///
/// Plain names (including non-ASCII ones) are used as-is; names with spaces
/// or punctuation are single-quoted.
pub fn sheet_prefix(sheet: &str) -> String {
    let plain = sheet.chars().all(|c| c.is_alphanumeric() || c == '_');
    if plain {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// `<sheet>!<startCol><startRow>:<endCol><endRow>`
pub fn range(
    sheet: &str,
    start_col: usize,
    start_row: usize,
    end_col: usize,
    end_row: usize,
) -> String {
    format!(
        "{}!{}{}:{}{}",
        sheet_prefix(sheet),
        column_letter(start_col),
        start_row,
        column_letter(end_col),
        end_row
    )
}

/// `<sheet>!<startCol><startRow>:<endCol>`, open to the bottom of the sheet
pub fn open_range(sheet: &str, start_col: usize, start_row: usize, end_col: usize) -> String {
    format!(
        "{}!{}{}:{}",
        sheet_prefix(sheet),
        column_letter(start_col),
        start_row,
        column_letter(end_col)
    )
}
