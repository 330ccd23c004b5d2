//! Conversions between A1-style cell references and 0-based indexes

/// Number of rows in a worksheet (1..=1048576)
pub(crate) const MAX_ROWS: usize = 1_048_576;
/// Number of columns in a worksheet (A..=XFD)
pub(crate) const MAX_COLS: usize = 16_384;

/// Converts column letters ("A", "AB") to a 0-based column index.
/// Columns past `XFD` are rejected.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for character in letters.chars() {
        if !character.is_ascii_alphabetic() {
            return None;
        }
        let digit = (character.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    (index <= MAX_COLS).then(|| index - 1)
}

/// Converts a 1-based row number ("1", "42") to a 0-based row index.
/// Rows past 1048576 are rejected.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    if !digits.bytes().all(|digit| digit.is_ascii_digit()) {
        return None;
    }
    let number = digits.parse::<usize>().ok()?;
    (number <= MAX_ROWS).then(|| number.checked_sub(1)).flatten()
}

/// Converts a cell reference ("B3", "$B$3") to 0-based (row, column) indexes.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|character: char| character.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// Converts 0-based (row, column) indexes to a cell reference such as "B3".
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut col = col + 1;
    while col > 0 {
        let remainder = (col - 1) % 26;
        letters.push((b'A' + remainder as u8) as char);
        col = (col - 1) / 26;
    }
    let letters: String = letters.into_iter().rev().collect();
    format!("{}{}", letters, row + 1)
}
