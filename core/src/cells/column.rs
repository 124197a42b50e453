//! Spreadsheet column letters.
//!
//! Columns are numbered in bijective base 26: `A` is 0, `Z` is 25, `AA` is
//! 26 and so on. There is no zero digit, so a remainder of zero during
//! encoding stands for `Z` and borrows one from the quotient.

const ALPHABET_SIZE: usize = 26;

/// Encode a 0-based column index as letters
pub fn column_index_to_letters(index: usize) -> String {
    let mut letters = Vec::new();
    // widened so that usize::MAX + 1 does not overflow
    let mut quotient = index as u128 + 1;
    while quotient > 0 {
        let remainder = quotient % ALPHABET_SIZE as u128;
        quotient /= ALPHABET_SIZE as u128;
        if remainder == 0 {
            letters.push('Z');
            quotient -= 1;
        } else {
            letters.push((b'A' + remainder as u8 - 1) as char);
        }
    }
    letters.iter().rev().collect()
}

/// Decode upper-case column letters into a 0-based index.
///
/// `None` for empty input, characters outside `A-Z` and indices that do
/// not fit into `usize`.
pub fn column_letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let numeral = letters.chars().try_fold(0usize, |acc, c| {
        if !c.is_ascii_uppercase() {
            return None;
        }
        let digit = (c as u8 - b'A') as usize + 1;
        acc.checked_mul(ALPHABET_SIZE)?.checked_add(digit)
    })?;
    Some(numeral - 1)
}
