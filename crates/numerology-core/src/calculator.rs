//! Name-number and life-path calculators.

use chrono::NaiveDate;

use crate::reduction::reduce;

/// Map an `A..=Z` letter to its Pythagorean digit value.
///
/// The table is the classic width-9 repeating pattern: A=1 through I=9, then
/// J=1 through R=9, then S=1 through Z=8. Any character outside `A..=Z`
/// contributes nothing to a name sum and is filtered out by the caller.
fn letter_value(c: char) -> u32 {
    match c {
        'A' | 'J' | 'S' => 1,
        'B' | 'K' | 'T' => 2,
        'C' | 'L' | 'U' => 3,
        'D' | 'M' | 'V' => 4,
        'E' | 'N' | 'W' => 5,
        'F' | 'O' | 'X' => 6,
        'G' | 'P' | 'Y' => 7,
        'H' | 'Q' | 'Z' => 8,
        'I' | 'R' => 9,
        _ => 0,
    }
}

/// Substitute the six special-cased Latin-extended letters with their base
/// Latin counterparts.
///
/// This is an explicit table applied after uppercasing, not a generic Unicode
/// normalization: exactly these six characters are rewritten and every other
/// character passes through unchanged. Replacing it with a case-folding or
/// NFKD library call would silently change behavior for characters outside
/// the documented set.
fn substitute(c: char) -> char {
    match c {
        'Ç' => 'C',
        'Ğ' => 'G',
        'İ' => 'I',
        'Ö' => 'O',
        'Ş' => 'S',
        'Ü' => 'U',
        other => other,
    }
}

/// Calculate the name number for a full name.
///
/// The name is uppercased, the six-character substitution table is applied,
/// and the Pythagorean values of the remaining `A..=Z` characters are summed
/// and reduced. Characters that survive normalization as non-`A..=Z` (digits,
/// spaces, punctuation, letters from other scripts) contribute 0 rather than
/// raising an error, so an empty or entirely non-alphabetic name yields 0.
pub fn name_number(name: &str) -> u32 {
    let total = name
        .to_uppercase()
        .chars()
        .map(substitute)
        .filter(char::is_ascii_uppercase)
        .map(letter_value)
        .sum();
    reduce(total)
}

/// Calculate the life path number for a birth date.
///
/// The date is rendered as its 8-digit `YYYYMMDD` form (zero-padded month and
/// day), the 8 digits are summed, and the sum is reduced. The date is assumed
/// already validated by the request layer; no calendar checks happen here.
pub fn life_path(birth_date: NaiveDate) -> u32 {
    let total = birth_date
        .format("%Y%m%d")
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .sum();
    reduce(total)
}
