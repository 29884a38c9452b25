//! Iterative digit-sum reduction with master-number stops.

/// Numbers at which reduction halts even though they are multi-digit.
pub const MASTER_NUMBERS: [u32; 3] = [11, 22, 33];

/// Reduce a number to a single digit or a master number.
///
/// The value is repeatedly replaced by the sum of its decimal digits until it
/// is at most 9 or equals one of [`MASTER_NUMBERS`]. A master number reached
/// mid-reduction halts the loop (29 -> 11, not 2), which is the defining rule
/// of the Pythagorean system.
///
/// An input of 0 never enters the loop and passes through unchanged. That is
/// an allowed output for degenerate inputs (an all-zero sum, e.g. from an
/// entirely non-alphabetic name); it has no interpretation table entry and
/// receives the fallback text instead.
pub fn reduce(mut n: u32) -> u32 {
    while n > 9 && !MASTER_NUMBERS.contains(&n) {
        n = digit_sum(n);
    }
    n
}

fn digit_sum(mut n: u32) -> u32 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}
