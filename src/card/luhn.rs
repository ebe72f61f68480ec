//! Luhn check digit computation.

/// Compute the check digit to append to `payload`.
///
/// Non-digit characters are ignored. The rightmost payload digit sits at
/// offset 1 from the (not yet placed) check digit, so it is doubled.
/// Returns 0 when `payload` holds no digits.
pub fn check_digit(payload: &str) -> u8 {
    let total: u32 = payload
        .chars()
        .filter_map(|c| c.to_digit(10))
        .rev()
        .enumerate()
        .map(|(i, digit)| if i % 2 == 0 { double(digit) } else { digit })
        .sum();

    ((10 - total % 10) % 10) as u8
}

/// Check whether a complete number (check digit included) passes Luhn.
pub fn is_valid(number: &str) -> bool {
    let digits: Vec<u32> = number.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 2 {
        return false;
    }

    let total: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &digit)| if i % 2 == 1 { double(digit) } else { digit })
        .sum();

    total % 10 == 0
}

fn double(digit: u32) -> u32 {
    let doubled = digit * 2;
    if doubled > 9 {
        doubled - 9
    } else {
        doubled
    }
}
