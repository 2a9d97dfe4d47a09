//! Field format validators
//!
//! Pure, total functions: they never panic and report malformed input by
//! returning `false`.

/// Number of digits in a CPF
pub const CPF_LEN: usize = 11;

/// Check that an e-mail address has the conventional `local@domain.tld` shape
///
/// Requires exactly one `@`, a non-empty local part, no whitespace, and a
/// domain with at least one dot that has text on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    domain
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

/// Strip everything but ASCII digits
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a CPF as `000.000.000-00`
///
/// Input that does not hold exactly eleven digits is returned unchanged.
pub fn format_cpf(cpf: &str) -> String {
    let digits = normalize_cpf(cpf);
    if digits.len() != CPF_LEN {
        return cpf.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// Validate a CPF, ignoring punctuation
///
/// Rejects anything that is not eleven digits, the eleven known-invalid
/// repeated sequences, and numbers whose two check digits do not match the
/// weighted modulo-11 computation.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != CPF_LEN {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weighted modulo-11 check digit over `digits`
///
/// Weights start at `len + 1` and descend to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let first_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .zip((2..=first_weight).rev())
        .map(|(d, w)| d * w)
        .sum();

    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}
