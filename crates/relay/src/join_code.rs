//! Join codes: the short string a host shares so others can find its allocation.

use rand::Rng;

/// Length of every join code.
pub const JOIN_CODE_LEN: usize = 6;

/// Characters used when generating codes. Excludes look-alikes (0/O, 1/I).
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Errors from join code validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinCodeError {
    #[error("join code is empty")]
    Empty,
    #[error("join code must be 6 characters, got {0}")]
    WrongLength(usize),
    #[error("join code contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Generate a fresh random join code.
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Trim and upper-case user input, then check it looks like a join code.
pub fn normalize_join_code(input: &str) -> Result<String, JoinCodeError> {
    let code = input.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Err(JoinCodeError::Empty);
    }
    if let Some(bad) = code.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(JoinCodeError::InvalidCharacter(bad));
    }
    let len = code.chars().count();
    if len != JOIN_CODE_LEN {
        return Err(JoinCodeError::WrongLength(len));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_valid() {
        for _ in 0..100 {
            let code = generate_join_code();
            assert_eq!(code.len(), JOIN_CODE_LEN);
            assert_eq!(normalize_join_code(&code).unwrap(), code);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_join_code("  ab3xyz \n").unwrap(), "AB3XYZ");
    }

    #[test]
    fn normalize_rejects_wrong_length() {
        assert_eq!(normalize_join_code("ABC"), Err(JoinCodeError::WrongLength(3)));
        assert_eq!(normalize_join_code("ABCDEFG"), Err(JoinCodeError::WrongLength(7)));
    }

    #[test]
    fn normalize_rejects_empty_and_symbols() {
        assert_eq!(normalize_join_code("   "), Err(JoinCodeError::Empty));
        assert_eq!(
            normalize_join_code("AB-DEF"),
            Err(JoinCodeError::InvalidCharacter('-'))
        );
    }
}
