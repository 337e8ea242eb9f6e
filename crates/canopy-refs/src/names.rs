//! Label and account validation.
//!
//! Valid labels:
//! - Must be non-empty and at most [`MAX_LABEL_LEN`] bytes
//! - Must not contain whitespace or control characters
//! - Must not contain `/`, which separates account from label in display
//! - Must not be `.` or `..`

use crate::error::{RegistryError, Result};

/// Longest accepted label, in bytes.
pub const MAX_LABEL_LEN: usize = 128;

/// Characters forbidden anywhere in a label or account.
const FORBIDDEN_CHARS: &[char] = &['/', '\\'];

/// Validate a root label, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use canopy_refs::names::validate_label;
///
/// assert!(validate_label("notes").is_ok());
/// assert!(validate_label("shared-with-bob").is_ok());
/// assert!(validate_label("").is_err());
/// assert!(validate_label("a/b").is_err());
/// ```
pub fn validate_label(label: &str) -> Result<()> {
    let invalid = |reason: String| RegistryError::InvalidLabel {
        label: label.to_string(),
        reason,
    };

    if label.is_empty() {
        return Err(invalid("label must not be empty".into()));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(invalid(format!("longer than {MAX_LABEL_LEN} bytes")));
    }
    if let Some(ch) = label
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    if label == "." || label == ".." {
        return Err(invalid("must not be a relative path component".into()));
    }
    Ok(())
}

/// Validate an account identifier. Accounts are opaque, but must be usable
/// as a namespace key.
pub fn validate_account(account: &str) -> Result<()> {
    let ok = !account.is_empty()
        && account
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if !ok {
        return Err(RegistryError::InvalidAccount {
            account: account.to_string(),
            reason: "must be non-empty ASCII alphanumerics, '-', '_' or '.'".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_simple_labels() {
        assert!(validate_label("notes").is_ok());
        assert!(validate_label("notes.v2").is_ok());
        assert!(validate_label("ümlaut").is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(validate_label("").is_err());
    }

    #[test]
    fn reject_too_long() {
        assert!(validate_label(&"x".repeat(MAX_LABEL_LEN)).is_ok());
        assert!(validate_label(&"x".repeat(MAX_LABEL_LEN + 1)).is_err());
    }

    #[test]
    fn reject_whitespace_and_control() {
        assert!(validate_label("has space").is_err());
        assert!(validate_label("tab\there").is_err());
        assert!(validate_label("bell\u{7}").is_err());
    }

    #[test]
    fn reject_slashes() {
        assert!(validate_label("a/b").is_err());
        assert!(validate_label("a\\b").is_err());
    }

    #[test]
    fn reject_dot_components() {
        assert!(validate_label(".").is_err());
        assert!(validate_label("..").is_err());
    }

    #[test]
    fn accounts() {
        assert!(validate_account(&"ab".repeat(32)).is_ok());
        assert!(validate_account("").is_err());
        assert!(validate_account("bad account").is_err());
    }
}
