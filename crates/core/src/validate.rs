//! Small field checks shared by the form drafts.

use crate::error::ValidationErrors;

/// Record `message` for `field` when `value` is blank.
pub fn require_non_empty(errors: &mut ValidationErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
///
/// The API performs real validation; this only catches obvious typos before
/// a request is sent.
pub fn is_plausible_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Record an email error for `field`: required when blank, otherwise shape-checked.
pub fn require_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "Email is required");
    } else if !is_plausible_email(value) {
        errors.add(field, "Email address is invalid");
    }
}
