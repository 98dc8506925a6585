use crate::error::ValidationError;
use crate::models::session::Role;

/// Checks that a required login field was filled in.
///
/// # Arguments
///
/// * `field` - The field name reported on failure.
/// * `value` - The submitted value.
///
/// # Returns
///
/// `Ok(())` when the value is non-empty. Whitespace counts as content.
pub fn require_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }

    Ok(())
}

/// Validates a submitted login form.
///
/// Fields are checked in form order: username, password, role.
///
/// # Returns
///
/// The parsed [`Role`] when every field is present.
pub fn validate_login_form(
    username: &str,
    password: &str,
    role: &str,
) -> Result<Role, ValidationError> {
    require_field("username", username)?;
    require_field("password", password)?;
    require_field("role", role)?;

    role.parse()
}
