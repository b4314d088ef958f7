//! Account credentials for the `/auth` endpoints.
//!
//! The auth service answers 400 when the email or password is missing, so
//! both are checked before a request is sent. Login and registration share
//! the same payload.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

/// Why a credential pair was refused before reaching the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginValidationError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Email and password pair sent to `/auth/login` and `/auth/register`.
///
/// The email is stored trimmed. The password is kept byte for byte, since
/// the server compares it verbatim, and is wiped from memory on drop.
///
/// ```
/// use board_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" a@b.com ", "x").unwrap();
/// assert_eq!(creds.email(), "a@b.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Check raw form input and build the credential pair.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::missing_email("", "pw", LoginValidationError::EmptyEmail)]
    #[case::blank_email("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case::missing_password("a@b.com", "", LoginValidationError::EmptyPassword)]
    #[case::both_missing("", "", LoginValidationError::EmptyEmail)]
    fn incomplete_pairs_are_refused(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        assert_eq!(LoginCredentials::try_from_parts(email, password), Err(expected));
    }

    #[rstest]
    #[case("  a@b.com  ", "x")]
    #[case("reader@books.example", " spaced secret ")]
    fn email_is_trimmed_and_password_kept_verbatim(#[case] email: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(email, password).expect("complete pair");
        assert_eq!(creds.email(), email.trim());
        assert_eq!(creds.password(), password);
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = LoginCredentials::try_from_parts("a@b.com", "hunter2").expect("valid");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"), "password leaked: {rendered}");
        assert!(rendered.contains("a@b.com"));
    }

    #[test]
    fn validation_errors_read_as_messages() {
        assert_eq!(
            LoginValidationError::EmptyPassword.to_string(),
            "password must not be empty"
        );
    }
}
