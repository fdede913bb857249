//! Account Forms
//!
//! Registration, first-admin setup, password reset, admin-created users and
//! the date range required by the report pages.

use chrono::NaiveDate;

use crate::api::{CreateUserArgs, RegisterArgs};
use crate::dates::parse_input_date;
use crate::error::FormError;
use crate::models::Role;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Confirmation must match; `min_len` of 0 skips the length rule
pub fn check_new_password(password: &str, confirm: &str, min_len: usize) -> Result<(), FormError> {
    if password != confirm {
        return Err(FormError::PasswordMismatch);
    }
    if password.chars().count() < min_len {
        return Err(FormError::PasswordTooShort(min_len));
    }
    Ok(())
}

/// Self-registration and first-admin setup share one form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegisterDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
}

impl RegisterDraft {
    pub fn build(&self, min_len: usize) -> Result<RegisterArgs, FormError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Err(FormError::MissingRequiredFields);
        }
        check_new_password(&self.password, &self.confirm_password, min_len)?;
        Ok(RegisterArgs {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            phone: self.phone.trim().to_string(),
        })
    }
}

/// Account created by an admin; the role defaults to `cliente`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewUserDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: String,
}

impl NewUserDraft {
    pub fn build(&self) -> Result<CreateUserArgs, FormError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(FormError::MissingRequiredFields);
        }
        check_new_password(&self.password, &self.password, MIN_PASSWORD_LEN)?;
        Ok(CreateUserArgs {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
            phone: self.phone.trim().to_string(),
        })
    }
}

/// Both ends of a report period, as typed into `<input type="date">`
pub fn require_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), FormError> {
    match (parse_input_date(start), parse_input_date(end)) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(FormError::MissingDateRange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert_eq!(check_new_password("abc123", "abc124", 6), Err(FormError::PasswordMismatch));
        assert_eq!(check_new_password("abc", "abc", 6), Err(FormError::PasswordTooShort(6)));
        assert_eq!(check_new_password("abc", "abc", 0), Ok(()));
        assert_eq!(check_new_password("senhaç", "senhaç", 6), Ok(()));
    }

    #[test]
    fn test_register_draft() {
        let draft = RegisterDraft {
            name: " Ana ".into(),
            email: "ana@x.com".into(),
            password: "segredo".into(),
            confirm_password: "segredo".into(),
            ..Default::default()
        };
        assert_eq!(draft.build(MIN_PASSWORD_LEN).unwrap().name, "Ana");

        let mismatch = RegisterDraft { confirm_password: "outro".into(), ..draft };
        assert!(matches!(mismatch.build(0), Err(FormError::PasswordMismatch)));
    }

    #[test]
    fn test_new_user_needs_six_chars() {
        let draft = NewUserDraft {
            name: "Caio".into(),
            email: "caio@x.com".into(),
            password: "12345".into(),
            ..Default::default()
        };
        assert!(matches!(draft.build(), Err(FormError::PasswordTooShort(6))));
        let ok = NewUserDraft { password: "123456".into(), ..draft };
        assert_eq!(ok.build().unwrap().role, Role::Cliente);
    }

    #[test]
    fn test_require_range() {
        assert_eq!(require_range("2026-10-01", ""), Err(FormError::MissingDateRange));
        let (start, end) = require_range("2026-10-01", "2026-10-15").unwrap();
        assert!(start < end);
    }
}
