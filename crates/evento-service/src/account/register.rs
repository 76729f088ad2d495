use evento_core::constants::ATTENDEES_GROUP;
use evento_db::db::store::AccountStore;
use evento_db::error::DbError;
use evento_db::model::user::{NewAccount, User};
use serde::Deserialize;

use crate::auth::password::hash_password_blocking;
use crate::error::{ServiceError, ServiceResult};
use crate::validation::ValidationErrors;

const USERNAME_MAX_LEN: usize = 150;
const NAME_MAX_LEN: usize = 150;
const REQUIRED: &str = "This field is required.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Registration form. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    /// ## Summary
    /// Checks every field and returns the account to create.
    ///
    /// ## Errors
    /// Returns every field error found, not only the first.
    pub fn validate(&self) -> Result<NewAccount, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = self.username.trim();
        let email = self.email.trim();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > USERNAME_MAX_LEN {
            errors.add(
                "username",
                format!("Ensure this value has at most {USERNAME_MAX_LEN} characters."),
            );
        } else if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if !email.is_empty() && !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.trim().chars().count() > NAME_MAX_LEN {
                errors.add(
                    field,
                    format!("Ensure this value has at most {NAME_MAX_LEN} characters."),
                );
            }
        }

        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result()?;
        Ok(NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            is_superuser: false,
            is_staff: false,
        })
    }
}

/// ## Summary
/// Registers a new user and adds it to the attendees group.
///
/// ## Side Effects
/// - Inserts the user and its password credential
/// - Inserts the attendees membership, creating the group if needed
///
/// ## Errors
/// Returns `Validation` for invalid input or a taken username.
#[tracing::instrument(skip(accounts, form), fields(username = %form.username))]
pub async fn register(accounts: &dyn AccountStore, form: &RegisterForm) -> ServiceResult<User> {
    let account = form.validate()?;

    if accounts
        .find_user_by_username(&account.username)
        .await?
        .is_some()
    {
        return Err(ValidationErrors::single("username", USERNAME_TAKEN).into());
    }

    let hash = hash_password_blocking(form.password.clone()).await?;
    let user = match accounts.create_user(&account, &hash).await {
        Ok(user) => user,
        Err(DbError::Conflict(_)) => {
            return Err(ValidationErrors::single("username", USERNAME_TAKEN).into());
        }
        Err(e) => return Err(ServiceError::from(e)),
    };

    accounts.add_to_group(user.id, ATTENDEES_GROUP).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}
