use super::client::{ApiClient, ApiError};
use crate::session::Session;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Shortest password the profile form accepts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("New password must be at least {} characters long", MIN_PASSWORD_LEN)]
    TooShort,
    #[error("New password must contain at least one lowercase letter")]
    NoLowercase,
    #[error("New password must contain at least one uppercase letter")]
    NoUppercase,
    #[error("New password must contain at least one number")]
    NoDigit,
    #[error("New password and confirmation do not match")]
    Mismatch,
}

/// Strength rules for a new password, then the confirmation check.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordError::NoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordError::NoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::NoDigit);
    }
    if password != confirmation {
        return Err(PasswordError::Mismatch);
    }
    Ok(())
}

/// Body of `POST user/update`. The password pair is only sent when set.
#[derive(Debug, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub profile_pic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "expose")]
    password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "expose")]
    password_confirmation: Option<SecretString>,
}

fn expose<S: Serializer>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

impl ProfileUpdate {
    /// Start from the current profile.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            profile_pic: user.profile_pic.clone(),
            password: None,
            password_confirmation: None,
        }
    }

    /// Attach a password change after checking it.
    pub fn with_password(
        mut self,
        password: SecretString,
        confirmation: SecretString,
    ) -> Result<Self, PasswordError> {
        validate_new_password(password.expose_secret(), confirmation.expose_secret())?;
        self.password = Some(password);
        self.password_confirmation = Some(confirmation);
        Ok(self)
    }

    pub fn changes_password(&self) -> bool {
        self.password.is_some()
    }
}

/// Credentials for `POST login`. Debug output hides the password.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    user: Option<User>,
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, ApiError> {
        let request = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let response: LoginResponse = self
            .post_json("login", &request, None)
            .await
            .map_err(|e| match e {
                // No session yet, so a 401 here means bad credentials
                ApiError::Unauthorized => ApiError::Rejected {
                    status: 401,
                    message: "Invalid email or password".to_string(),
                },
                other => other,
            })?;
        if response.token.is_empty() {
            return Err(ApiError::Unsuccessful);
        }

        tracing::info!(email = %email, "Logged in");
        let session = Session::new(SecretString::from(response.token));
        Ok(match response.user {
            Some(user) => session.with_user(user),
            None => session,
        })
    }

    /// Invalidate the token server-side.
    pub async fn logout(&self, session: &Session) -> Result<(), ApiError> {
        self.post_empty("logout", Some(session)).await
    }

    /// Fetch the user the token belongs to. Used to validate stored tokens.
    pub async fn current_user(&self, session: &Session) -> Result<User, ApiError> {
        self.get_json("user", Some(session)).await
    }

    /// Update name, email and picture, plus the password when one is attached.
    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        self.post_unit("user/update", update, Some(session)).await?;
        tracing::info!(
            email = %update.email,
            password_changed = update.changes_password(),
            "Updated profile"
        );
        Ok(())
    }
}
