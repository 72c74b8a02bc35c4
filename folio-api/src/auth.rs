use crate::{Error, User};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_USERNAME_LEN: usize = 50;

/// Where the browser is sent to start the GitHub OAuth2 flow
pub const GITHUB_LOGIN_PATH: &str = "/oauth2/authorization/github";

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct NewSession {
    pub username: String,
    pub password: String,
}

impl NewSession {
    pub fn new(username: String, password: String) -> NewSession {
        NewSession { username, password }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.username.trim().is_empty() {
            return Err(Error::InvalidName(self.username.clone()));
        }
        if self.password.is_empty() {
            return Err(Error::PasswordTooShort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Error> {
        let name_ok = !self.username.is_empty()
            && self.username.chars().count() <= MAX_USERNAME_LEN
            && self
                .username
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
        if !name_ok {
            return Err(Error::InvalidName(self.username.clone()));
        }
        if !self.email.is_empty() && !looks_like_email(&self.email) {
            return Err(Error::InvalidEmail(self.email.clone()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::PasswordTooShort);
        }
        Ok(())
    }

    /// Validation for sign-up forms that ask for the password twice
    pub fn validate_confirmed(&self, confirmation: &str) -> Result<(), Error> {
        self.validate()?;
        if self.password != confirmation {
            return Err(Error::PasswordMismatch);
        }
        Ok(())
    }
}

/// `local@domain.tld`, with no whitespace anywhere
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain
                    .rsplit_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// JWT handed out by the backend, sent back as a bearer token
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

/// Body of a successful login or registration
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Session {
    pub token: AuthToken,
    #[serde(default)]
    pub user: Option<User>,
}
