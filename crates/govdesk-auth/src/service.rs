//! Authentication service — login orchestration and request
//! authentication.

use govdesk_core::error::{GovError, GovResult};
use govdesk_core::models::user::User;
use govdesk_core::repository::UserRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, AuthContext};

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// The authenticated user, for response shaping.
    pub user: User,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    /// Authenticate a user with email + password and issue a token.
    ///
    /// Lookup failures and password mismatches both collapse to
    /// `InvalidCredentials` so the response does not reveal which
    /// emails exist.
    pub async fn login(&self, input: LoginInput) -> GovResult<LoginOutput> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(u) => u,
            Err(GovError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(|e| GovError::Crypto(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = token::issue_access_token(
            user.id,
            user.tenant_id,
            user.roles.clone(),
            &self.config,
        )?;

        tracing::info!(user_id = %user.id, tenant_id = %user.tenant_id, "login succeeded");

        Ok(LoginOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
            user,
        })
    }

    /// Validate a bearer token and return the request context.
    pub fn authenticate(&self, bearer_token: &str) -> GovResult<AuthContext> {
        token::validate_access_token(bearer_token, &self.config).map_err(Into::into)
    }
}
