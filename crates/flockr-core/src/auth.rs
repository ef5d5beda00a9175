use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{debug, info};

use flockr_store::StoreState;
use flockr_store::models::UserRecord;
use flockr_types::api::AuthResponse;
use flockr_types::models::{GlobalRole, UserId};

use crate::Flockr;
use crate::error::{FlockrError, Result};
use crate::session::new_session_id;
use crate::validate;

/// Base handles are cut here, leaving room for a numeric suffix within the
/// 20-character handle limit.
const HANDLE_BASE_CHARS: usize = 17;
const RESET_CODE_CHARS: usize = 8;

impl Flockr {
    pub fn register(
        &self,
        email: &str,
        password: &str,
        name_first: &str,
        name_last: &str,
    ) -> Result<AuthResponse> {
        validate::email(email)?;
        if self.store().with_state(|state| state.email_taken(email)) {
            return Err(FlockrError::validation(
                "The email you are using already has an account",
            ));
        }
        validate::password(password)?;
        if !validate::name(name_first) || !validate::name(name_last) {
            return Err(FlockrError::validation(
                "Please enter a first and last name between 1 and 50 characters each.",
            ));
        }

        // Hash before taking the lock; Argon2 is deliberately slow.
        let password_hash = self.hash_password(password)?;
        let session = new_session_id();

        let user_id = self.store().with_state_mut(|state| {
            // Re-check under the lock in case of a concurrent registration.
            if state.email_taken(email) {
                return Err(FlockrError::validation(
                    "The email you are using already has an account",
                ));
            }

            let id = state.next_user_id();
            let role = if state.users.is_empty() {
                GlobalRole::Owner
            } else {
                GlobalRole::Member
            };
            let handle = derive_handle(state, name_first, name_last);

            state.users.push(UserRecord {
                id,
                email: email.to_string(),
                password_hash,
                name_first: name_first.to_string(),
                name_last: name_last.to_string(),
                handle,
                session: Some(session.clone()),
                role,
                avatar_url: None,
                reset_code: None,
            });
            Ok(id)
        })?;

        info!("Registered user {} ({})", user_id, email);

        Ok(AuthResponse {
            u_id: user_id,
            token: self.sessions().sign(user_id, &session)?,
        })
    }

    /// Starts a fresh session. Any token issued for an earlier session of the
    /// same account stops working.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let (user_id, stored_hash) = self.store().with_state(|state| {
            state
                .user_by_email(email)
                .map(|u| (u.id, u.password_hash.clone()))
                .ok_or_else(|| {
                    FlockrError::not_found("The email you have entered doesn't have an account.")
                })
        })?;

        if !verify_password(password, &stored_hash) {
            return Err(FlockrError::auth(
                "The password you entered doesn't match your email.",
            ));
        }

        let session = new_session_id();
        self.store().with_state_mut(|state| {
            let user = state
                .user_mut(user_id)
                .filter(|u| u.password_hash == stored_hash)
                .ok_or_else(FlockrError::not_authorised)?;
            user.session = Some(session.clone());
            Ok(())
        })?;

        info!("User {} logged in", user_id);

        Ok(AuthResponse {
            u_id: user_id,
            token: self.sessions().sign(user_id, &session)?,
        })
    }

    /// Ends the token's session. Never fails: an invalid or already inactive
    /// token yields `false`.
    pub fn logout(&self, token: &str) -> bool {
        self.store().with_state_mut(|state| {
            let Ok(user_id) = self.sessions().authenticate(state, token) else {
                debug!("Logout with inactive token ignored");
                return false;
            };
            if let Some(user) = state.user_mut(user_id) {
                user.session = None;
            }
            info!("User {} logged out", user_id);
            true
        })
    }

    /// Issues a single-use reset code for `email` and mails it. `None` when
    /// no account has that email.
    pub fn password_reset_request(&self, email: &str) -> Option<String> {
        let code = self.store().with_state_mut(|state| {
            let user_id = state.user_by_email(email)?.id;
            let code = unique_reset_code(state);

            let user = state.user_mut(user_id)?;
            let previous = user.reset_code.replace(code.clone());
            if let Some(previous) = previous {
                state.reset_codes.remove(&previous);
            }
            state.reset_codes.insert(code.clone(), user_id);
            Some(code)
        });

        match &code {
            Some(code) => self.inner.mailer.send_reset_email(email, code),
            None => debug!("Password reset requested for unknown email"),
        }
        code
    }

    pub fn password_reset_complete(&self, reset_code: &str, new_password: &str) -> Result<()> {
        validate::password(new_password)?;

        let user_id = self
            .store()
            .with_state(|state| state.reset_codes.get(reset_code).copied())
            .ok_or_else(|| FlockrError::not_found("The code you've entered is invalid."))?;

        let password_hash = self.hash_password(new_password)?;

        self.store().with_state_mut(|state| {
            // The code may have been consumed while we were hashing.
            if state.reset_codes.get(reset_code) != Some(&user_id) {
                return Err(FlockrError::not_found("The code you've entered is invalid."));
            }
            state.reset_codes.remove(reset_code);
            let user = state
                .user_mut(user_id)
                .ok_or_else(|| FlockrError::not_found("The code you've entered is invalid."))?;
            user.reset_code = None;
            user.password_hash = password_hash;
            Ok(())
        })?;

        info!("Password reset for user {}", user_id);
        Ok(())
    }

    /// Id of the user behind `token`.
    pub fn whoami(&self, token: &str) -> Result<UserId> {
        self.store()
            .with_state(|state| self.sessions().authenticate(state, token))
    }

    pub(crate) fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.inner
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| FlockrError::validation(format!("Unable to store password: {}", e)))
    }
}

/// The stored PHC string carries its own parameters and salt.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// lowercase(first + last), cut to 17 characters, plus the smallest numeric
/// suffix (starting at 0) that no user holds yet.
fn derive_handle(state: &StoreState, name_first: &str, name_last: &str) -> String {
    let base: String = format!("{}{}", name_first, name_last)
        .to_lowercase()
        .chars()
        .take(HANDLE_BASE_CHARS)
        .collect();

    (0u32..)
        .map(|i| format!("{}{}", base, i))
        .find(|candidate| !state.handle_taken(candidate))
        .unwrap_or(base)
}

fn unique_reset_code(state: &StoreState) -> String {
    let mut rng = rand::rng();
    loop {
        let code: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(RESET_CODE_CHARS)
            .map(char::from)
            .collect();
        if !state.reset_codes.contains_key(&code) {
            return code;
        }
    }
}
