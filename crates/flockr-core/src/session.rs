use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;

use flockr_store::StoreState;
use flockr_types::api::Claims;
use flockr_types::models::UserId;

use crate::clock::Clock;
use crate::error::{FlockrError, Result};

/// Signs and verifies the envelope handed to clients. The envelope only
/// carries the user id and an opaque session id; whether that session is
/// still live is decided against the store.
///
/// Expiry is measured on the same clock as every other timestamp.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }

    pub fn sign(&self, user_id: UserId, session_id: &str) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            sid: session_id.to_string(),
            exp: (self.clock.now() + self.ttl).timestamp().max(0) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| FlockrError::auth(format!("Unable to issue session: {}", e)))
    }

    /// `None` for tampered, expired or malformed tokens.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .ok()?
            .claims;
        let now = self.clock.now_timestamp().max(0) as usize;
        (claims.exp > now).then_some(claims)
    }

    /// Resolves a token to the user whose active session it names.
    ///
    /// Every authenticated operation calls this before anything else.
    pub fn authenticate(&self, state: &StoreState, token: &str) -> Result<UserId> {
        let claims = self.verify(token).ok_or_else(FlockrError::not_authorised)?;
        let user = state.user(claims.sub).ok_or_else(FlockrError::not_authorised)?;

        if user.session.as_deref() != Some(claims.sid.as_str()) {
            return Err(FlockrError::not_authorised());
        }

        Ok(user.id)
    }
}

/// 256 bits from the OS-seeded thread RNG, URL-safe.
pub fn new_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    B64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use flockr_store::models::UserRecord;
    use flockr_types::models::GlobalRole;

    use super::*;
    use crate::testing::ManualClock;

    fn state_with_session(session: Option<&str>) -> StoreState {
        let mut state = StoreState::default();
        state.users.push(UserRecord {
            id: 1,
            email: "fiona@example.com".into(),
            password_hash: String::new(),
            name_first: "Fiona".into(),
            name_last: "Wang".into(),
            handle: "fionawang0".into(),
            session: session.map(str::to_string),
            role: GlobalRole::Owner,
            avatar_url: None,
            reset_code: None,
        });
        state
    }

    fn keys() -> SessionKeys {
        SessionKeys::new("test-secret", chrono::Duration::hours(1), ManualClock::at(1_000))
    }

    #[test]
    fn signed_token_resolves_to_its_user() {
        let keys = keys();
        let sid = new_session_id();
        let token = keys.sign(1, &sid).unwrap();
        let state = state_with_session(Some(&sid));

        assert_eq!(keys.authenticate(&state, &token).unwrap(), 1);
    }

    #[test]
    fn inactive_session_is_rejected() {
        let keys = keys();
        let token = keys.sign(1, &new_session_id()).unwrap();

        let logged_out = state_with_session(None);
        assert!(keys.authenticate(&logged_out, &token).is_err());

        let other_session = state_with_session(Some("another"));
        assert!(keys.authenticate(&other_session, &token).is_err());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let sid = new_session_id();
        let other = SessionKeys::new("other-secret", chrono::Duration::hours(1), ManualClock::at(1_000));
        let forged = other.sign(1, &sid).unwrap();

        assert!(keys().verify(&forged).is_none());
        assert!(keys().verify("not a token").is_none());
    }

    #[test]
    fn expiry_follows_the_injected_clock() {
        let clock = ManualClock::at(1_000);
        let keys = SessionKeys::new("test-secret", chrono::Duration::hours(1), clock.clone());
        let sid = new_session_id();
        let token = keys.sign(1, &sid).unwrap();
        let state = state_with_session(Some(&sid));

        assert_eq!(keys.verify(&token).unwrap().exp, 1_000 + 3_600);

        clock.advance(3_599);
        assert_eq!(keys.authenticate(&state, &token).unwrap(), 1);

        clock.advance(1);
        assert!(keys.verify(&token).is_none());
        assert!(keys.authenticate(&state, &token).is_err());
    }

    #[test]
    fn session_ids_are_fresh() {
        assert_ne!(new_session_id(), new_session_id());
    }
}
