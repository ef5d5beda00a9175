use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FlockrError, Result};

pub const MAX_MESSAGE_CHARS: usize = 1000;
pub const MAX_CHANNEL_NAME_CHARS: usize = 20;
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+[\._]?[a-z0-9]+[@]\w+[.]\w{2,3}$").expect("email pattern is valid")
});

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn email(email: &str) -> Result<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(FlockrError::validation("Please enter a valid email address."));
    }
    Ok(())
}

pub fn password(password: &str) -> Result<()> {
    if char_len(password) < MIN_PASSWORD_CHARS {
        return Err(FlockrError::validation(
            "Please enter a password with 6 or more characters.",
        ));
    }
    Ok(())
}

pub fn name(name: &str) -> bool {
    (1..=50).contains(&char_len(name))
}

pub fn handle(handle: &str) -> Result<()> {
    if !(3..=20).contains(&char_len(handle)) {
        return Err(FlockrError::validation("Please enter a valid handle."));
    }
    Ok(())
}

pub fn message_body(body: &str) -> Result<()> {
    if char_len(body) > MAX_MESSAGE_CHARS {
        return Err(FlockrError::validation("Message longer than 1000 characters"));
    }
    Ok(())
}

pub fn channel_name(name: &str) -> Result<()> {
    if char_len(name) > MAX_CHANNEL_NAME_CHARS {
        return Err(FlockrError::validation(
            "Invalid channel name. Name must not be longer than 20 characters.",
        ));
    }
    Ok(())
}
