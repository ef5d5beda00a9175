pub mod auth;
pub mod avatar;
pub mod channel;
pub mod channels;
pub mod clock;
pub mod config;
pub mod error;
pub mod mail;
pub mod message;
pub mod other;
pub mod session;
pub mod standup;
pub mod user;

mod validate;
mod views;

use std::sync::Arc;

use argon2::Argon2;
use tracing::{info, warn};

use flockr_store::Store;

pub use crate::avatar::{AvatarStore, CropBox, NoAvatars};
pub use crate::clock::{Clock, SystemClock};
pub use crate::config::{FlockrConfig, HashingCost};
pub use crate::error::{ErrorKind, FlockrError, Result};
pub use crate::mail::{LogMailer, MailSender};

use crate::session::SessionKeys;

/// Handle to the whole domain. Cheap to clone; every clone shares one store.
#[derive(Clone)]
pub struct Flockr {
    inner: Arc<FlockrInner>,
}

struct FlockrInner {
    store: Store,
    sessions: SessionKeys,
    hasher: Argon2<'static>,
    clock: Arc<dyn Clock>,
    mailer: Arc<dyn MailSender>,
    avatars: Arc<dyn AvatarStore>,
}

impl Flockr {
    pub fn builder(config: FlockrConfig) -> FlockrBuilder {
        FlockrBuilder {
            config,
            clock: Arc::new(SystemClock),
            mailer: Arc::new(LogMailer),
            avatars: Arc::new(NoAvatars),
        }
    }

    /// Resets the service to its just-started state: users, channels,
    /// messages, reset codes and stored avatar files. Idempotent.
    pub async fn clear(&self) {
        self.inner.store.clear();
        if let Err(e) = self.inner.avatars.purge().await {
            warn!("Failed to purge avatar files: {}", e);
        }
    }

    fn store(&self) -> &Store {
        &self.inner.store
    }

    fn sessions(&self) -> &SessionKeys {
        &self.inner.sessions
    }

    fn now(&self) -> i64 {
        self.inner.clock.now_timestamp()
    }
}

pub struct FlockrBuilder {
    config: FlockrConfig,
    clock: Arc<dyn Clock>,
    mailer: Arc<dyn MailSender>,
    avatars: Arc<dyn AvatarStore>,
}

impl FlockrBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn MailSender>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn avatars(mut self, avatars: Arc<dyn AvatarStore>) -> Self {
        self.avatars = avatars;
        self
    }

    pub fn build(self) -> anyhow::Result<Flockr> {
        let hasher = self.config.hashing.hasher()?;
        let sessions = SessionKeys::new(
            &self.config.jwt_secret,
            self.config.session_ttl,
            self.clock.clone(),
        );

        info!(
            "Flockr domain ready (session ttl {}h)",
            self.config.session_ttl.num_hours()
        );

        Ok(Flockr {
            inner: Arc::new(FlockrInner {
                store: Store::new(),
                sessions,
                hasher,
                clock: self.clock,
                mailer: self.mailer,
                avatars: self.avatars,
            }),
        })
    }
}
