use std::time::Duration;

use tracing::{debug, info, warn};

use flockr_store::models::{StandupLine, StandupState};
use flockr_types::api::{StandupStarted, StandupStatus};
use flockr_types::models::{ChannelId, MessageId};

use crate::channel::{existing_channel, existing_channel_mut};
use crate::error::{FlockrError, Result};
use crate::message::post_message;
use crate::{Flockr, validate};

fn not_a_member() -> FlockrError {
    FlockrError::auth("User is not a member of this channel")
}

impl Flockr {
    /// Opens a standup window of `length` seconds. When it closes, the
    /// collected lines are posted as one message from the starter.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn standup_start(
        &self,
        token: &str,
        channel_id: ChannelId,
        length: i64,
    ) -> Result<StandupStarted> {
        let now = self.now();
        let (time_finish, epoch) = self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let channel = existing_channel(state, channel_id)?;
            if !channel.is_member(caller) {
                return Err(not_a_member());
            }
            if channel.standup.active {
                return Err(FlockrError::validation(
                    "An active standup is currently running in this channel",
                ));
            }
            if length < 0 {
                return Err(FlockrError::validation("Standup length must not be negative"));
            }
            let time_finish = now
                .checked_add(length)
                .ok_or_else(|| FlockrError::validation("Standup length is too long"))?;

            let epoch = state.issue_standup_epoch();
            existing_channel_mut(state, channel_id)?.standup = StandupState {
                active: true,
                time_finish: Some(time_finish),
                starter: Some(caller),
                buffer: Vec::new(),
                epoch,
            };
            Ok((time_finish, epoch))
        })?;

        info!("Standup {} started in channel {}, ends at {}", epoch, channel_id, time_finish);

        let flockr = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(length as u64)).await;
            flockr.flush_standup(channel_id, epoch);
        });

        Ok(StandupStarted { time_finish })
    }

    pub fn standup_active(&self, token: &str, channel_id: ChannelId) -> Result<StandupStatus> {
        self.store().with_state(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let channel = existing_channel(state, channel_id)?;
            if !channel.is_member(caller) {
                return Err(not_a_member());
            }
            let standup = &channel.standup;
            Ok(StandupStatus {
                is_active: standup.active,
                time_finish: standup.time_finish.filter(|_| standup.active),
            })
        })
    }

    /// Buffers a line for the running standup under the caller's handle.
    pub fn standup_send(&self, token: &str, channel_id: ChannelId, body: &str) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let channel = existing_channel(state, channel_id)?;
            if !channel.is_member(caller) {
                return Err(not_a_member());
            }
            validate::message_body(body)?;
            if !channel.standup.active {
                return Err(FlockrError::validation(
                    "An active standup is not currently running in this channel",
                ));
            }

            let handle = state
                .user(caller)
                .map(|u| u.handle.clone())
                .ok_or_else(FlockrError::not_authorised)?;
            existing_channel_mut(state, channel_id)?
                .standup
                .buffer
                .push(StandupLine { handle, body: body.to_string() });
            Ok(())
        })
    }

    /// Closes standup `epoch` and posts its summary, empty if nobody spoke.
    /// Does nothing if that run was already closed or superseded, including
    /// by a clear.
    fn flush_standup(&self, channel_id: ChannelId, epoch: u64) {
        let now = self.now();
        let outcome: Result<Option<MessageId>> = self.store().with_state_mut(|state| {
            let Some(channel) = state.channel_mut(channel_id) else {
                return Ok(None);
            };
            let standup = &mut channel.standup;
            if !standup.active || standup.epoch != epoch {
                return Ok(None);
            }

            standup.active = false;
            standup.time_finish = None;
            let starter = standup.starter.take();
            let lines = std::mem::take(&mut standup.buffer);

            let Some(starter) = starter else {
                return Ok(None);
            };
            let summary: String = lines
                .iter()
                .map(|line| format!("{}: {}\n", line.handle, line.body))
                .collect();

            post_message(state, starter, channel_id, &summary, now).map(Some)
        });

        match outcome {
            Ok(Some(message_id)) => {
                info!("Standup {} in channel {} posted as message {}", epoch, channel_id, message_id)
            }
            Ok(None) => debug!("Standup {} in channel {} was already closed", epoch, channel_id),
            Err(e) => warn!("Standup {} in channel {} could not be posted: {}", epoch, channel_id, e),
        }
    }
}
