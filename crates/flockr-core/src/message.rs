use std::time::Duration;

use tracing::{debug, info};

use flockr_store::StoreState;
use flockr_store::models::MessageRecord;
use flockr_types::models::{ChannelId, MessageId, SUPPORTED_REACTS, UserId};

use crate::channel::{existing_channel, existing_channel_mut, is_global_owner};
use crate::error::{FlockrError, Result};
use crate::{Flockr, validate};

/// Appends a message on behalf of `author`. Shared by direct sends, scheduled
/// sends and standup summaries.
pub(crate) fn post_message(
    state: &mut StoreState,
    author: UserId,
    channel_id: ChannelId,
    body: &str,
    now: i64,
) -> Result<MessageId> {
    validate::message_body(body)?;
    let channel = existing_channel(state, channel_id)?;
    if !channel.is_member(author) && !is_global_owner(state, author) {
        return Err(FlockrError::auth("User has not joined the channel"));
    }

    let id = state.issue_message_id();
    let channel = existing_channel_mut(state, channel_id)?;
    channel
        .messages
        .push_front(MessageRecord::new(id, author, body.to_string(), now));

    debug!("Message {} posted to channel {} by {}", id, channel_id, author);
    Ok(id)
}

fn message_not_found() -> FlockrError {
    FlockrError::not_found("Message does not exist")
}

/// Channel holding the message, or NotFound.
fn locate(state: &StoreState, message_id: MessageId) -> Result<ChannelId> {
    state.channel_of_message(message_id).ok_or_else(message_not_found)
}

/// Sender, channel owner or global owner.
fn may_modify(
    state: &StoreState,
    caller: UserId,
    channel_id: ChannelId,
    message_id: MessageId,
) -> Result<()> {
    let channel = existing_channel(state, channel_id)?;
    let message = channel.message(message_id).ok_or_else(message_not_found)?;

    if message.author == caller || channel.is_owner(caller) || is_global_owner(state, caller) {
        Ok(())
    } else {
        Err(FlockrError::auth(
            "User is not the sender, a channel owner or a flockr owner",
        ))
    }
}

fn supported_react(react_id: u32) -> Result<()> {
    if !SUPPORTED_REACTS.contains(&react_id) {
        return Err(FlockrError::validation("Invalid react id"));
    }
    Ok(())
}

impl Flockr {
    pub fn message_send(&self, token: &str, channel_id: ChannelId, body: &str) -> Result<MessageId> {
        let now = self.now();
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            post_message(state, caller, channel_id, body, now)
        })
    }

    pub fn message_remove(&self, token: &str, message_id: MessageId) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let channel_id = locate(state, message_id)?;
            may_modify(state, caller, channel_id, message_id)?;

            existing_channel_mut(state, channel_id)?
                .remove_message(message_id)
                .ok_or_else(message_not_found)?;
            debug!("Message {} removed by {}", message_id, caller);
            Ok(())
        })
    }

    /// Replaces the body. An empty body removes the message.
    pub fn message_edit(&self, token: &str, message_id: MessageId, body: &str) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let channel_id = locate(state, message_id)?;
            validate::message_body(body)?;
            may_modify(state, caller, channel_id, message_id)?;

            let channel = existing_channel_mut(state, channel_id)?;
            if body.is_empty() {
                channel.remove_message(message_id);
                debug!("Message {} cleared by {}", message_id, caller);
            } else if let Some(message) = channel.message_mut(message_id) {
                message.body = body.to_string();
                debug!("Message {} edited by {}", message_id, caller);
            }
            Ok(())
        })
    }

    /// Posts `body` at `send_at` (unix seconds) and resolves to the new
    /// message id once it has been posted.
    ///
    /// Input is checked up front; the deferred send runs the ordinary send
    /// path with the same token, so a session that ends in the meantime
    /// fails the send. Dropping the returned future does not cancel it.
    pub async fn message_sendlater(
        &self,
        token: &str,
        channel_id: ChannelId,
        body: &str,
        send_at: i64,
    ) -> Result<MessageId> {
        let now = self.now();
        self.store().with_state(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            validate::message_body(body)?;
            let channel = existing_channel(state, channel_id)?;
            if !channel.is_member(caller) {
                return Err(FlockrError::auth("User has not joined the channel"));
            }
            if send_at < now {
                return Err(FlockrError::validation("Time sent is a time in the past"));
            }
            Ok(())
        })?;

        let delay = Duration::from_secs((send_at - now) as u64);
        info!("Message to channel {} scheduled in {}s", channel_id, delay.as_secs());

        let flockr = self.clone();
        let token = token.to_string();
        let body = body.to_string();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flockr.message_send(&token, channel_id, &body)
        });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(FlockrError::validation("Scheduled message was cancelled")),
        }
    }

    pub fn message_pin(&self, token: &str, message_id: MessageId) -> Result<()> {
        self.set_pinned(token, message_id, true)
    }

    pub fn message_unpin(&self, token: &str, message_id: MessageId) -> Result<()> {
        self.set_pinned(token, message_id, false)
    }

    fn set_pinned(&self, token: &str, message_id: MessageId, pinned: bool) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let (channel, message) = state.find_message(message_id).ok_or_else(message_not_found)?;

            if message.pinned == pinned {
                return Err(FlockrError::validation(if pinned {
                    "Message is already pinned"
                } else {
                    "Message is not pinned"
                }));
            }
            if !channel.is_member(caller) {
                return Err(FlockrError::auth("User is not a member of the channel"));
            }
            if !channel.is_owner(caller) && !is_global_owner(state, caller) {
                return Err(FlockrError::auth("User is not an owner of the channel"));
            }

            let channel_id = channel.id;
            if let Some(message) = existing_channel_mut(state, channel_id)?.message_mut(message_id) {
                message.pinned = pinned;
            }
            debug!("Message {} pinned={} by {}", message_id, pinned, caller);
            Ok(())
        })
    }

    pub fn message_react(&self, token: &str, message_id: MessageId, react_id: u32) -> Result<()> {
        self.set_reaction(token, message_id, react_id, true)
    }

    pub fn message_unreact(&self, token: &str, message_id: MessageId, react_id: u32) -> Result<()> {
        self.set_reaction(token, message_id, react_id, false)
    }

    fn set_reaction(&self, token: &str, message_id: MessageId, react_id: u32, add: bool) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;

            let channel_id = match state.find_message(message_id) {
                Some((channel, _)) if channel.is_member(caller) => channel.id,
                _ => {
                    return Err(FlockrError::validation(
                        "Message is not in a channel the user has joined",
                    ));
                }
            };
            supported_react(react_id)?;

            let message = existing_channel_mut(state, channel_id)?
                .message_mut(message_id)
                .ok_or_else(message_not_found)?;

            let changed = if add {
                message.add_reaction(react_id, caller)
            } else {
                message.remove_reaction(react_id, caller)
            };
            if !changed {
                return Err(FlockrError::validation(if add {
                    "User has already reacted to this message"
                } else {
                    "User has not reacted to this message"
                }));
            }
            Ok(())
        })
    }
}
