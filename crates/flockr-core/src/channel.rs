use tracing::{debug, info};

use flockr_store::StoreState;
use flockr_store::models::ChannelRecord;
use flockr_types::api::{ChannelDetails, MessagesPage};
use flockr_types::models::{ChannelId, UserId};

use crate::error::{FlockrError, Result};
use crate::{Flockr, views};

/// Messages returned per history page.
pub const PAGE_SIZE: usize = 50;

pub(crate) fn existing_channel(state: &StoreState, channel_id: ChannelId) -> Result<&ChannelRecord> {
    state
        .channel(channel_id)
        .ok_or_else(|| FlockrError::not_found("Please enter a valid channel id"))
}

pub(crate) fn existing_channel_mut(
    state: &mut StoreState,
    channel_id: ChannelId,
) -> Result<&mut ChannelRecord> {
    state
        .channel_mut(channel_id)
        .ok_or_else(|| FlockrError::not_found("Please enter a valid channel id"))
}

pub(crate) fn is_global_owner(state: &StoreState, user_id: UserId) -> bool {
    state.user(user_id).is_some_and(|u| u.is_global_owner())
}

fn existing_user(state: &StoreState, user_id: UserId) -> Result<()> {
    match state.user(user_id) {
        Some(_) => Ok(()),
        None => Err(FlockrError::not_found("Please enter a valid user id")),
    }
}

impl Flockr {
    /// Adds `u_id` to the channel. Only members may invite; inviting an
    /// existing member does nothing.
    pub fn channel_invite(&self, token: &str, channel_id: ChannelId, u_id: UserId) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            existing_channel(state, channel_id)?;
            existing_user(state, u_id)?;

            let channel = existing_channel_mut(state, channel_id)?;
            if !channel.is_member(caller) {
                return Err(FlockrError::not_authorised());
            }
            if channel.add_member(u_id) {
                info!("User {} invited {} to channel {}", caller, u_id, channel_id);
            } else {
                debug!("User {} already in channel {}", u_id, channel_id);
            }
            Ok(())
        })
    }

    pub fn channel_details(&self, token: &str, channel_id: ChannelId) -> Result<ChannelDetails> {
        self.store().with_state(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let channel = existing_channel(state, channel_id)?;
            if !channel.is_member(caller) {
                return Err(FlockrError::auth("User is not a member of this channel"));
            }

            let render = |ids: &[UserId]| {
                ids.iter()
                    .filter_map(|&id| state.user(id))
                    .map(views::member)
                    .collect()
            };

            Ok(ChannelDetails {
                name: channel.name.clone(),
                owner_members: render(&channel.owners),
                all_members: render(&channel.members),
            })
        })
    }

    /// Up to [`PAGE_SIZE`] messages, newest first, starting `start` messages
    /// back from the newest. `end` is `-1` once the oldest message is
    /// included.
    pub fn channel_messages(&self, token: &str, channel_id: ChannelId, start: i64) -> Result<MessagesPage> {
        self.store().with_state(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let channel = existing_channel(state, channel_id)?;

            let total = channel.messages.len() as i64;
            if start < 0 || start > total {
                return Err(FlockrError::validation("Invalid start value"));
            }
            if !channel.is_member(caller) && !is_global_owner(state, caller) {
                return Err(FlockrError::not_authorised());
            }

            let messages: Vec<_> = channel
                .messages
                .iter()
                .skip(start as usize)
                .take(PAGE_SIZE)
                .map(|m| views::message(m, caller))
                .collect();

            let reached = start + messages.len() as i64;
            let end = if reached == total { -1 } else { reached };

            Ok(MessagesPage { messages, start, end })
        })
    }

    /// Removes the caller from the member list. Channel ownership is kept.
    pub fn channel_leave(&self, token: &str, channel_id: ChannelId) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let channel = existing_channel_mut(state, channel_id)?;
            if !channel.is_member(caller) {
                return Err(FlockrError::auth("Current user is not a member of channel"));
            }
            channel.remove_member(caller);
            info!("User {} left channel {}", caller, channel_id);
            Ok(())
        })
    }

    /// Public channels are open to everyone; private ones only to global
    /// owners.
    pub fn channel_join(&self, token: &str, channel_id: ChannelId) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let global_owner = is_global_owner(state, caller);
            let channel = existing_channel_mut(state, channel_id)?;

            if !channel.visibility.is_public() && !global_owner {
                return Err(FlockrError::auth("Channel is private"));
            }
            if channel.add_member(caller) {
                info!("User {} joined channel {}", caller, channel_id);
            }
            Ok(())
        })
    }

    pub fn channel_addowner(&self, token: &str, channel_id: ChannelId, u_id: UserId) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            existing_channel(state, channel_id)?;
            existing_user(state, u_id)?;
            let global_owner = is_global_owner(state, caller);

            let channel = existing_channel_mut(state, channel_id)?;
            if !channel.is_owner(caller) && !global_owner {
                return Err(FlockrError::auth(
                    "Current user is not a flockr nor channel owner",
                ));
            }
            if !channel.add_owner(u_id) {
                return Err(FlockrError::validation("User is already an owner of the channel"));
            }
            info!("User {} made {} an owner of channel {}", caller, u_id, channel_id);
            Ok(())
        })
    }

    pub fn channel_removeowner(&self, token: &str, channel_id: ChannelId, u_id: UserId) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let global_owner = is_global_owner(state, caller);

            let channel = existing_channel_mut(state, channel_id)?;
            if !channel.is_owner(caller) && !global_owner {
                return Err(FlockrError::auth(
                    "Current user is not a flockr nor channel owner",
                ));
            }
            if !channel.remove_owner(u_id) {
                return Err(FlockrError::validation("User is not owner of channel"));
            }
            info!("User {} removed {} as owner of channel {}", caller, u_id, channel_id);
            Ok(())
        })
    }
}
