use std::collections::HashMap;

use flockr_types::models::{ChannelId, MessageId, UserId};

use crate::models::{ChannelRecord, MessageRecord, UserRecord};

/// Everything the Store holds. Only reachable through the lock in
/// [`crate::Store`].
#[derive(Debug, Default)]
pub struct StoreState {
    pub users: Vec<UserRecord>,
    pub channels: Vec<ChannelRecord>,
    /// Outstanding password-reset codes -> owning user.
    pub reset_codes: HashMap<String, UserId>,
    last_message_id: MessageId,
    /// Survives `clear` so timers scheduled before a reset never match a
    /// standup started after it.
    last_standup_epoch: u64,
}

impl StoreState {
    // -- Users --

    pub fn user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut UserRecord> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn email_taken(&self, email: &str) -> bool {
        self.user_by_email(email).is_some()
    }

    pub fn handle_taken(&self, handle: &str) -> bool {
        self.users.iter().any(|u| u.handle == handle)
    }

    /// Smallest positive id not held by any user.
    pub fn next_user_id(&self) -> UserId {
        let mut id = 1;
        while self.user(id).is_some() {
            id += 1;
        }
        id
    }

    // -- Channels --

    pub fn channel(&self, id: ChannelId) -> Option<&ChannelRecord> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut ChannelRecord> {
        self.channels.iter_mut().find(|c| c.id == id)
    }

    pub fn next_channel_id(&self) -> ChannelId {
        self.channels.len() as ChannelId + 1
    }

    // -- Messages --

    /// Locates a message anywhere in the store.
    pub fn find_message(&self, id: MessageId) -> Option<(&ChannelRecord, &MessageRecord)> {
        self.channels
            .iter()
            .find_map(|c| c.message(id).map(|m| (c, m)))
    }

    pub fn channel_of_message(&self, id: MessageId) -> Option<ChannelId> {
        self.find_message(id).map(|(c, _)| c.id)
    }

    pub fn issue_message_id(&mut self) -> MessageId {
        self.last_message_id += 1;
        self.last_message_id
    }

    // -- Standups --

    pub fn issue_standup_epoch(&mut self) -> u64 {
        self.last_standup_epoch += 1;
        self.last_standup_epoch
    }

    pub fn clear(&mut self) {
        let last_standup_epoch = self.last_standup_epoch;
        *self = Self {
            last_standup_epoch,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use flockr_types::models::{GlobalRole, Visibility};

    use super::*;

    fn user(id: UserId, email: &str, handle: &str) -> UserRecord {
        UserRecord {
            id,
            email: email.into(),
            password_hash: String::new(),
            name_first: "A".into(),
            name_last: "B".into(),
            handle: handle.into(),
            session: None,
            role: GlobalRole::Member,
            avatar_url: None,
            reset_code: None,
        }
    }

    #[test]
    fn next_user_id_fills_gaps() {
        let mut state = StoreState::default();
        assert_eq!(state.next_user_id(), 1);
        state.users.push(user(1, "a@x.com", "ab0"));
        state.users.push(user(3, "c@x.com", "ab1"));
        assert_eq!(state.next_user_id(), 2);
    }

    #[test]
    fn message_ids_increase_across_channels() {
        let mut state = StoreState::default();
        let a = state.issue_message_id();
        let b = state.issue_message_id();
        assert!(b > a);
    }

    #[test]
    fn find_message_reports_its_channel() {
        let mut state = StoreState::default();
        let mut ch = ChannelRecord::new(1, "one".into(), Visibility::Public, 1);
        ch.messages.push_front(MessageRecord::new(7, 1, "hi".into(), 0));
        state.channels.push(ch);
        state.channels.push(ChannelRecord::new(2, "two".into(), Visibility::Public, 1));

        assert_eq!(state.channel_of_message(7), Some(1));
        assert_eq!(state.channel_of_message(8), None);
    }

    #[test]
    fn clear_resets_collections_but_not_standup_epochs() {
        let mut state = StoreState::default();
        state.users.push(user(1, "a@x.com", "ab0"));
        state.reset_codes.insert("code".into(), 1);
        state.issue_message_id();
        let epoch = state.issue_standup_epoch();

        state.clear();

        assert!(state.users.is_empty());
        assert!(state.reset_codes.is_empty());
        assert_eq!(state.issue_message_id(), 1);
        assert!(state.issue_standup_epoch() > epoch);
    }
}
