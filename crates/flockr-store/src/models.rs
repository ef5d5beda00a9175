//! Store record types. Distinct from the flockr-types wire models so the
//! store can carry server-only fields (password hashes, sessions, reset codes).
use std::collections::{BTreeMap, VecDeque};

use flockr_types::models::{ChannelId, GlobalRole, MessageId, UserId, Visibility};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name_first: String,
    pub name_last: String,
    pub handle: String,
    /// Active session id, `None` while logged out.
    pub session: Option<String>,
    pub role: GlobalRole,
    pub avatar_url: Option<String>,
    pub reset_code: Option<String>,
}

impl UserRecord {
    pub fn is_global_owner(&self) -> bool {
        self.role == GlobalRole::Owner
    }
}

#[derive(Debug, Clone)]
pub struct ChannelRecord {
    pub id: ChannelId,
    pub name: String,
    pub visibility: Visibility,
    pub owners: Vec<UserId>,
    pub members: Vec<UserId>,
    /// Newest first.
    pub messages: VecDeque<MessageRecord>,
    pub standup: StandupState,
}

impl ChannelRecord {
    pub fn new(id: ChannelId, name: String, visibility: Visibility, creator: UserId) -> Self {
        Self {
            id,
            name,
            visibility,
            owners: vec![creator],
            members: vec![creator],
            messages: VecDeque::new(),
            standup: StandupState::default(),
        }
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owners.contains(&user_id)
    }

    /// Returns false if the user was already a member.
    pub fn add_member(&mut self, user_id: UserId) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.members.push(user_id);
        true
    }

    /// Ownership is left untouched.
    pub fn remove_member(&mut self, user_id: UserId) {
        self.members.retain(|&id| id != user_id);
    }

    pub fn add_owner(&mut self, user_id: UserId) -> bool {
        if self.is_owner(user_id) {
            return false;
        }
        self.owners.push(user_id);
        self.add_member(user_id);
        true
    }

    pub fn remove_owner(&mut self, user_id: UserId) -> bool {
        let before = self.owners.len();
        self.owners.retain(|&id| id != user_id);
        self.owners.len() != before
    }

    pub fn message(&self, message_id: MessageId) -> Option<&MessageRecord> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    pub fn message_mut(&mut self, message_id: MessageId) -> Option<&mut MessageRecord> {
        self.messages.iter_mut().find(|m| m.id == message_id)
    }

    pub fn remove_message(&mut self, message_id: MessageId) -> Option<MessageRecord> {
        let idx = self.messages.iter().position(|m| m.id == message_id)?;
        self.messages.remove(idx)
    }
}

#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: MessageId,
    pub author: UserId,
    pub body: String,
    /// Unix seconds, UTC.
    pub created_at: i64,
    pub pinned: bool,
    /// react kind -> users holding that reaction, in reaction order.
    pub reactions: BTreeMap<u32, Vec<UserId>>,
}

impl MessageRecord {
    pub fn new(id: MessageId, author: UserId, body: String, created_at: i64) -> Self {
        Self {
            id,
            author,
            body,
            created_at,
            pinned: false,
            reactions: BTreeMap::new(),
        }
    }

    pub fn has_reacted(&self, kind: u32, user_id: UserId) -> bool {
        self.reactions
            .get(&kind)
            .is_some_and(|users| users.contains(&user_id))
    }

    /// Returns false if the user already held this reaction.
    pub fn add_reaction(&mut self, kind: u32, user_id: UserId) -> bool {
        let users = self.reactions.entry(kind).or_default();
        if users.contains(&user_id) {
            return false;
        }
        users.push(user_id);
        true
    }

    /// Returns false if the user did not hold this reaction.
    pub fn remove_reaction(&mut self, kind: u32, user_id: UserId) -> bool {
        match self.reactions.get_mut(&kind) {
            Some(users) => {
                let before = users.len();
                users.retain(|&id| id != user_id);
                users.len() != before
            }
            None => false,
        }
    }

    pub fn reactors(&self, kind: u32) -> &[UserId] {
        self.reactions.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandupLine {
    pub handle: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct StandupState {
    pub active: bool,
    pub time_finish: Option<i64>,
    pub starter: Option<UserId>,
    pub buffer: Vec<StandupLine>,
    /// Identifies one standup run so a stale timer cannot flush a later one.
    pub epoch: u64,
}
