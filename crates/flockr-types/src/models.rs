use serde::{Deserialize, Serialize};

pub type UserId = u32;
pub type ChannelId = u32;
pub type MessageId = u64;

/// The only reaction kind currently defined ("thumbs up").
pub const REACT_THUMBS_UP: u32 = 1;

/// Every reaction kind a message can carry, in display order.
pub const SUPPORTED_REACTS: &[u32] = &[REACT_THUMBS_UP];

/// Workspace-wide permission level.
///
/// On the wire this is the legacy permission id: `1` for owners, `2` for
/// everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalRole {
    Owner,
    Member,
}

impl GlobalRole {
    pub fn permission_id(self) -> i64 {
        match self {
            Self::Owner => 1,
            Self::Member => 2,
        }
    }

    pub fn from_permission_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Owner),
            2 => Some(Self::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_is_public(is_public: bool) -> Self {
        if is_public { Self::Public } else { Self::Private }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}
