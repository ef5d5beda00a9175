use flockr_store::models::{MessageRecord, UserRecord};
use flockr_types::api::{MemberView, MessageView, ReactView, UserView};
use flockr_types::models::{SUPPORTED_REACTS, UserId};

/// Renders a message as `viewer` sees it: one react entry per supported kind,
/// flagged when the viewer holds it.
pub fn message(msg: &MessageRecord, viewer: UserId) -> MessageView {
    let reacts = SUPPORTED_REACTS
        .iter()
        .map(|&kind| ReactView {
            react_id: kind,
            u_ids: msg.reactors(kind).to_vec(),
            is_this_user_reacted: msg.has_reacted(kind, viewer),
        })
        .collect();

    MessageView {
        message_id: msg.id,
        u_id: msg.author,
        message: msg.body.clone(),
        time_created: msg.created_at,
        reacts,
        is_pinned: msg.pinned,
    }
}

pub fn member(user: &UserRecord) -> MemberView {
    MemberView {
        u_id: user.id,
        name_first: user.name_first.clone(),
        name_last: user.name_last.clone(),
        profile_img_url: user.avatar_url.clone(),
    }
}

pub fn user(user: &UserRecord) -> UserView {
    UserView {
        u_id: user.id,
        email: user.email.clone(),
        name_first: user.name_first.clone(),
        name_last: user.name_last.clone(),
        handle_str: user.handle.clone(),
        profile_img_url: user.avatar_url.clone(),
    }
}
