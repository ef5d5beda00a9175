use serde::{Deserialize, Serialize};

use crate::models::{ChannelId, MessageId, UserId};

// -- Session claims --

/// Claims carried inside the signed session token. `sid` is the opaque
/// server-side session id; the token is only honoured while it matches the
/// account's active session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub sid: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub u_id: UserId,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub is_success: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetComplete {
    pub reset_code: String,
    pub new_password: String,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChannelRequest {
    pub token: String,
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct ChannelIdResponse {
    pub channel_id: ChannelId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel_id: ChannelId,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub token: String,
    pub channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelRequest {
    pub token: String,
    pub channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelMemberRequest {
    pub token: String,
    pub channel_id: ChannelId,
    pub u_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub u_id: UserId,
    pub name_first: String,
    pub name_last: String,
    pub profile_img_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDetails {
    pub name: String,
    pub owner_members: Vec<MemberView>,
    pub all_members: Vec<MemberView>,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub token: String,
    pub channel_id: ChannelId,
    pub start: i64,
}

// -- Messages --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactView {
    pub react_id: u32,
    pub u_ids: Vec<UserId>,
    pub is_this_user_reacted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub message_id: MessageId,
    pub u_id: UserId,
    pub message: String,
    pub time_created: i64,
    pub reacts: Vec<ReactView>,
    pub is_pinned: bool,
}

/// One page of a channel's history. `end` is `-1` once the page reaches the
/// oldest message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesPage {
    pub messages: Vec<MessageView>,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub token: String,
    pub channel_id: ChannelId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendLaterRequest {
    pub token: String,
    pub channel_id: ChannelId,
    pub message: String,
    pub time_sent: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageIdResponse {
    pub message_id: MessageId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageRequest {
    pub token: String,
    pub message_id: MessageId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditMessageRequest {
    pub token: String,
    pub message_id: MessageId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactRequest {
    pub token: String,
    pub message_id: MessageId,
    pub react_id: u32,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageView>,
}

// -- Users --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub u_id: UserId,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
    pub profile_img_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub token: String,
    pub u_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetNameRequest {
    pub token: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetEmailRequest {
    pub token: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetHandleRequest {
    pub token: String,
    pub handle_str: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadPhotoRequest {
    pub token: String,
    pub img_url: String,
    pub x_start: i64,
    pub y_start: i64,
    pub x_end: i64,
    pub y_end: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionChangeRequest {
    pub token: String,
    pub u_id: UserId,
    pub permission_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub token: String,
    pub query_str: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

// -- Standups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupStartRequest {
    pub token: String,
    pub channel_id: ChannelId,
    pub length: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandupStarted {
    pub time_finish: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandupStatus {
    pub is_active: bool,
    pub time_finish: Option<i64>,
}

/// Empty JSON object returned by operations with no payload.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

// -- Errors --

/// Body of every failed request. `code` is always 400 in this API; `name`
/// distinguishes input problems from permission problems.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub name: String,
    pub message: String,
}
