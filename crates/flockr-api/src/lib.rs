pub mod auth;
pub mod avatars;
pub mod channels;
pub mod error;
pub mod messages;
pub mod standup;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use flockr_core::Flockr;

/// Every JSON endpoint, bound to `flockr`.
pub fn routes(flockr: Flockr) -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/passwordreset/request", post(auth::password_reset_request))
        .route("/auth/passwordreset/reset", post(auth::password_reset_complete))
        .route("/channels/list", get(channels::list))
        .route("/channels/listall", get(channels::list_all))
        .route("/channels/create", post(channels::create))
        .route("/channel/details", get(channels::details))
        .route("/channel/messages", get(channels::messages))
        .route("/channel/invite", post(channels::invite))
        .route("/channel/join", post(channels::join))
        .route("/channel/leave", post(channels::leave))
        .route("/channel/addowner", post(channels::add_owner))
        .route("/channel/removeowner", post(channels::remove_owner))
        .route("/message/send", post(messages::send))
        .route("/message/sendlater", post(messages::send_later))
        .route("/message/remove", delete(messages::remove))
        .route("/message/edit", put(messages::edit))
        .route("/message/pin", post(messages::pin))
        .route("/message/unpin", post(messages::unpin))
        .route("/message/react", post(messages::react))
        .route("/message/unreact", post(messages::unreact))
        .route("/user/profile", get(users::profile))
        .route("/user/profile/setname", put(users::set_name))
        .route("/user/profile/setemail", put(users::set_email))
        .route("/user/profile/sethandle", put(users::set_handle))
        .route("/user/profile/uploadphoto", post(users::upload_photo))
        .route("/users/all", get(users::all))
        .route("/search", get(users::search))
        .route("/admin/userpermission/change", post(users::change_permission))
        .route("/standup/start", post(standup::start))
        .route("/standup/active", get(standup::active))
        .route("/standup/send", post(standup::send))
        .route("/clear", delete(users::clear))
        .with_state(flockr)
}
