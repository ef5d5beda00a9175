//! Profiles, the user directory, search and admin.

use axum::{
    Json,
    extract::{Query, State},
};

use flockr_core::{CropBox, Flockr};
use flockr_types::api::{
    Empty, MessageListResponse, PermissionChangeRequest, ProfileQuery, SearchQuery,
    SetEmailRequest, SetHandleRequest, SetNameRequest, TokenQuery, UploadPhotoRequest,
    UserListResponse, UserResponse,
};

use crate::error::ApiResult;

pub async fn profile(
    State(flockr): State<Flockr>,
    Query(q): Query<ProfileQuery>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(UserResponse {
        user: flockr.user_profile(&q.token, q.u_id)?,
    }))
}

pub async fn set_name(
    State(flockr): State<Flockr>,
    Json(req): Json<SetNameRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.user_profile_setname(&req.token, &req.name_first, &req.name_last)?;
    Ok(Json(Empty::default()))
}

pub async fn set_email(
    State(flockr): State<Flockr>,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.user_profile_setemail(&req.token, &req.email)?;
    Ok(Json(Empty::default()))
}

pub async fn set_handle(
    State(flockr): State<Flockr>,
    Json(req): Json<SetHandleRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.user_profile_sethandle(&req.token, &req.handle_str)?;
    Ok(Json(Empty::default()))
}

pub async fn upload_photo(
    State(flockr): State<Flockr>,
    Json(req): Json<UploadPhotoRequest>,
) -> ApiResult<Json<Empty>> {
    let crop = CropBox {
        x_start: req.x_start,
        y_start: req.y_start,
        x_end: req.x_end,
        y_end: req.y_end,
    };
    flockr.user_profile_uploadphoto(&req.token, &req.img_url, crop).await?;
    Ok(Json(Empty::default()))
}

pub async fn all(
    State(flockr): State<Flockr>,
    Query(q): Query<TokenQuery>,
) -> ApiResult<Json<UserListResponse>> {
    Ok(Json(UserListResponse {
        users: flockr.users_all(&q.token)?,
    }))
}

pub async fn search(
    State(flockr): State<Flockr>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<MessageListResponse>> {
    Ok(Json(MessageListResponse {
        messages: flockr.search(&q.token, &q.query_str)?,
    }))
}

pub async fn change_permission(
    State(flockr): State<Flockr>,
    Json(req): Json<PermissionChangeRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.admin_userpermission_change(&req.token, req.u_id, req.permission_id)?;
    Ok(Json(Empty::default()))
}

pub async fn clear(State(flockr): State<Flockr>) -> Json<Empty> {
    flockr.clear().await;
    Json(Empty::default())
}
