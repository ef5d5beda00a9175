//! `/channels/*` and `/channel/*` handlers.

use axum::{
    Json,
    extract::{Query, State},
};

use flockr_core::Flockr;
use flockr_types::api::{
    ChannelDetails, ChannelIdResponse, ChannelListResponse, ChannelMemberRequest, ChannelQuery,
    ChannelRequest, CreateChannelRequest, Empty, MessagesPage, MessagesQuery, TokenQuery,
};

use crate::error::ApiResult;

pub async fn create(
    State(flockr): State<Flockr>,
    Json(req): Json<CreateChannelRequest>,
) -> ApiResult<Json<ChannelIdResponse>> {
    let channel_id = flockr.channels_create(&req.token, &req.name, req.is_public)?;
    Ok(Json(ChannelIdResponse { channel_id }))
}

pub async fn list(
    State(flockr): State<Flockr>,
    Query(q): Query<TokenQuery>,
) -> ApiResult<Json<ChannelListResponse>> {
    Ok(Json(ChannelListResponse {
        channels: flockr.channels_list(&q.token)?,
    }))
}

pub async fn list_all(
    State(flockr): State<Flockr>,
    Query(q): Query<TokenQuery>,
) -> ApiResult<Json<ChannelListResponse>> {
    Ok(Json(ChannelListResponse {
        channels: flockr.channels_listall(&q.token)?,
    }))
}

pub async fn details(
    State(flockr): State<Flockr>,
    Query(q): Query<ChannelQuery>,
) -> ApiResult<Json<ChannelDetails>> {
    Ok(Json(flockr.channel_details(&q.token, q.channel_id)?))
}

pub async fn messages(
    State(flockr): State<Flockr>,
    Query(q): Query<MessagesQuery>,
) -> ApiResult<Json<MessagesPage>> {
    Ok(Json(flockr.channel_messages(&q.token, q.channel_id, q.start)?))
}

pub async fn invite(
    State(flockr): State<Flockr>,
    Json(req): Json<ChannelMemberRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.channel_invite(&req.token, req.channel_id, req.u_id)?;
    Ok(Json(Empty::default()))
}

pub async fn join(
    State(flockr): State<Flockr>,
    Json(req): Json<ChannelRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.channel_join(&req.token, req.channel_id)?;
    Ok(Json(Empty::default()))
}

pub async fn leave(
    State(flockr): State<Flockr>,
    Json(req): Json<ChannelRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.channel_leave(&req.token, req.channel_id)?;
    Ok(Json(Empty::default()))
}

pub async fn add_owner(
    State(flockr): State<Flockr>,
    Json(req): Json<ChannelMemberRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.channel_addowner(&req.token, req.channel_id, req.u_id)?;
    Ok(Json(Empty::default()))
}

pub async fn remove_owner(
    State(flockr): State<Flockr>,
    Json(req): Json<ChannelMemberRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.channel_removeowner(&req.token, req.channel_id, req.u_id)?;
    Ok(Json(Empty::default()))
}
