use axum::{Json, extract::State};

use flockr_core::Flockr;
use flockr_types::api::{
    EditMessageRequest, Empty, MessageIdResponse, MessageRequest, ReactRequest,
    SendLaterRequest, SendMessageRequest,
};

use crate::error::ApiResult;

pub async fn send(
    State(flockr): State<Flockr>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let message_id = flockr.message_send(&req.token, req.channel_id, &req.message)?;
    Ok(Json(MessageIdResponse { message_id }))
}

/// Holds the request open until the message has been posted.
pub async fn send_later(
    State(flockr): State<Flockr>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let message_id = flockr
        .message_sendlater(&req.token, req.channel_id, &req.message, req.time_sent)
        .await?;
    Ok(Json(MessageIdResponse { message_id }))
}

pub async fn remove(
    State(flockr): State<Flockr>,
    Json(req): Json<MessageRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.message_remove(&req.token, req.message_id)?;
    Ok(Json(Empty::default()))
}

pub async fn edit(
    State(flockr): State<Flockr>,
    Json(req): Json<EditMessageRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.message_edit(&req.token, req.message_id, &req.message)?;
    Ok(Json(Empty::default()))
}

pub async fn pin(
    State(flockr): State<Flockr>,
    Json(req): Json<MessageRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.message_pin(&req.token, req.message_id)?;
    Ok(Json(Empty::default()))
}

pub async fn unpin(
    State(flockr): State<Flockr>,
    Json(req): Json<MessageRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.message_unpin(&req.token, req.message_id)?;
    Ok(Json(Empty::default()))
}

pub async fn react(
    State(flockr): State<Flockr>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.message_react(&req.token, req.message_id, req.react_id)?;
    Ok(Json(Empty::default()))
}

pub async fn unreact(
    State(flockr): State<Flockr>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.message_unreact(&req.token, req.message_id, req.react_id)?;
    Ok(Json(Empty::default()))
}
