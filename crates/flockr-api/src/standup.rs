use axum::{
    Json,
    extract::{Query, State},
};

use flockr_core::Flockr;
use flockr_types::api::{
    ChannelQuery, Empty, SendMessageRequest, StandupStartRequest, StandupStarted, StandupStatus,
};

use crate::error::ApiResult;

pub async fn start(
    State(flockr): State<Flockr>,
    Json(req): Json<StandupStartRequest>,
) -> ApiResult<Json<StandupStarted>> {
    Ok(Json(
        flockr.standup_start(&req.token, req.channel_id, req.length).await?,
    ))
}

pub async fn active(
    State(flockr): State<Flockr>,
    Query(q): Query<ChannelQuery>,
) -> ApiResult<Json<StandupStatus>> {
    Ok(Json(flockr.standup_active(&q.token, q.channel_id)?))
}

pub async fn send(
    State(flockr): State<Flockr>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<Empty>> {
    flockr.standup_send(&req.token, req.channel_id, &req.message)?;
    Ok(Json(Empty::default()))
}
