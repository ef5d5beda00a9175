//! End-to-end flows through the public `Flockr` API.

use std::time::Duration;

use flockr_core::{ErrorKind, Flockr, FlockrConfig, HashingCost};
use flockr_types::api::AuthResponse;
use flockr_types::models::REACT_THUMBS_UP;

fn flockr() -> Flockr {
    let config = FlockrConfig {
        jwt_secret: "flows-secret".into(),
        hashing: HashingCost::minimal(),
        ..FlockrConfig::default()
    };
    Flockr::builder(config).build().unwrap()
}

fn register(flockr: &Flockr, first: &str, last: &str) -> AuthResponse {
    let email = format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase());
    flockr.register(&email, "hunter22", first, last).unwrap()
}

#[test]
fn team_conversation() {
    let flockr = flockr();
    let ana = register(&flockr, "Ana", "Lopez");
    let ben = register(&flockr, "Ben", "Okafor");
    let cleo = register(&flockr, "Cleo", "Park");

    let general = flockr.channels_create(&ben.token, "general", true).unwrap();
    flockr.channel_join(&cleo.token, general).unwrap();
    flockr.channel_invite(&cleo.token, general, ana.u_id).unwrap();

    let question = flockr.message_send(&cleo.token, general, "who owns the release?").unwrap();
    let answer = flockr.message_send(&ben.token, general, "I do").unwrap();
    flockr.message_react(&ana.token, answer, REACT_THUMBS_UP).unwrap();
    flockr.message_pin(&ben.token, question).unwrap();

    let page = flockr.channel_messages(&ana.token, general, 0).unwrap();
    assert_eq!(page.end, -1);
    assert_eq!(page.messages.len(), 2);
    assert_eq!(page.messages[0].message_id, answer);
    assert!(page.messages[0].reacts[0].is_this_user_reacted);
    assert!(page.messages[1].is_pinned);

    let hits = flockr.search(&cleo.token, "release").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].message_id, question);

    let details = flockr.channel_details(&ana.token, general).unwrap();
    let members: Vec<_> = details.all_members.iter().map(|m| m.u_id).collect();
    assert_eq!(members, [ben.u_id, cleo.u_id, ana.u_id]);
}

#[test]
fn session_lifecycle() {
    let flockr = flockr();
    let ana = register(&flockr, "Ana", "Lopez");

    let relogin = flockr.login("ana.lopez@example.com", "hunter22").unwrap();
    assert_eq!(relogin.u_id, ana.u_id);
    assert_eq!(flockr.channels_list(&ana.token).unwrap_err().kind(), ErrorKind::Auth);
    assert!(flockr.channels_list(&relogin.token).is_ok());

    assert!(flockr.logout(&relogin.token));
    assert!(!flockr.logout(&relogin.token));
    assert_eq!(
        flockr.channels_create(&relogin.token, "x", true).unwrap_err().kind(),
        ErrorKind::Auth
    );
}

#[test]
fn password_reset_flow() {
    let flockr = flockr();
    let ana = register(&flockr, "Ana", "Lopez");

    let code = flockr.password_reset_request("ana.lopez@example.com").unwrap();
    flockr.password_reset_complete(&code, "correct-horse").unwrap();

    let err = flockr.login("ana.lopez@example.com", "hunter22").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    let login = flockr.login("ana.lopez@example.com", "correct-horse").unwrap();
    assert_eq!(login.u_id, ana.u_id);

    let reused = flockr.password_reset_complete(&code, "another-one").unwrap_err();
    assert_eq!(reused.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn clear_is_idempotent_and_restarts_ids() {
    let flockr = flockr();
    let ana = register(&flockr, "Ana", "Lopez");
    flockr.channels_create(&ana.token, "general", true).unwrap();

    flockr.clear().await;
    flockr.clear().await;

    assert_eq!(flockr.channels_list(&ana.token).unwrap_err().kind(), ErrorKind::Auth);
    let again = register(&flockr, "Ana", "Lopez");
    assert_eq!(again.u_id, 1);
    assert_eq!(flockr.channels_create(&again.token, "general", true).unwrap(), 1);
    assert_eq!(flockr.channels_listall(&again.token).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn standup_and_scheduled_message_share_a_channel() {
    let flockr = flockr();
    let ana = register(&flockr, "Ana", "Lopez");
    let ben = register(&flockr, "Ben", "Okafor");
    let ch = flockr.channels_create(&ana.token, "daily", true).unwrap();
    flockr.channel_join(&ben.token, ch).unwrap();

    flockr.standup_start(&ana.token, ch, 30).await.unwrap();
    flockr.standup_send(&ben.token, ch, "fixed the flaky test").unwrap();

    let send_at = chrono::Utc::now().timestamp() + 60;
    let scheduled = tokio::spawn({
        let flockr = flockr.clone();
        let token = ben.token.clone();
        async move { flockr.message_sendlater(&token, ch, "retro at 4", send_at).await }
    });

    tokio::time::sleep(Duration::from_secs(31)).await;
    let page = flockr.channel_messages(&ana.token, ch, 0).unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].u_id, ana.u_id);
    assert_eq!(page.messages[0].message, "benokafor0: fixed the flaky test\n");

    let id = scheduled.await.unwrap().unwrap();
    let page = flockr.channel_messages(&ana.token, ch, 0).unwrap();
    assert_eq!(page.messages.len(), 2);
    assert_eq!(page.messages[0].message_id, id);
    assert_eq!(page.messages[0].u_id, ben.u_id);
}
