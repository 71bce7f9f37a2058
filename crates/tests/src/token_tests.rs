use crate::fixtures::test_app::{TestApp, TEST_JWT_SECRET};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use medimeet_services::token::MeetingClaims;

fn decode_claims(token: &str) -> MeetingClaims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["jitsi"]);
    decode::<MeetingClaims>(
        token,
        &DecodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        &validation,
    )
    .expect("token should decode with the configured secret")
    .claims
}

#[tokio::test]
async fn patient_token_is_not_moderator() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();
    let room_name = created["meeting"]["roomName"].as_str().unwrap();

    let resp = app
        .post_json(
            "/api/meetings/token",
            &serde_json::json!({ "meetingId": meeting_id, "userId": "p1" }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(json["isModerator"], false);
    assert_eq!(json["expiresIn"], 3600);
    assert!(json["meetingUrl"].as_str().unwrap().ends_with(room_name));

    let claims = decode_claims(json["token"].as_str().unwrap());
    assert_eq!(claims.room, room_name);
    assert_eq!(claims.context.user.id, "p1");
    assert!(!claims.context.user.moderator);
    // Recording capability is moderator-only regardless of meeting config.
    assert!(!claims.context.features.recording);
}

#[tokio::test]
async fn medic_token_is_moderator_with_recording() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    let resp = app
        .post_json(
            "/api/meetings/token",
            &serde_json::json!({ "meetingId": meeting_id, "userId": "m1" }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(json["isModerator"], true);

    let claims = decode_claims(json["token"].as_str().unwrap());
    assert!(claims.context.user.moderator);
    assert!(claims.context.features.recording);
    assert!(!claims.context.features.livestreaming);
    assert!(!claims.context.features.transcription);
}

#[tokio::test]
async fn token_requires_user_id() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    let resp = app
        .post_json(
            "/api/meetings/token",
            &serde_json::json!({ "meetingId": meeting_id }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn token_for_non_participant_is_unauthorized() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    let resp = app
        .post_json(
            "/api/meetings/token",
            &serde_json::json!({ "meetingId": meeting_id, "userId": "intruder" }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn token_for_unknown_meeting_is_404() {
    let app = TestApp::spawn().await;
    let bogus = bson::oid::ObjectId::new().to_hex();

    let resp = app
        .post_json(
            "/api/meetings/token",
            &serde_json::json!({ "meetingId": bogus, "userId": "m1" }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn token_issuance_appends_join_event() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    app.post_json(
        "/api/meetings/token",
        &serde_json::json!({ "meetingId": meeting_id, "userId": "m1" }),
    )
    .await;

    let json = app.get_meeting(meeting_id, "m1").await;
    let events = json["events"].as_array().unwrap();
    assert_eq!(events[0]["type"], "USER_JOINED");
    assert_eq!(events[0]["payload"]["userId"], "m1");
    assert_eq!(events[0]["payload"]["role"], "MEDIC");
}
