use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn create_meeting_returns_room_and_participants() {
    let app = TestApp::spawn().await;

    let json = app.create_meeting("m1", "p1").await;

    let room_name = json["meeting"]["roomName"].as_str().unwrap();
    let suffix = room_name
        .strip_prefix("medical-")
        .expect("room name should carry the configured prefix");
    uuid::Uuid::parse_str(suffix).expect("room name suffix should be a uuid");

    let participants = json["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);

    let roles: Vec<(&str, &str)> = participants
        .iter()
        .map(|p| (p["userId"].as_str().unwrap(), p["role"].as_str().unwrap()))
        .collect();
    assert!(roles.contains(&("m1", "MEDIC")));
    assert!(roles.contains(&("p1", "PATIENT")));
}

#[tokio::test]
async fn create_meeting_requires_both_ids() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_json("/api/meetings", &serde_json::json!({ "medicId": "m1" }))
        .await;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .post_json(
            "/api/meetings",
            &serde_json::json!({ "medicId": "m1", "patientId": "" }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn get_meeting_includes_creation_event() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    let json = app.get_meeting(meeting_id, "m1").await;

    assert_eq!(json["meeting"]["id"], created["meeting"]["id"]);
    assert_eq!(json["participants"].as_array().unwrap().len(), 2);
    assert_eq!(json["recordings"].as_array().unwrap().len(), 0);

    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "MEETING_CREATED");
    assert_eq!(events[0]["payload"]["medicId"], "m1");
}

#[tokio::test]
async fn get_meeting_rejects_outsiders_with_404() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    let resp = app
        .get(&format!("/api/meetings/{}?userId=intruder", meeting_id))
        .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn get_meeting_requires_user_id() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    let resp = app.get(&format!("/api/meetings/{}", meeting_id)).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn get_meeting_caps_events_at_ten_newest_first() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    // Each token issuance appends a USER_JOINED event on top of the
    // creation event.
    for _ in 0..12 {
        let resp = app
            .post_json(
                "/api/meetings/token",
                &serde_json::json!({ "meetingId": meeting_id, "userId": "p1" }),
            )
            .await;
        assert_eq!(resp.status().as_u16(), 200);
    }

    let json = app.get_meeting(meeting_id, "m1").await;
    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 10);
    // Newest first: all ten are joins, the creation event fell off the page.
    for event in events {
        assert_eq!(event["type"], "USER_JOINED");
    }
}

#[tokio::test]
async fn unknown_meeting_is_404() {
    let app = TestApp::spawn().await;
    let bogus = bson::oid::ObjectId::new().to_hex();

    let resp = app.get(&format!("/api/meetings/{}?userId=m1", bogus)).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = TestApp::spawn().await;
    let resp = app.get("/health").await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
}
