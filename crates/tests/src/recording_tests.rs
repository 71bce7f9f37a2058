use crate::fixtures::test_app::TestApp;
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn start_recording_transitions_to_recording() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();
    let room_name = created["meeting"]["roomName"].as_str().unwrap();

    let resp = app.start_recording(meeting_id).await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();

    assert_eq!(json["recording"]["status"], "RECORDING");
    assert_eq!(json["recording"]["meetingId"], meeting_id);

    // The transport saw the room and the recording id we persisted.
    let starts = app.transport.starts();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].0, room_name);
    assert_eq!(starts[0].1, json["recording"]["id"].as_str().unwrap());
}

#[tokio::test]
async fn second_start_while_active_is_rejected() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    assert_eq!(app.start_recording(meeting_id).await.status().as_u16(), 200);

    let resp = app.start_recording(meeting_id).await;
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"].as_str().unwrap().contains("already active"));

    // No second row was created.
    let meeting = app.get_meeting(meeting_id, "m1").await;
    assert_eq!(meeting["recordings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn stop_recording_finishes_round_trip() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    assert_eq!(app.start_recording(meeting_id).await.status().as_u16(), 200);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let resp = app.stop_recording(meeting_id).await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();

    assert_eq!(json["recording"]["status"], "FINISHED");
    let started_at = json["recording"]["startedAt"].as_str().unwrap();
    let ended_at = json["recording"]["endedAt"].as_str().unwrap();
    assert!(ended_at > started_at);

    assert_eq!(app.transport.stops().len(), 1);
}

#[tokio::test]
async fn stop_without_active_recording_is_rejected() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    let resp = app.stop_recording(meeting_id).await;
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"].as_str().unwrap().contains("no active"));
}

#[tokio::test]
async fn start_failure_leaves_failed_row_and_surfaces_error() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    app.transport.fail_start_with("Recorder pool exhausted");

    let resp = app.start_recording(meeting_id).await;
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Recorder pool exhausted"));

    // The Starting row stays behind as visible history, marked Failed.
    let meeting = app.get_meeting(meeting_id, "m1").await;
    let recordings = meeting["recordings"].as_array().unwrap();
    assert_eq!(recordings.len(), 1);
    assert_eq!(recordings[0]["status"], "FAILED");
    assert!(recordings[0]["errorMessage"]
        .as_str()
        .unwrap()
        .contains("Recorder pool exhausted"));
    assert!(recordings[0]["endedAt"].is_string());
}

#[tokio::test]
async fn failed_start_frees_the_meeting_for_a_retry() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    app.transport.fail_start_with("boom");
    assert_eq!(app.start_recording(meeting_id).await.status().as_u16(), 400);

    // The failed recording is terminal, so a new start is allowed.
    app.transport.clear_start_failure();
    let resp = app.start_recording(meeting_id).await;
    assert_eq!(resp.status().as_u16(), 200);

    let meeting = app.get_meeting(meeting_id, "m1").await;
    assert_eq!(meeting["recordings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stop_failure_marks_recording_failed() {
    let app = TestApp::spawn().await;
    let created = app.create_meeting("m1", "p1").await;
    let meeting_id = created["meeting"]["id"].as_str().unwrap();

    assert_eq!(app.start_recording(meeting_id).await.status().as_u16(), 200);
    app.transport.fail_stop_with("Agent lost the session");

    let resp = app.stop_recording(meeting_id).await;
    assert_eq!(resp.status().as_u16(), 400);

    let meeting = app.get_meeting(meeting_id, "m1").await;
    let recordings = meeting["recordings"].as_array().unwrap();
    assert_eq!(recordings[0]["status"], "FAILED");
    assert!(recordings[0]["errorMessage"]
        .as_str()
        .unwrap()
        .contains("Agent lost the session"));
}

#[tokio::test]
async fn start_on_unknown_meeting_is_404() {
    let app = TestApp::spawn().await;
    let bogus = bson::oid::ObjectId::new().to_hex();

    let resp = app.start_recording(&bogus).await;
    assert_eq!(resp.status().as_u16(), 404);
}
