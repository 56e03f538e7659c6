use super::*;
use async_trait::async_trait;
use record_store::{MemoryStore, RecordStoreError};
use serde_json::json;
use shared::error::ErrorCode;
use tokio::sync::Mutex;

fn ctx(store: MemoryStore) -> RelayContext {
    RelayContext::new(Arc::new(store))
}

fn body(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).expect("json")
}

fn primary_json() -> serde_json::Value {
    json!({ "name": "A", "email": "a@x.com", "phone": "+1 (555)-555-5555", "about": "hi" })
}

#[test]
fn parse_rejects_missing_day_or_form_data() {
    for payload in [
        json!({ "formData": [primary_json()] }),
        json!({ "day": "friday" }),
        json!({ "day": "friday", "formData": "nope" }),
        json!({ "day": "sunday", "formData": [primary_json()] }),
        json!([primary_json()]),
    ] {
        let err = parse_submission(&body(payload)).expect_err("should fail");
        assert!(matches!(err.code, ErrorCode::Validation));
        assert_eq!(err.message, INVALID_REQUEST_FORMAT);
    }

    let err = parse_submission(b"not json").expect_err("should fail");
    assert_eq!(err.message, INVALID_REQUEST_FORMAT);
}

#[test]
fn parse_rejects_empty_form_data() {
    let err = parse_submission(&body(json!({ "day": "friday", "formData": [] })))
        .expect_err("should fail");
    assert_eq!(err.message, NO_FORM_DATA);
}

#[test]
fn parse_rejects_incomplete_primary() {
    for missing in ["name", "email", "phone", "about"] {
        let mut primary = primary_json();
        primary.as_object_mut().expect("object").remove(missing);
        let err = parse_submission(&body(json!({ "day": "friday", "formData": [primary] })))
            .expect_err("should fail");
        assert_eq!(err.message, PRIMARY_INCOMPLETE, "missing {missing}");
    }

    let blank = json!({ "name": "A", "email": "", "phone": "1", "about": "x" });
    let err = parse_submission(&body(json!({ "day": "friday", "formData": [blank] })))
        .expect_err("should fail");
    assert_eq!(err.message, PRIMARY_INCOMPLETE);
}

#[test]
fn parse_defaults_missing_friend_fields_to_empty() {
    let submission = parse_submission(&body(json!({
        "day": "saturday",
        "formData": [primary_json(), { "about": "quiet" }],
    })))
    .expect("valid");
    assert_eq!(submission.day, Day::Saturday);
    assert_eq!(submission.friends.len(), 1);
    assert_eq!(submission.friends[0].name, "");
    assert_eq!(submission.friends[0].email, "");
    assert_eq!(submission.friends[0].about, "quiet");
}

#[test]
fn parse_keeps_friend_with_non_string_fields() {
    let submission = parse_submission(&body(json!({
        "day": "friday",
        "formData": [primary_json(), { "name": "B", "about": "x", "phone": 5, "email": null }],
    })))
    .expect("valid");
    assert_eq!(submission.friends[0].name, "B");
    assert_eq!(submission.friends[0].phone, "");
    assert_eq!(submission.friends[0].email, "");

    let submission = parse_submission(&body(json!({
        "day": "friday",
        "formData": [primary_json(), "stray"],
    })))
    .expect("valid");
    assert_eq!(submission.friends[0], GuestEntry::default());
}

#[test]
fn parse_treats_non_object_primary_as_incomplete() {
    for first in [
        json!("x"),
        json!(42),
        json!(null),
        json!({ "name": 7, "email": "a@x.com", "phone": "1", "about": "hi" }),
    ] {
        let err = parse_submission(&body(json!({ "day": "friday", "formData": [first.clone()] })))
            .expect_err("should fail");
        assert_eq!(err.message, PRIMARY_INCOMPLETE, "first entry {first}");
    }
}

#[test]
fn plan_links_primary_and_friends() {
    let submission = Submission {
        day: Day::Friday,
        primary: GuestEntry {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            phone: "+1 (555)-555-5555".into(),
            about: "hi".into(),
        },
        friends: vec![
            GuestEntry {
                name: "Bo".into(),
                about: "a".into(),
                ..GuestEntry::default()
            },
            GuestEntry {
                name: "Cy".into(),
                about: "b".into(),
                ..GuestEntry::default()
            },
        ],
    };

    let plan = plan_records(&submission);
    assert_eq!(plan.primary.guest_type, GuestType::Primary);
    assert_eq!(
        plan.primary.guests,
        Some(vec!["Bo".to_string(), "Cy".to_string()])
    );
    assert_eq!(plan.primary.primary_contact, None);
    assert_eq!(plan.friends.len(), 2);
    for friend in &plan.friends {
        assert_eq!(friend.guest_type, GuestType::Friend);
        assert_eq!(friend.primary_contact.as_deref(), Some("Ana"));
        assert_eq!(friend.day, Day::Friday);
        assert_eq!(friend.guests, None);
    }
}

#[tokio::test]
async fn single_primary_creates_one_record() {
    let store = MemoryStore::new();
    let accepted = relay_rsvp(
        &ctx(store.clone()),
        &body(json!({ "day": "friday", "formData": [primary_json()] })),
    )
    .await
    .expect("accepted");

    assert!(accepted.success);
    assert_eq!(accepted.message, SUBMITTED);
    assert!(accepted.data.friends.is_empty());
    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, accepted.data.primary);
    assert_eq!(records[0].1.guest_type, GuestType::Primary);
    assert_eq!(records[0].1.guests, Some(Vec::new()));
}

#[tokio::test]
async fn primary_with_two_friends_creates_three_linked_records() {
    let store = MemoryStore::new();
    let accepted = relay_rsvp(
        &ctx(store.clone()),
        &body(json!({
            "day": "thursday",
            "formData": [
                primary_json(),
                { "name": "Bo", "email": "", "phone": "", "about": "x" },
                { "name": "Cy", "email": "", "phone": "", "about": "y" },
            ],
        })),
    )
    .await
    .expect("accepted");
    assert_eq!(accepted.data.friends.len(), 2);

    let records = store.records().await;
    assert_eq!(records.len(), 3);
    let primary = &records[0].1;
    assert_eq!(primary.guest_type, GuestType::Primary);
    assert_eq!(
        primary.guests,
        Some(vec!["Bo".to_string(), "Cy".to_string()])
    );
    let friends: Vec<_> = records[1..].iter().map(|(_, r)| r).collect();
    assert!(friends
        .iter()
        .all(|r| r.guest_type == GuestType::Friend && r.primary_contact.as_deref() == Some("A")));
}

#[tokio::test]
async fn primary_failure_skips_friend_phase() {
    let store = MemoryStore::rejecting(["A"]);
    let err = relay_rsvp(
        &ctx(store.clone()),
        &body(json!({
            "day": "friday",
            "formData": [primary_json(), { "name": "Bo", "about": "x" }],
        })),
    )
    .await
    .expect_err("should fail");

    let public = err.api_error();
    assert_eq!(public.code, ErrorCode::Upstream);
    assert_eq!(public.message, PROCESSING_FAILED);

    let RsvpRejection::Failed(failure) = err else {
        panic!("expected dispatch failure");
    };
    assert!(failure.summary.is_none());
    assert!(failure.details.contains("rejected"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn friend_failure_reports_partial_summary() {
    let store = MemoryStore::rejecting(["Cy"]);
    let err = relay_rsvp(
        &ctx(store.clone()),
        &body(json!({
            "day": "friday",
            "formData": [
                primary_json(),
                { "name": "Bo", "about": "x" },
                { "name": "Cy", "about": "y" },
            ],
        })),
    )
    .await
    .expect_err("should fail");

    let public = err.api_error();
    assert_eq!(public.code, ErrorCode::Upstream);
    assert_eq!(public.message, PROCESSING_FAILED);

    let RsvpRejection::Failed(failure) = err else {
        panic!("expected dispatch failure");
    };
    let summary = failure.summary.expect("primary was created");
    assert_eq!(summary.friends.len(), 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].name, "Cy");
    assert_eq!(failure.details, summary.failed[0].error);
    // created rows stay in place
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn invalid_payload_never_touches_store() {
    let store = MemoryStore::new();
    let err = relay_rsvp(&ctx(store.clone()), &body(json!({ "day": "friday", "formData": [] })))
        .await
        .expect_err("should fail");
    assert!(matches!(err, RsvpRejection::Invalid(ref e) if e.message == NO_FORM_DATA));
    assert_eq!(err.api_error().code, ErrorCode::Validation);
    assert!(store.is_empty().await);
}

struct OrderingStore {
    calls: Mutex<Vec<(String, GuestType)>>,
}

#[async_trait]
impl RecordStore for OrderingStore {
    async fn create_record(&self, record: &RsvpRecord) -> record_store::Result<RecordId> {
        if record.guest_type == GuestType::Friend {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let mut calls = self.calls.lock().await;
        calls.push((record.name.clone(), record.guest_type));
        Ok(RecordId(format!("rec-{}", calls.len())))
    }

    async fn check_access(&self) -> record_store::Result<()> {
        Err(RecordStoreError::Unavailable("unused".into()))
    }
}

#[tokio::test]
async fn primary_record_is_created_before_any_friend() {
    let store = Arc::new(OrderingStore {
        calls: Mutex::new(Vec::new()),
    });
    let relay = RelayContext::new(store.clone());
    relay_rsvp(
        &relay,
        &body(json!({
            "day": "friday",
            "formData": [primary_json(), { "name": "Bo", "about": "x" }, { "name": "Cy", "about": "y" }],
        })),
    )
    .await
    .expect("accepted");

    let calls = store.calls.lock().await;
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], ("A".to_string(), GuestType::Primary));
    assert!(calls[1..].iter().all(|(_, t)| *t == GuestType::Friend));
}
