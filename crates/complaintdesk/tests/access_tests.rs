//! Owner-credential and admin-session checks.

mod common;

use common::{SubmissionBuilder, TestHarness};
use complaintdesk::{AdminSession, ComplaintError, ErrorKind, OwnerCredential, Responder};

#[test]
fn test_check_complaint_requires_both_halves() {
    let h = TestHarness::new();
    let mine = h.submit(SubmissionBuilder::new().email("ani@example.com").build());
    let other = h.submit(SubmissionBuilder::new().email("eko@example.com").build());

    let found = h
        .service
        .check_complaint("ani@example.com", &mine.access_token)
        .unwrap();
    assert_eq!(found.complaint.id, mine.id);

    let attempts = [
        ("eko@example.com", mine.access_token.as_str()),
        ("ani@example.com", other.access_token.as_str()),
        ("ani@example.com", "0000"),
        ("nobody@example.com", "0000"),
    ];
    let messages: Vec<String> = attempts
        .iter()
        .map(|(email, token)| {
            let err = h.service.check_complaint(email, token).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
            err.public_message()
        })
        .collect();
    assert!(messages.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_check_complaint_ignores_archived() {
    let h = TestHarness::new();
    let created = h.submit_default();
    h.service.archive_complaint(&h.admin, created.id).unwrap();

    let err = h
        .service
        .check_complaint("budi@example.com", &created.access_token)
        .unwrap_err();
    assert!(matches!(err, ComplaintError::NotFound(_)));
}

#[test]
fn test_owner_cannot_respond_to_other_complaint() {
    let h = TestHarness::new();
    let mine = h.submit(SubmissionBuilder::new().email("ani@example.com").build());
    let other = h.submit(SubmissionBuilder::new().email("eko@example.com").build());
    let credential = OwnerCredential::new("ani@example.com", &mine.access_token);

    let err = h
        .service
        .add_response(other.id, "bukan milik saya", Responder::Owner(&credential))
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(h
        .service
        .get_complaint_admin(&h.admin, other.id)
        .unwrap()
        .responses
        .is_empty());
}

#[test]
fn test_admin_response_requires_session() {
    let h = TestHarness::new();
    let created = h.submit_default();

    let err = h
        .service
        .add_response(created.id, "x", Responder::Admin(&AdminSession::anonymous()))
        .unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[test]
fn test_logout_revokes_admin_access() {
    let h = TestHarness::new();
    let mut session = h.service.login("Admin", "admin123").unwrap();
    assert!(h.service.get_stats(&session).is_ok());

    session.logout();
    assert!(matches!(
        h.service.get_stats(&session),
        Err(ComplaintError::Unauthorized(_))
    ));
}

#[test]
fn test_token_lookup_response_keeps_private_fields_for_owner() {
    let h = TestHarness::new();
    let created = h.submit_default();

    let detail = h
        .service
        .get_complaint_by_token(&created.access_token, Some("budi@example.com"))
        .unwrap();
    assert_eq!(detail.complaint.tracking_id, created.tracking_id);
    assert_eq!(detail.complaint.nik, "3201010101010001");
}
