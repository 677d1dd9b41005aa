//! The same workflow over the SQLite backend, including restarts.

mod common;

use common::{SubmissionBuilder, TestHarness};
use complaintdesk::{
    ComplaintError, ComplaintFilter, ComplaintStatus, OwnerCredential, Responder,
};

#[test]
fn test_full_workflow_on_sqlite() {
    let h = TestHarness::sqlite();
    let upload = h.service.store_upload("foto.jpg", b"jpeg").unwrap();
    let created = h
        .service
        .create_complaint(SubmissionBuilder::new().build(), vec![upload])
        .unwrap();
    let owner = OwnerCredential::new("budi@example.com", &created.access_token);

    h.service
        .verify_complaint(&h.admin, created.id, true, None, Some("Diterima"))
        .unwrap();
    h.service
        .add_response(created.id, "Terima kasih", Responder::Owner(&owner))
        .unwrap();
    h.service
        .close_complaint(created.id, &owner.email, &owner.token)
        .unwrap();

    let detail = h
        .service
        .check_complaint(&owner.email, &owner.token)
        .unwrap();
    assert_eq!(detail.complaint.status, ComplaintStatus::Resolved);
    assert!(detail.complaint.closed_at.is_some());
    assert_eq!(detail.attachments.len(), 1);
    assert_eq!(detail.responses.len(), 2);
    h.assert_invariants(created.id);
}

#[test]
fn test_data_survives_restart() {
    let h = TestHarness::sqlite();
    let created = h.submit_published(SubmissionBuilder::new().build());
    h.service
        .verify_complaint(&h.admin, h.submit_default().id, false, Some("Duplikat"), None)
        .unwrap();

    let h = h.reopen_with(|base, builder| builder.database(base.join("data/complaintdesk.db")));

    assert_eq!(h.service.list_categories().unwrap().len(), 6);
    let stats = h.service.get_stats(&h.admin).unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.verified, 1);
    assert_eq!(stats.rejected, 1);

    let public = h
        .service
        .list_public_complaints(&ComplaintFilter::default())
        .unwrap();
    assert_eq!(public.complaints.len(), 1);
    assert_eq!(public.complaints[0].tracking_id, created.tracking_id);

    let again = h
        .service
        .verify_complaint(&h.admin, created.id, true, None, None)
        .unwrap_err();
    assert!(matches!(again, ComplaintError::InvalidState { .. }));
}

#[test]
fn test_sqlite_pagination_matches_memory() {
    let sqlite = TestHarness::sqlite();
    let memory = TestHarness::new();
    for h in [&sqlite, &memory] {
        for i in 0..7 {
            h.submit_published(SubmissionBuilder::new().title(&format!("No {}", i)).build());
        }
    }

    let filter = ComplaintFilter::default().page(2, 3);
    let a = sqlite.service.list_public_complaints(&filter).unwrap();
    let b = memory.service.list_public_complaints(&filter).unwrap();
    assert_eq!(a.pagination, b.pagination);
    let titles = |rows: &[complaintdesk::PublicComplaint]| {
        rows.iter().map(|r| r.title.clone()).collect::<Vec<_>>()
    };
    assert_eq!(titles(&a.complaints), titles(&b.complaints));
    assert_eq!(titles(&a.complaints), vec!["No 3", "No 2", "No 1"]);
}

#[test]
fn test_failed_attachment_link_stores_nothing() {
    let h = TestHarness::sqlite();
    let upload = h.service.store_upload("foto.jpg", b"jpeg").unwrap();

    let err = h
        .service
        .create_complaint(SubmissionBuilder::new().build(), vec![upload.clone(), upload.clone()])
        .unwrap_err();
    assert_eq!(err.status_code(), 500);

    let stats = h.service.get_stats(&h.admin).unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.pending, 0);
    assert!(h.service.attachment_path(&upload.filename).is_err());

    let created = h
        .service
        .create_complaint(SubmissionBuilder::new().build(), vec![])
        .unwrap();
    assert_eq!(h.service.get_stats(&h.admin).unwrap().total, 1);
    h.assert_invariants(created.id);
}
