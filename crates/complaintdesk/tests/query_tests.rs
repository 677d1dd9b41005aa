//! Listing, redaction, archival and stats through the service facade.

mod common;

use common::{SubmissionBuilder, TestHarness};
use complaintdesk::{ComplaintError, ComplaintFilter, ComplaintQueryParams, ComplaintStatus};

fn published(h: &TestHarness, n: usize) -> Vec<i64> {
    (0..n)
        .map(|i| {
            h.submit_published(
                SubmissionBuilder::new()
                    .title(&format!("Pengaduan {}", i))
                    .build(),
            )
            .id
        })
        .collect()
}

#[test]
fn test_pagination_23_items() {
    let h = TestHarness::new();
    let mut ids = published(&h, 23);
    ids.reverse();

    let page1 = h
        .service
        .list_public_complaints(&ComplaintFilter::default().page(1, 10))
        .unwrap();
    assert_eq!(page1.complaints.len(), 10);
    assert_eq!(page1.pagination.total, 23);
    assert_eq!(page1.pagination.total_pages, 3);
    assert_eq!((page1.pagination.from, page1.pagination.to), (1, 10));
    let got: Vec<i64> = page1.complaints.iter().map(|c| c.id).collect();
    assert_eq!(got, ids[..10]);

    let page3 = h
        .service
        .list_public_complaints(&ComplaintFilter::default().page(3, 10))
        .unwrap();
    assert_eq!(page3.complaints.len(), 3);
    assert_eq!((page3.pagination.from, page3.pagination.to), (21, 23));
    let got: Vec<i64> = page3.complaints.iter().map(|c| c.id).collect();
    assert_eq!(got, ids[20..]);

    let page4 = h
        .service
        .list_public_complaints(&ComplaintFilter::default().page(4, 10))
        .unwrap();
    assert!(page4.complaints.is_empty());
    assert_eq!(page4.pagination.total, 23);
    assert_eq!(page4.pagination.current_page, 4);
}

#[test]
fn test_public_listing_redacts_reporter_fields() {
    let h = TestHarness::new();
    published(&h, 1);

    let public = h
        .service
        .list_public_complaints(&ComplaintFilter::default())
        .unwrap();
    let public_json = serde_json::to_value(&public).unwrap();
    let row = &public_json["complaints"][0];
    for key in ["name", "nik", "email", "phone", "address", "accessToken"] {
        assert!(row.get(key).is_none(), "public row leaks {}", key);
    }

    let admin = h
        .service
        .list_admin_complaints(&h.admin, &ComplaintFilter::default())
        .unwrap();
    let admin_json = serde_json::to_value(&admin).unwrap();
    let row = &admin_json["complaints"][0];
    assert_eq!(row["nik"], "3201010101010001");
    assert_eq!(row["email"], "budi@example.com");
    assert_eq!(row["phone"], "081234567890");
    assert_eq!(row["address"], "Jl. Merdeka 1");
}

#[test]
fn test_archive_hides_but_stats_count() {
    let h = TestHarness::new();
    let ids = published(&h, 3);
    let pending = h.submit_default();

    h.service.archive_complaint(&h.admin, ids[0]).unwrap();

    let public = h
        .service
        .list_public_complaints(&ComplaintFilter::default())
        .unwrap();
    assert_eq!(public.pagination.total, 2);
    assert!(public.complaints.iter().all(|c| c.id != ids[0]));

    let admin = h
        .service
        .list_admin_complaints(&h.admin, &ComplaintFilter::default())
        .unwrap();
    assert_eq!(admin.pagination.total, 3);
    assert!(admin.complaints.iter().all(|c| c.complaint.id != ids[0]));
    assert!(admin.complaints.iter().any(|c| c.complaint.id == pending.id));

    let stats = h.service.get_stats(&h.admin).unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.verified, 3);
    assert_eq!(stats.pending, 1);

    let err = h.service.get_complaint_admin(&h.admin, ids[0]).unwrap_err();
    assert!(matches!(err, ComplaintError::NotFound(_)));
}

#[test]
fn test_status_and_category_filters() {
    let h = TestHarness::new();
    let env = h.category("Lingkungan");
    let river = h
        .submit_published(SubmissionBuilder::new().title("Sungai tercemar").category(env.id).build());
    let road = h.submit_published(SubmissionBuilder::new().title("Jalan rusak").build());
    h.service
        .verify_complaint(&h.admin, h.submit_default().id, false, Some("spam"), None)
        .unwrap();

    let by_category = h
        .service
        .list_public_complaints(&ComplaintFilter::default().category("LINGKUNGAN"))
        .unwrap();
    assert_eq!(by_category.complaints.len(), 1);
    assert_eq!(by_category.complaints[0].id, river.id);
    assert_eq!(
        by_category.complaints[0].category_name.as_deref(),
        Some("Lingkungan")
    );

    let rejected = h
        .service
        .list_admin_complaints(
            &h.admin,
            &ComplaintFilter::default().status(ComplaintStatus::Rejected),
        )
        .unwrap();
    assert_eq!(rejected.complaints.len(), 1);
    assert_eq!(
        rejected.complaints[0].complaint.rejection_reason.as_deref(),
        Some("spam")
    );

    let verified = h
        .service
        .list_public_complaints(&ComplaintFilter::default().status(ComplaintStatus::Verified))
        .unwrap();
    let ids: Vec<i64> = verified.complaints.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![road.id, river.id]);
}

#[test]
fn test_search_scopes() {
    let h = TestHarness::new();
    let created = h.submit_published(
        SubmissionBuilder::new()
            .title("Lampu jalan padam")
            .name("Rahmat Hidayat")
            .build(),
    );

    let search = |needle: &str| ComplaintFilter::default().search(needle);
    assert_eq!(
        h.service
            .list_public_complaints(&search("LAMPU"))
            .unwrap()
            .complaints
            .len(),
        1
    );
    assert!(h
        .service
        .list_public_complaints(&search("hidayat"))
        .unwrap()
        .complaints
        .is_empty());
    assert_eq!(
        h.service
            .list_admin_complaints(&h.admin, &search("hidayat"))
            .unwrap()
            .complaints
            .len(),
        1
    );
    assert_eq!(
        h.service
            .list_admin_complaints(&h.admin, &search(&created.tracking_id.to_lowercase()))
            .unwrap()
            .complaints
            .len(),
        1
    );
}

#[test]
fn test_raw_query_parameters() {
    let h = TestHarness::with_config(|b| b.limits(5, 8));
    published(&h, 12);

    let params = ComplaintQueryParams {
        page: Some("2".to_string()),
        limit: Some("50".to_string()),
        status: Some("all".to_string()),
        category: Some("all".to_string()),
        search: None,
    };
    let page = h.service.list_public_from_params(&params).unwrap();
    assert_eq!(page.pagination.limit, 8);
    assert_eq!((page.pagination.from, page.pagination.to), (9, 12));

    let page = h
        .service
        .list_public_from_params(&ComplaintQueryParams::default())
        .unwrap();
    assert_eq!(page.complaints.len(), 5);

    let bad = ComplaintQueryParams {
        status: Some("closed".to_string()),
        ..Default::default()
    };
    let err = h.service.list_public_from_params(&bad).unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_public_rows_carry_relations() {
    let h = TestHarness::new();
    let upload = h.service.store_upload("bukti.pdf", b"%PDF-1.4").unwrap();
    let created = h
        .service
        .create_complaint(SubmissionBuilder::new().build(), vec![upload])
        .unwrap();
    h.service
        .verify_complaint(&h.admin, created.id, true, None, Some("Segera ditangani"))
        .unwrap();

    let page = h
        .service
        .list_public_complaints(&ComplaintFilter::default())
        .unwrap();
    let row = &page.complaints[0];
    assert_eq!(row.attachments.len(), 1);
    assert_eq!(row.attachments[0].mime_type, "application/pdf");
    assert_eq!(row.responses.len(), 1);
    assert!(row.responses[0].is_from_admin);
}
