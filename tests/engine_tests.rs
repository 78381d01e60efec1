//! Integration tests for the ingestion engine using HTTP stubbing.
//!
//! Every test drives a full gather against a wiremock server: listing
//! pagination, sub-resource fan-out, and document resolution all run through
//! the real pipeline, with only the network and the browser fallback
//! replaced by doubles.

mod common;

use common::{test_config, StubDownloader};
use congress_ingest::errors::IngestError;
use congress_ingest::ingestion::{Diagnostic, IngestionEngine};
use congress_ingest::records::LegislativeClass;
use serde_json::json;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bill_item(number: u32) -> serde_json::Value {
    json!({
        "congress": 117,
        "type": "HR",
        "number": number,
        "title": format!("Test Bill {}", number),
        "originChamber": "House",
        "updateDate": "2022-09-29"
    })
}

/// Stub every bill sub-resource not explicitly mocked with an empty body
async fn mount_empty_sub_resources(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/bill/117/hr/[0-9]+/[a-z]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_gather_bills_end_to_end() {
    let server = MockServer::start().await;

    // Second listing page, matched by its offset before the catch-all
    Mock::given(method("GET"))
        .and(path("/bill"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bills": [bill_item(2)],
            "pagination": { "count": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // First listing page; also checks credential and format propagation
    Mock::given(method("GET"))
        .and(path("/bill"))
        .and(header("x-api-key", "test-key"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bills": [bill_item(1)],
            "pagination": {
                "count": 2,
                "next": format!("{}/bill?offset=1&limit=250", server.uri())
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Populated sub-resources for bill 1
    Mock::given(method("GET"))
        .and(path("/bill/117/hr/1/actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "actions": [
                { "actionDate": "2021-01-28", "text": "Introduced in House", "type": "IntroReferral" },
                { "actionDate": "2022-04-06", "text": "Became Public Law No: 117-108.", "type": "BecameLaw" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bill/117/hr/1/text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "textVersions": [{
                "type": "Introduced",
                "formats": [
                    { "url": format!("{}/doc.html", server.uri()), "type": "Formatted Text" }
                ]
            }]
        })))
        .mount(&server)
        .await;
    mount_empty_sub_resources(&server).await;

    // The artifact behind the text version
    Mock::given(method("GET"))
        .and(path("/doc.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><h1>AN ACT</h1><p>To test the pipeline.</p></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let (downloader, fallback_calls) = StubDownloader::empty();
    let config = test_config(&server.uri());
    let mut engine = IngestionEngine::with_downloader(&config, downloader).unwrap();

    let outcome = engine.gather_bills("2022-01-01", "2022-12-31").await.unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.records.len(), 2);
    // Listing order is preserved across pages
    assert_eq!(outcome.records[0].metadata.number, "1");
    assert_eq!(outcome.records[1].metadata.number, "2");
    assert_eq!(outcome.records[0].class, LegislativeClass::Bill);

    let first = &outcome.records[0];
    assert_eq!(first.actions.len(), 2);
    assert!(first.failures.is_empty());

    let resolved = &first.text_versions[0].formats[0];
    assert_eq!(
        resolved.text.as_deref(),
        Some("AN ACT To test the pipeline.")
    );
    // Direct fetch succeeded, so the browser fallback never ran
    assert_eq!(common::call_count(&fallback_calls), 0);
}

#[tokio::test]
async fn test_failed_sub_resource_does_not_abort_enrichment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bill"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bills": [bill_item(1)],
            "pagination": { "count": 1 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bill/117/hr/1/cosponsors"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bill/117/hr/1/titles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "titles": [{ "title": "Test Bill 1", "titleType": "Display Title" }]
        })))
        .mount(&server)
        .await;
    mount_empty_sub_resources(&server).await;

    let (downloader, _) = StubDownloader::empty();
    let config = test_config(&server.uri());
    let mut engine = IngestionEngine::with_downloader(&config, downloader).unwrap();

    let outcome = engine.gather_bills("2022-01-01", "2022-12-31").await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    let bill = &outcome.records[0];
    // The failure is recorded, the sibling sub-resource still populated
    assert_eq!(bill.failures.len(), 1);
    assert_eq!(bill.failures[0].sub_resource, "cosponsors");
    assert!(bill.cosponsors.is_empty());
    assert_eq!(bill.titles.len(), 1);

    // The same failure is mirrored into the gather-level diagnostics
    assert_eq!(outcome.soft_failure_count(), 1);
    assert!(matches!(
        &outcome.diagnostics[0],
        Diagnostic::SubResource { record, sub_resource, .. }
            if record == "bill/117/hr/1" && sub_resource == "cosponsors"
    ));
}

#[tokio::test]
async fn test_listing_page_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bill"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (downloader, _) = StubDownloader::empty();
    let config = test_config(&server.uri());
    let mut engine = IngestionEngine::with_downloader(&config, downloader).unwrap();

    let err = engine
        .gather_bills("2022-01-01", "2022-12-31")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::PageFetch { offset: 0, .. }));
}

#[tokio::test]
async fn test_undecodable_listing_item_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bill"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bills": [
                bill_item(1),
                { "congress": 117, "type": "NOT_A_BILL_TYPE", "number": 2 }
            ],
            "pagination": { "count": 2 }
        })))
        .mount(&server)
        .await;
    mount_empty_sub_resources(&server).await;

    let (downloader, _) = StubDownloader::empty();
    let config = test_config(&server.uri());
    let mut engine = IngestionEngine::with_downloader(&config, downloader).unwrap();

    let outcome = engine.gather_bills("2022-01-01", "2022-12-31").await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.diagnostics.len(), 1);
    match &outcome.diagnostics[0] {
        Diagnostic::ValidationSkip { index, .. } => assert_eq!(*index, 1),
        other => panic!("unexpected diagnostic: {:?}", other),
    }
}

#[tokio::test]
async fn test_gather_laws_marks_class_and_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/law/117"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bills": [bill_item(3076)],
            "pagination": { "count": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_sub_resources(&server).await;

    let (downloader, _) = StubDownloader::empty();
    let config = test_config(&server.uri());
    let mut engine = IngestionEngine::with_downloader(&config, downloader).unwrap();

    let outcome = engine.gather_laws(117, "2022-01-01", "2022-12-31").await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].class, LegislativeClass::Law);
    assert_eq!(outcome.records[0].metadata.number, "3076");
}

#[tokio::test]
async fn test_gather_amendments_enriches_reduced_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/amendment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "amendments": [{
                "congress": 117,
                "type": "SAMDT",
                "number": "2137",
                "purpose": "In the nature of a substitute."
            }],
            "pagination": { "count": 1 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/amendment/117/samdt/2137/actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "actions": [{ "actionDate": "2021-08-08", "text": "Agreed to in Senate", "type": "Floor" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/amendment/117/samdt/2137/[a-z]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let (downloader, _) = StubDownloader::empty();
    let config = test_config(&server.uri());
    let mut engine = IngestionEngine::with_downloader(&config, downloader).unwrap();

    let outcome = engine
        .gather_amendments("2021-01-01", "2022-12-31")
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    let amendment = &outcome.records[0];
    assert_eq!(amendment.metadata.number, "2137");
    assert_eq!(amendment.actions.len(), 1);
    assert!(amendment.failures.is_empty());
}

#[tokio::test]
async fn test_gather_record_issues_pages_and_tolerates_bad_pdf() {
    let server = MockServer::start().await;

    let issue = |id: u64, with_pdf: bool| {
        let links = if with_pdf {
            json!({
                "Digest": {
                    "Label": "Daily Digest",
                    "Ordinal": 1,
                    "PDF": [{ "Part": 1, "Url": format!("{}/crec-digest.pdf", server.uri()) }]
                }
            })
        } else {
            json!({})
        };
        json!({
            "Congress": 117,
            "Id": id,
            "Issue": "109",
            "Volume": "168",
            "Session": "2",
            "PublishDate": "2022-06-23",
            "Links": links
        })
    };

    Mock::given(method("GET"))
        .and(path("/congressional-record"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Results": {
                "Issues": [issue(3, false)],
                "TotalCount": 3,
                "IndexStart": 2
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/congressional-record"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Results": {
                "Issues": [issue(1, true), issue(2, false)],
                "TotalCount": 3,
                "IndexStart": 0
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The linked PDF is corrupt; resolution must fail terminally without
    // aborting the gather
    Mock::given(method("GET"))
        .and(path("/crec-digest.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"not a pdf".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let (downloader, _) = StubDownloader::empty();
    let config = test_config(&server.uri());
    let mut engine = IngestionEngine::with_downloader(&config, downloader).unwrap();

    let outcome = engine
        .gather_record_issues("2022-06-01", "2022-06-30")
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[0].id, 1);
    assert_eq!(outcome.records[2].id, 3);

    // Terminal document failure: recorded, marked final, text assembled empty
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(matches!(
        &outcome.diagnostics[0],
        Diagnostic::DocumentFailure { .. }
    ));
    let digest = outcome.records[0].links.digest.as_ref().unwrap();
    assert_eq!(digest.pdf[0].text.as_deref(), Some(""));
    assert_eq!(digest.full_text.as_deref(), Some(""));
}

#[tokio::test]
async fn test_gather_bound_record_issues() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bound-congressional-record"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Results": {
                "Issues": [{
                    "Congress": 109,
                    "Id": 552,
                    "Volume": "151",
                    "Session": "1",
                    "PublishDate": "2005-06-20",
                    "Links": {}
                }],
                "TotalCount": 1,
                "IndexStart": 0
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (downloader, _) = StubDownloader::empty();
    let config = test_config(&server.uri());
    let mut engine = IngestionEngine::with_downloader(&config, downloader).unwrap();

    let outcome = engine
        .gather_bound_record_issues("2005-06-01", "2005-06-30")
        .await
        .unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].congress, 109);
}
