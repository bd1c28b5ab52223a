//! Integration tests for Gutendex Dataset
//!
//! These tests run whole collection passes against the mock source and
//! against a local HTTP server speaking the Gutendex wire format.

use gutendex_dataset::harvest::{FailureKind, HarvestOptions, Harvester};
use gutendex_dataset::models::{BookRecord, SearchQuery};
use gutendex_dataset::sources::mock::{make_book, make_listing, text_url, MockSource, MOCK_BASE};
use gutendex_dataset::sources::{BookSource, GutendexSource};
use gutendex_dataset::utils::HttpClient;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn quick_options() -> HarvestOptions {
    HarvestOptions {
        delay: Duration::ZERO,
        max_pages: None,
        quiet: true,
    }
}

fn read_records(path: &Path) -> Vec<BookRecord> {
    csv::Reader::from_path(path)
        .unwrap()
        .deserialize()
        .collect::<Result<Vec<BookRecord>, _>>()
        .unwrap()
}

#[tokio::test]
async fn test_single_fetch_failure_is_isolated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.csv");
    let query = SearchQuery::new("science fiction");

    let source = MockSource::new();
    source.set_page(
        source.listing_url(&query),
        make_listing(
            vec![
                make_book(1, "First", "Author One"),
                make_book(2, "Second", "Author Two"),
                make_book(3, "Third", "Author Three"),
            ],
            None,
        ),
    );
    source.set_text(text_url(1), "one");
    source.set_text(text_url(3), "three");

    let summary = Harvester::new(source, quick_options())
        .run(&query, &path)
        .await
        .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].id, Some(2));
    assert!(matches!(summary.failures[0].kind, FailureKind::Fetch(_)));

    let records = read_records(&path);
    assert_eq!(
        records,
        vec![
            BookRecord::new(1, "First", "Author One", "one"),
            BookRecord::new(3, "Third", "Author Three", "three"),
        ]
    );
}

#[tokio::test]
async fn test_three_page_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.csv");
    let query = SearchQuery::new("Astronomy");

    let page2 = format!("{}/?page=2&topic=Astronomy", MOCK_BASE);
    let page3 = format!("{}/?page=3&topic=Astronomy", MOCK_BASE);

    let source = MockSource::new();
    source.set_page(
        source.listing_url(&query),
        make_listing(vec![make_book(10, "A", "X")], Some(&page2)),
    );
    source.set_page(
        page2.clone(),
        make_listing(vec![make_book(20, "B", "Y")], Some(&page3)),
    );
    source.set_page(page3.clone(), make_listing(vec![make_book(30, "C", "Z")], None));
    for id in [10, 20, 30] {
        source.set_text(text_url(id), format!("body {}", id));
    }

    let harvester = Harvester::new(source, quick_options());
    let summary = harvester.run(&query, &path).await.unwrap();

    assert_eq!(summary.pages, 3);
    assert_eq!(summary.written, 3);
    assert!(summary.failures.is_empty());
    assert_eq!(harvester.source().request_count(&page2), 1);
    assert_eq!(harvester.source().request_count(&page3), 1);

    let ids: Vec<u64> = read_records(&path).iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
}

#[tokio::test]
async fn test_max_pages_stops_early() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.csv");
    let query = SearchQuery::new("history");
    let page2 = format!("{}/?page=2&topic=history", MOCK_BASE);

    let source = MockSource::new();
    source.set_page(
        source.listing_url(&query),
        make_listing(vec![make_book(1, "A", "X")], Some(&page2)),
    );
    source.set_text(text_url(1), "body");

    let options = HarvestOptions {
        max_pages: Some(1),
        ..quick_options()
    };
    let harvester = Harvester::new(source, options);
    let summary = harvester.run(&query, &path).await.unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.written, 1);
    assert_eq!(harvester.source().request_count(&page2), 0);
}

#[tokio::test]
async fn test_text_with_commas_and_newlines_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.csv");
    let query = SearchQuery::new("poetry");
    let body = "Line one, with a comma\nLine \"two\"\r\n\nThe End";

    let source = MockSource::new();
    source.set_page(
        source.listing_url(&query),
        make_listing(vec![make_book(7, "Odes, Vol. 1", "Keats, John")], None),
    );
    source.set_text(text_url(7), body);

    Harvester::new(source, quick_options())
        .run(&query, &path)
        .await
        .unwrap();

    let records = read_records(&path);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Odes, Vol. 1");
    assert_eq!(records[0].author, "Keats, John");
    assert_eq!(records[0].text, body);
}

#[tokio::test]
async fn test_end_to_end_with_http_server() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sci-fi-books.csv");

    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let page1 = json!({
        "count": 3,
        "next": format!("{}/books/?page=2&topic=science+fiction", base),
        "previous": null,
        "results": [
            {
                "id": 84,
                "title": "Frankenstein; Or, The Modern Prometheus",
                "authors": [{"name": "Shelley, Mary Wollstonecraft", "birth_year": 1797, "death_year": 1851}],
                "formats": {
                    "text/plain; charset=us-ascii": format!("{}/files/84/84-0.txt", base),
                    "text/html": format!("{}/files/84/84-h.htm", base)
                }
            },
            {
                "id": 35,
                "title": "The Time Machine",
                "authors": [{"name": "Wells, H. G. (Herbert George)", "birth_year": 1866, "death_year": 1946}],
                "formats": {"application/epub+zip": format!("{}/ebooks/35.epub", base)}
            }
        ]
    });
    let page2 = json!({
        "count": 3,
        "next": null,
        "previous": format!("{}/books/?topic=science+fiction", base),
        "results": [
            {
                "id": 164,
                "title": "Twenty Thousand Leagues under the Sea",
                "authors": [{"name": "Verne, Jules", "birth_year": 1828, "death_year": 1905}],
                "formats": {
                    "text/plain; charset=us-ascii": format!("{}/files/164/164.txt", base)
                }
            }
        ]
    });

    let first = server
        .mock("GET", "/books/")
        .match_query(mockito::Matcher::UrlEncoded(
            "topic".into(),
            "science fiction".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page1.to_string())
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/books/")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("page".into(), "2".into()),
            mockito::Matcher::UrlEncoded("topic".into(), "science fiction".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page2.to_string())
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/files/84/84-0.txt")
        .with_status(200)
        .with_body("You will rejoice to hear that no disaster has accompanied")
        .create_async()
        .await;
    server
        .mock("GET", "/files/164/164.txt")
        .with_status(200)
        .with_body("The year 1866 was signalised by a remarkable incident")
        .create_async()
        .await;

    let source = GutendexSource::with_client(HttpClient::new().unwrap(), &base);
    let summary = Harvester::new(source, quick_options())
        .run(&SearchQuery::new("science fiction"), &path)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.total_reported, Some(3));
    assert_eq!(summary.written, 2);
    assert_eq!(summary.processed(), 3);
    assert_eq!(summary.failures[0].id, Some(35));
    assert!(matches!(summary.failures[0].kind, FailureKind::MissingPlaintext));

    let records = read_records(&path);
    assert_eq!(
        records,
        vec![
            BookRecord::new(
                84,
                "Frankenstein; Or, The Modern Prometheus",
                "Shelley, Mary Wollstonecraft",
                "You will rejoice to hear that no disaster has accompanied"
            ),
            BookRecord::new(
                164,
                "Twenty Thousand Leagues under the Sea",
                "Verne, Jules",
                "The year 1866 was signalised by a remarkable incident"
            ),
        ]
    );
}

#[tokio::test]
async fn test_server_error_on_listing_aborts_with_header_only() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.csv");

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/books/")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let source = GutendexSource::with_client(HttpClient::new().unwrap(), server.url());
    let result = Harvester::new(source, quick_options())
        .run(&SearchQuery::new("anything"), &path)
        .await;

    assert!(result.is_err());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "id,title,author,text\n"
    );
}
