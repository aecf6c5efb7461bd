//! Tests for object sources

use super::*;
use crate::error::Error;
use crate::types::Cursor;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Batch / FetchStart Tests
// ============================================================================

#[test]
fn test_batch_with_cursor() {
    let batch = Batch::new(vec![1, 2, 3]).with_cursor(Cursor::new("next"));
    assert_eq!(batch.len(), 3);
    assert!(!batch.is_empty());
    assert_eq!(batch.next_cursor, Some(Cursor::new("next")));
}

#[test]
fn test_fetch_start() {
    assert_eq!(FetchStart::beginning(), FetchStart::Offset(0));
    assert!(!FetchStart::Offset(3).is_cursor());
    assert!(FetchStart::Cursor(Cursor::new("c")).is_cursor());
}

// ============================================================================
// VecSource Tests
// ============================================================================

#[tokio::test]
async fn test_vec_source_positional_slices() {
    let source = VecSource::positional("nums", (0..25).collect::<Vec<u32>>());
    assert!(!source.supports_cursors());
    assert_eq!(source.cache_key(), "nums");

    let batch = source.fetch(FetchStart::Offset(10), 10).await.unwrap();
    assert_eq!(batch.items, (10..20).collect::<Vec<_>>());
    assert!(batch.next_cursor.is_none());

    let tail = source.fetch(FetchStart::Offset(20), 10).await.unwrap();
    assert_eq!(tail.items, vec![20, 21, 22, 23, 24]);

    let past_end = source.fetch(FetchStart::Offset(100), 10).await.unwrap();
    assert!(past_end.is_empty());
    assert_eq!(source.fetches(), 3);
}

#[tokio::test]
async fn test_vec_source_cursor_resumes_where_captured() {
    let source = VecSource::cursored("nums", (0..12).collect::<Vec<u32>>());
    assert!(source.supports_cursors());

    let first = source.fetch(FetchStart::beginning(), 5).await.unwrap();
    let cursor = first.next_cursor.clone().unwrap();

    let second = source.fetch(FetchStart::Cursor(cursor), 5).await.unwrap();
    assert_eq!(second.items, vec![5, 6, 7, 8, 9]);
    assert_eq!(source.cursor_fetches(), 1);

    // The batch reaching the end carries no cursor, full or not
    let last = source.fetch(FetchStart::Offset(7), 5).await.unwrap();
    assert_eq!(last.items, vec![7, 8, 9, 10, 11]);
    assert!(last.next_cursor.is_none());
}

#[tokio::test]
async fn test_vec_source_rejects_foreign_cursor() {
    let source = VecSource::cursored("nums", vec![1, 2, 3]);
    let err = source
        .fetch(FetchStart::Cursor(Cursor::new("other@1")), 2)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Source { .. }));
}

#[tokio::test]
async fn test_positional_source_rejects_cursor() {
    let source = VecSource::positional("nums", vec![1, 2, 3]);
    let result = source
        .fetch(FetchStart::Cursor(Cursor::new("nums@1")), 2)
        .await;
    assert!(result.is_err());
}

// ============================================================================
// JSON Path Tests
// ============================================================================

#[test]
fn test_extract_path() {
    let body = json!({"meta": {"next": "tok", "count": 3, "done": false}, "data": [1]});
    assert_eq!(extract_path(&body, "$.data"), Some(&json!([1])));
    assert_eq!(extract_string(&body, "meta.next"), Some("tok".to_string()));
    assert_eq!(extract_string(&body, "$.meta.count"), Some("3".to_string()));
    assert_eq!(extract_string(&body, "meta.done"), Some("false".to_string()));
    assert_eq!(extract_string(&body, "meta.missing"), None);
    assert_eq!(extract_string(&body, "data"), None);
    assert_eq!(extract_path(&body, "$"), Some(&body));
}

#[test]
fn test_extract_records() {
    let body = json!({
        "data": [{"id": 1}, {"id": 2}],
        "results": [{"items": [{"id": 3}]}, {"items": []}],
        "meta": {"count": 2}
    });

    assert_eq!(
        extract_records(&body, "data").unwrap(),
        vec![json!({"id": 1}), json!({"id": 2})]
    );
    assert_eq!(
        extract_records(&body, "$.data[*]").unwrap(),
        vec![json!({"id": 1}), json!({"id": 2})]
    );
    assert_eq!(
        extract_records(&body, "$.results[0].items").unwrap(),
        vec![json!({"id": 3})]
    );
    assert!(extract_records(&body, "$.results[1].items[*]")
        .unwrap()
        .is_empty());

    for bad in ["meta", "$.results[0]", "$.missing[*]", "$.results[5].items", "missing"] {
        assert!(
            matches!(
                extract_records(&body, bad),
                Err(Error::RecordExtraction { .. })
            ),
            "{bad}"
        );
    }
}

// ============================================================================
// HttpSourceConfig Tests
// ============================================================================

#[test]
fn test_http_config_validation() {
    let config = HttpSourceConfig::new("https://api.example.com/items", "next_cursor");
    assert!(config.validate().is_ok());

    let mut no_paging = config.clone();
    no_paging.cursor_path = None;
    assert!(no_paging.validate().is_err());
    assert!(no_paging.with_offset_param("offset").validate().is_ok());

    let bad_url = HttpSourceConfig::new("not a url", "next");
    assert!(matches!(bad_url.validate(), Err(Error::InvalidUrl(_))));

    let empty = HttpSourceConfig::new("", "next");
    assert!(matches!(
        empty.validate(),
        Err(Error::MissingConfigField { .. })
    ));
}

#[test]
fn test_http_config_defaults_from_yaml() {
    let config: HttpSourceConfig = serde_yaml::from_str(
        r"
url: https://api.example.com/events
cursor_path: nextPageToken
cursor_param: pageToken
records_path: items
",
    )
    .unwrap();
    assert_eq!(config.cursor_param, "pageToken");
    assert_eq!(config.limit_param, "limit");
    assert_eq!(config.timeout_secs, 30);
    assert!(config.offset_param.is_none());
}

#[test]
fn test_http_cache_key_is_deterministic() {
    let a = HttpCursorSource::new(
        HttpSourceConfig::new("https://api.example.com/items", "next")
            .with_param("status", "open")
            .with_param("order", "asc"),
    )
    .unwrap();
    let b = HttpCursorSource::new(
        HttpSourceConfig::new("https://api.example.com/items", "next")
            .with_param("order", "asc")
            .with_param("status", "open"),
    )
    .unwrap();
    let c = HttpCursorSource::new(
        HttpSourceConfig::new("https://api.example.com/items", "next")
            .with_param("status", "closed"),
    )
    .unwrap();

    assert_eq!(a.cache_key(), b.cache_key());
    assert_ne!(a.cache_key(), c.cache_key());
}

#[test]
fn test_http_cache_key_covers_request_shape() {
    let base = HttpSourceConfig::new("https://api.example.com/items", "next");
    let key = |config: HttpSourceConfig| HttpCursorSource::new(config).unwrap().cache_key();

    let variants = [
        key(base.clone()),
        key(base.clone().with_limit_param("page_size")),
        key(base.clone().with_offset_param("offset")),
        key(base.clone().with_header("X-Tenant", "acme")),
        key(base.clone().with_header("X-Tenant", "globex")),
        key(base.clone().with_records_path("data")),
        key(base.clone().with_cursor_param("after")),
    ];
    for (i, a) in variants.iter().enumerate() {
        for b in &variants[i + 1..] {
            assert_ne!(a, b);
        }
    }

    let headers_in_order = key(
        base.clone()
            .with_header("X-Tenant", "acme")
            .with_header("Accept", "application/json"),
    );
    let headers_reversed = key(
        base.with_header("Accept", "application/json")
            .with_header("X-Tenant", "acme"),
    );
    assert_eq!(headers_in_order, headers_reversed);
}

// ============================================================================
// HttpCursorSource Tests
// ============================================================================

#[tokio::test]
async fn test_http_source_cursor_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("limit", "2"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1}, {"id": 2}],
            "next_cursor": "c2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 3}],
            "next_cursor": ""
        })))
        .mount(&server)
        .await;

    let source = HttpCursorSource::new(
        HttpSourceConfig::new(format!("{}/items", server.uri()), "next_cursor")
            .with_records_path("data"),
    )
    .unwrap();
    assert!(source.supports_cursors());

    let first = source.fetch(FetchStart::beginning(), 2).await.unwrap();
    assert_eq!(first.items, vec![json!({"id": 1}), json!({"id": 2})]);
    let cursor = first.next_cursor.unwrap();
    assert_eq!(cursor.as_str(), "c2");

    let second = source.fetch(FetchStart::Cursor(cursor), 2).await.unwrap();
    assert_eq!(second.items, vec![json!({"id": 3})]);
    assert!(second.next_cursor.is_none());
}

#[tokio::test]
async fn test_http_source_offset_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rows"))
        .and(query_param("offset", "20"))
        .and(query_param("limit", "10"))
        .and(query_param("sort", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 20}])))
        .mount(&server)
        .await;

    let mut config = HttpSourceConfig::new(format!("{}/rows", server.uri()), "unused")
        .with_offset_param("offset")
        .with_param("sort", "id");
    config.cursor_path = None;
    let source = HttpCursorSource::new(config).unwrap();
    assert!(!source.supports_cursors());

    let batch = source.fetch(FetchStart::Offset(20), 10).await.unwrap();
    assert_eq!(batch.items, vec![json!({"id": 20})]);
}

#[tokio::test]
async fn test_http_source_skips_forward_without_offset_param() {
    let server = MockServer::start().await;

    // Skip request: exactly 3 items to land on offset 3
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("limit", "3"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [0, 1, 2],
            "next": "at3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("limit", "5"))
        .and(query_param("cursor", "at3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [3, 4, 5, 6, 7],
            "next": "at8"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpCursorSource::new(
        HttpSourceConfig::new(format!("{}/items", server.uri()), "next").with_records_path("data"),
    )
    .unwrap();

    let batch = source.fetch(FetchStart::Offset(3), 5).await.unwrap();
    assert_eq!(batch.items, vec![json!(3), json!(4), json!(5), json!(6), json!(7)]);
    assert_eq!(batch.next_cursor, Some(Cursor::new("at8")));
}

#[tokio::test]
async fn test_http_source_keeps_oversized_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [1, 2, 3, 4],
            "next": "after4"
        })))
        .mount(&server)
        .await;

    let source = HttpCursorSource::new(
        HttpSourceConfig::new(format!("{}/items", server.uri()), "next").with_records_path("data"),
    )
    .unwrap();

    // The cursor resumes after the fourth record, so all four are kept
    let batch = source.fetch(FetchStart::beginning(), 2).await.unwrap();
    assert_eq!(batch.items, vec![json!(1), json!(2), json!(3), json!(4)]);
    assert_eq!(batch.next_cursor, Some(Cursor::new("after4")));
}

#[tokio::test]
async fn test_http_source_bracketed_records_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"items": [{"id": 1}, {"id": 2}]}],
            "paging": {"next": "p2"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("cursor", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"items": [{"id": 3}]}],
            "paging": {}
        })))
        .mount(&server)
        .await;

    let source = HttpCursorSource::new(
        HttpSourceConfig::new(format!("{}/search", server.uri()), "paging.next")
            .with_records_path("$.results[0].items"),
    )
    .unwrap();

    let first = source.fetch(FetchStart::beginning(), 2).await.unwrap();
    assert_eq!(first.items, vec![json!({"id": 1}), json!({"id": 2})]);
    let cursor = first.next_cursor.unwrap();

    let second = source.fetch(FetchStart::Cursor(cursor), 2).await.unwrap();
    assert_eq!(second.items, vec![json!({"id": 3})]);
    assert!(second.next_cursor.is_none());
}

#[tokio::test]
async fn test_http_source_wildcard_records_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
            "next_cursor": "c3"
        })))
        .mount(&server)
        .await;

    let source = HttpCursorSource::new(
        HttpSourceConfig::new(format!("{}/events", server.uri()), "next_cursor")
            .with_records_path("$.data[*]"),
    )
    .unwrap();

    let batch = source.fetch(FetchStart::beginning(), 3).await.unwrap();
    assert_eq!(
        batch.items,
        vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})]
    );
    assert_eq!(batch.next_cursor, Some(Cursor::new("c3")));
}

#[tokio::test]
async fn test_http_source_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let source =
        HttpCursorSource::new(HttpSourceConfig::new(format!("{}/items", server.uri()), "next"))
            .unwrap();

    let err = source.fetch(FetchStart::beginning(), 5).await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "down");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_source_missing_records_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let source = HttpCursorSource::new(
        HttpSourceConfig::new(format!("{}/items", server.uri()), "next").with_records_path("data"),
    )
    .unwrap();

    let err = source.fetch(FetchStart::beginning(), 5).await.unwrap_err();
    assert!(matches!(err, Error::RecordExtraction { .. }));
}
