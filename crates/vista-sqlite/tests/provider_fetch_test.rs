//! End-to-end fetches against an in-memory SQLite database

use serde_json::json;
use vista_config::Widget;
use vista_query::{parse_query_pairs, DataRequest, Provider, ProviderError};
use vista_sqlite::{SqlProvider, SqlitePool};

const SEED: &str = r#"
CREATE TABLE customers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    tags TEXT,
    created_at INTEGER NOT NULL,
    avatar BLOB
);
INSERT INTO customers (id, name, tags, created_at, avatar) VALUES
    (1, 'Ann',   '["vip","active"]', 1700000000, X'616E6E'),
    (2, 'Bob',   '["active"]',       1700100000, NULL),
    (3, 'Carla', NULL,               1700200000, NULL);
"#;

const WIDGET: &str = r#"
id: customers
type: table
provider:
  name: main
  sql:
    query: SELECT id, name, tags, created_at, avatar FROM customers;
    pagination:
      column: id
      order: asc
    types:
      tags: json_array
table:
  columns: [id, name, tags]
  filters:
    - id: name
      type: text
      target: name
      operators: [contains]
    - id: tags
      type: select_multi
      target: tags
    - id: tag_search
      type: text
      target: tags
      operators: [contains]
    - id: created
      type: datetime
      target: created_at
      operators: [after]
"#;

fn provider() -> SqlProvider {
    let pool = SqlitePool::memory().unwrap();
    pool.with_connection(|conn| {
        conn.execute_batch(SEED)?;
        Ok(())
    })
    .unwrap();
    SqlProvider::with_pool(pool)
}

fn widget(yaml: &str) -> Widget {
    serde_yaml::from_str(yaml).unwrap()
}

fn ids(rows: &[vista_query::Row]) -> Vec<i64> {
    rows.iter().map(|row| row["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_keyset_pagination_round_trip() {
    let provider = provider();
    let widget = widget(WIDGET);

    let mut cursor = String::new();
    let mut seen = Vec::new();
    let pages = [(1, true, "1"), (2, true, "2"), (3, false, "")];
    for (expected_id, expected_more, expected_cursor) in pages {
        let request = DataRequest {
            limit: 1,
            cursor: cursor.clone(),
            filters: Vec::new(),
        };
        let page = provider.fetch(&widget, &request).await.unwrap();

        assert_eq!(ids(&page.data), vec![expected_id]);
        assert_eq!(page.total, 1);
        assert_eq!(page.has_more, expected_more);
        assert_eq!(page.next_cursor, expected_cursor);

        seen.push(expected_id);
        cursor = page.next_cursor;
    }
    assert_eq!(seen, vec![1, 2, 3]);

    // Stale cursor past the end
    let request = DataRequest {
        limit: 1,
        cursor: "3".to_string(),
        filters: Vec::new(),
    };
    let page = provider.fetch(&widget, &request).await.unwrap();
    assert!(page.data.is_empty());
    assert!(!page.has_more);
    assert_eq!(page.next_cursor, "");
}

#[tokio::test]
async fn test_descending_pagination() {
    let provider = provider();
    let widget = widget(&WIDGET.replace("order: asc", "order: desc"));

    let first = provider
        .fetch(&widget, &parse_query_pairs([("limit", "2")]))
        .await
        .unwrap();
    // Without a cursor the base query ordering (none here) applies
    assert_eq!(first.total, 2);
    assert!(first.has_more);

    let page = provider
        .fetch(&widget, &parse_query_pairs([("limit", "5"), ("cursor", "3")]))
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![2, 1]);
    assert!(!page.has_more);
    assert_eq!(page.next_cursor, "");

    let page = provider
        .fetch(&widget, &parse_query_pairs([("limit", "1"), ("cursor", "3")]))
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![2]);
    assert_eq!(page.next_cursor, "2");
}

#[tokio::test]
async fn test_fetch_is_idempotent() {
    let provider = provider();
    let widget = widget(WIDGET);
    let request = parse_query_pairs([("limit", "2"), ("name", "a")]);

    let first = provider.fetch(&widget, &request).await.unwrap();
    let second = provider.fetch(&widget, &request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_normalizes_rows() {
    let provider = provider();
    let widget = widget(&WIDGET.replace(
        "FROM customers;",
        "FROM customers UNION ALL SELECT 4, 'Dee', 'not json', 1700300000, NULL;",
    ));

    let page = provider
        .fetch(&widget, &DataRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 4);
    assert!(!page.has_more);
    assert_eq!(page.data[0]["tags"], json!(["vip", "active"]));
    assert_eq!(page.data[0]["avatar"], json!("ann"));
    assert_eq!(page.data[1]["avatar"], json!(null));
    assert_eq!(page.data[2]["tags"], json!(null));
    assert_eq!(page.data[3]["tags"], json!("not json"));
}

#[tokio::test]
async fn test_json_array_filters() {
    let provider = provider();
    let widget = widget(WIDGET);

    let page = provider
        .fetch(&widget, &parse_query_pairs([("tags", "vip"), ("tags", "missing")]))
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![1]);

    let page = provider
        .fetch(&widget, &parse_query_pairs([("tag_search", "activ")]))
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![1, 2]);
}

#[tokio::test]
async fn test_text_and_datetime_filters() {
    let provider = provider();
    let widget = widget(WIDGET);

    let page = provider
        .fetch(&widget, &parse_query_pairs([("name", "AR")]))
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![3]);

    let page = provider
        .fetch(&widget, &parse_query_pairs([("created", "1700000000")]))
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![2, 3]);

    let page = provider
        .fetch(&widget, &parse_query_pairs([("created.lt", "1700100000")]))
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![1]);
}

#[tokio::test]
async fn test_request_errors() {
    let provider = provider();
    let widget = widget(WIDGET);

    let err = provider
        .fetch(&widget, &parse_query_pairs([("created.between", "1700000000")]))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Build(_)));
    assert!(err.to_string().contains("between"));

    let err = provider
        .fetch(&widget, &parse_query_pairs([("created", "yesterday")]))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Build(_)));

    let err = provider
        .fetch(&widget, &parse_query_pairs([("name.like", "x")]))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "build query: unknown operator in filter 'name':like"
    );
}

#[tokio::test]
async fn test_execution_error_is_passed_through() {
    let provider = provider();
    let widget = widget(&WIDGET.replace("FROM customers;", "FROM missing_table;"));

    let err = provider
        .fetch(&widget, &DataRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Execute(_)));
    assert!(err.to_string().contains("no such table: missing_table"));
}

#[tokio::test]
async fn test_unconfigured_and_queryless() {
    let widget = widget(WIDGET);
    let err = SqlProvider::new()
        .fetch(&widget, &DataRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotConfigured));

    let err = provider()
        .fetch(&Widget::default(), &DataRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MissingQuery));
}

#[tokio::test]
async fn test_base_ordering_preserved() {
    let provider = provider();
    let widget = widget(
        r#"
id: by_name
provider:
  name: main
  sql:
    query: SELECT id, name FROM customers ORDER BY name DESC
"#,
    );

    let page = provider
        .fetch(&widget, &DataRequest::default())
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![3, 2, 1]);
    assert_eq!(page.next_cursor, "");
}

#[tokio::test]
async fn test_huge_limit_returns_everything() {
    let provider = provider();
    let widget = widget(WIDGET);

    for limit in ["18446744073709551615", "9223372036854775807"] {
        let page = provider
            .fetch(&widget, &parse_query_pairs([("limit", limit)]))
            .await
            .unwrap();
        assert_eq!(ids(&page.data), vec![1, 2, 3], "{limit}");
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, "");
    }

    let request = DataRequest {
        limit: usize::MAX,
        ..Default::default()
    };
    let err = provider.fetch(&widget, &request).await.unwrap_err();
    assert!(matches!(err, ProviderError::Build(_)));
}

#[tokio::test]
async fn test_commented_query() {
    let provider = provider();
    let widget = widget(
        r#"
id: commented
provider:
  name: main
  sql:
    query: |
      SELECT id, name -- don't show tags (yet)
      FROM customers /* skip ) avatars */
      -- ORDER BY id
      ORDER BY name DESC -- newest names first
"#,
    );

    let page = provider
        .fetch(&widget, &parse_query_pairs([("limit", "2")]))
        .await
        .unwrap();
    assert_eq!(ids(&page.data), vec![3, 2]);
    assert!(page.has_more);
}
