//! End-to-end ingestion tests against both store backends.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use cpe_dictionary::config::{DbConfig, MalformedPolicy};
use cpe_dictionary::error::{Error, StoreError};
use cpe_dictionary::ingest::{ingest_feed, IngestOptions};
use cpe_dictionary::lookup::{get_by_exact_title, get_by_like_title};
use cpe_dictionary::models::CategorizedCpe;
use cpe_dictionary::store::{open_store, InMemoryStore, SqliteStore, Store};

const SAMPLE_FEED: &[u8] = include_bytes!("fixtures/nvd_sample.xml");

fn options(chunk_size: usize) -> IngestOptions {
    IngestOptions {
        chunk_size,
        on_malformed: MalformedPolicy::Abort,
    }
}

fn titles(records: &[CategorizedCpe]) -> Vec<&str> {
    records.iter().map(|r| r.title.as_str()).collect()
}

/// Delegates to an in-memory store but rejects the `fail_on`-th insert.
struct FlakyStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
    fail_on: usize,
}

#[async_trait]
impl Store for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.inner.close().await
    }

    async fn insert_cpes(&self, cpes: &[CategorizedCpe]) -> Result<(), StoreError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_on {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.inner.insert_cpes(cpes).await
    }

    async fn get_by_exact_title(&self, title: &str) -> Result<Vec<CategorizedCpe>, StoreError> {
        self.inner.get_by_exact_title(title).await
    }

    async fn get_by_like_title(&self, title: &str) -> Result<Vec<CategorizedCpe>, StoreError> {
        self.inner.get_by_like_title(title).await
    }

    async fn count(&self) -> Result<i64, StoreError> {
        self.inner.count().await
    }
}

#[tokio::test]
async fn test_sample_feed_into_memory_store() {
    let store = InMemoryStore::new();
    let summary = ingest_feed(&store, SAMPLE_FEED, &options(3)).await.unwrap();

    assert_eq!(summary.items, 6);
    assert_eq!(summary.records, 7);
    assert_eq!(summary.chunks, 3);
    assert_eq!(summary.skipped, 0);

    let records = store.records();
    assert_eq!(
        titles(&records),
        vec![
            "nginx 1.2",
            "nginx 1.2 beta",
            "old nginx server",
            "$0.99 Kindle Books project $0.99 Kindle Books (aka com.kindle.books.for99) for android 6.0",
            "Microsoft Windows 10 1607 x64",
            "Windows 10 Anniversary Update",
            "AT&T Connect 9.7",
        ]
    );
}

#[tokio::test]
async fn test_bindings_match_published_names() {
    let store = InMemoryStore::new();
    ingest_feed(&store, SAMPLE_FEED, &options(500)).await.unwrap();

    let expect = |title: &str, uri: &str, fs: &str| {
        let record = store
            .records()
            .into_iter()
            .find(|r| r.title == title)
            .unwrap();
        assert_eq!(record.cpe_uri, uri, "{}", title);
        assert_eq!(record.cpe_fs, fs, "{}", title);
    };

    expect(
        "nginx 1.2 beta",
        "cpe:/a:nginx:nginx:1.2:beta",
        "cpe:2.3:a:nginx:nginx:1.2:beta:*:*:*:*:*:*",
    );
    expect(
        "old nginx server",
        "cpe:/a:oldsoft:nginx_server:-",
        "cpe:2.3:a:oldsoft:nginx_server:-:*:*:*:*:*:*:*",
    );
    expect(
        "$0.99 Kindle Books project $0.99 Kindle Books (aka com.kindle.books.for99) for android 6.0",
        "cpe:/a:%240.99_kindle_books_project:%240.99_kindle_books:6::~~~android~~",
        "cpe:2.3:a:\\$0.99_kindle_books_project:\\$0.99_kindle_books:6:*:*:*:*:android:*:*",
    );
    expect(
        "AT&T Connect 9.7",
        "cpe:/a:at%26t:connect:9.7",
        "cpe:2.3:a:at\\&t:connect:9.7:*:*:*:*:*:*:*",
    );
}

#[tokio::test]
async fn test_sample_feed_into_sqlite_store() {
    let tmp = TempDir::new().unwrap();
    let config = DbConfig {
        dialect: "sqlite3".to_string(),
        path: tmp.path().join("cpe.sqlite"),
    };
    let store = open_store(&config).await.unwrap();
    let summary = ingest_feed(store.as_ref(), SAMPLE_FEED, &options(2))
        .await
        .unwrap();
    assert_eq!(summary.chunks, 4);
    assert_eq!(store.count().await.unwrap(), 7);

    let exact = get_by_exact_title(store.as_ref(), "nginx 1.2").await.unwrap();
    assert_eq!(titles(&exact), vec!["nginx 1.2"]);
    assert_eq!(exact[0].cpe_uri, "cpe:/a:nginx:nginx:1.2");

    let like = get_by_like_title(store.as_ref(), "nginx").await.unwrap();
    assert_eq!(
        titles(&like),
        vec!["nginx 1.2", "nginx 1.2 beta", "old nginx server"]
    );

    let dollar = get_by_like_title(store.as_ref(), "$0.99").await.unwrap();
    assert_eq!(dollar.len(), 1);
    assert!(get_by_like_title(store.as_ref(), "NGINX").await.unwrap().is_empty());

    store.close().await.unwrap();
}

#[tokio::test]
async fn test_only_en_us_titles_are_stored() {
    let store = InMemoryStore::new();
    ingest_feed(&store, SAMPLE_FEED, &options(10)).await.unwrap();

    assert!(get_by_like_title(&store, "日本語").await.unwrap().is_empty());
    assert!(get_by_like_title(&store, "Deutsch").await.unwrap().is_empty());
    assert_eq!(get_by_like_title(&store, "Windows 10").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_chunk_keeps_earlier_chunks() {
    let store = FlakyStore {
        inner: InMemoryStore::new(),
        calls: AtomicUsize::new(0),
        fail_on: 1,
    };
    let err = ingest_feed(&store, SAMPLE_FEED, &options(3)).await.unwrap_err();

    match err {
        Error::Store {
            chunk,
            committed,
            source,
        } => {
            assert_eq!(chunk, 1);
            assert_eq!(committed, 3);
            assert!(matches!(source, StoreError::Backend(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(store.count().await.unwrap(), 3);
    // No retry and nothing after the failing chunk.
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sqlite_chunk_failure_rolls_back_only_that_chunk() {
    let tmp = TempDir::new().unwrap();
    let store = SqliteStore::open(&tmp.path().join("cpe.sqlite"))
        .await
        .unwrap();
    sqlx::query(
        r#"
        CREATE TRIGGER reject_old BEFORE INSERT ON categorized_cpes
        WHEN NEW.title = 'old nginx server'
        BEGIN SELECT RAISE(ABORT, 'rejected'); END
        "#,
    )
    .execute(store.pool())
    .await
    .unwrap();

    let err = ingest_feed(&store, SAMPLE_FEED, &options(2)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Store {
            chunk: 1,
            committed: 2,
            ..
        }
    ));

    assert_eq!(store.count().await.unwrap(), 2);
    assert!(get_by_like_title(&store, "Kindle").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_feed_writes_nothing() {
    let store = InMemoryStore::new();
    let summary = ingest_feed(&store, b"<cpe-list></cpe-list>", &options(5))
        .await
        .unwrap();
    assert_eq!(summary.records, 0);
    assert_eq!(summary.chunks, 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_name_policies() {
    let feed = String::from_utf8(SAMPLE_FEED.to_vec())
        .unwrap()
        .replace(
            "cpe:2.3:a:oldsoft:nginx_server:-:*:*:*:*:*:*:*",
            "cpe:2.4:a:oldsoft:nginx_server:-:*:*:*:*:*:*:*",
        );

    let store = InMemoryStore::new();
    let err = ingest_feed(&store, feed.as_bytes(), &options(1))
        .await
        .unwrap_err();
    match err {
        Error::Conversion(e) => assert!(e.input.starts_with("cpe:2.4:")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(store.count().await.unwrap(), 0);

    let skip = IngestOptions {
        chunk_size: 1,
        on_malformed: MalformedPolicy::Skip,
    };
    let summary = ingest_feed(&store, feed.as_bytes(), &skip).await.unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.records, 6);
    assert!(get_by_exact_title(&store, "old nginx server")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_invalid_document_is_a_parse_error() {
    let store = InMemoryStore::new();
    let err = ingest_feed(&store, b"<cpe-list><cpe-item name=\"x\">", &options(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn test_zero_chunk_size_fails_before_writing() {
    let store = InMemoryStore::new();
    let err = ingest_feed(&store, SAMPLE_FEED, &options(0)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Store {
            source: StoreError::InvalidChunkSize,
            ..
        }
    ));
    assert_eq!(store.count().await.unwrap(), 0);
}
