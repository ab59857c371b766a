use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use readout_core::errors::{DatabaseError, ReadoutError, StoreError};
use readout_core::source::{MessageConnection, MessageDatabase, MessageRow, ObjectStore};
use readout_core::{ObjectLocation, PageRenderer};

struct FixedStore(&'static str);

#[async_trait]
impl ObjectStore for FixedStore {
    async fn get_text(&self, _location: &ObjectLocation) -> Result<String, StoreError> {
        Ok(self.0.to_string())
    }
}

/// Hands out numbered connections and records what happens to each one.
#[derive(Default)]
struct CountingDatabase {
    next_id: AtomicUsize,
    log: Arc<Mutex<HashMap<usize, Vec<&'static str>>>>,
}

struct CountingConnection {
    id: usize,
    log: Arc<Mutex<HashMap<usize, Vec<&'static str>>>>,
}

#[async_trait]
impl MessageDatabase for CountingDatabase {
    async fn connect(&self) -> Result<Box<dyn MessageConnection>, DatabaseError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().entry(id).or_default().push("open");
        Ok(Box::new(CountingConnection {
            id,
            log: self.log.clone(),
        }))
    }
}

#[async_trait]
impl MessageConnection for CountingConnection {
    async fn first_message(&mut self) -> Result<Option<MessageRow>, DatabaseError> {
        self.log.lock().unwrap().entry(self.id).or_default().push("query");
        Ok(Some(MessageRow::new(format!("message-{}", self.id))))
    }

    async fn close(self: Box<Self>) -> Result<(), DatabaseError> {
        self.log.lock().unwrap().entry(self.id).or_default().push("close");
        Ok(())
    }
}

struct FailingConnectDatabase;

#[async_trait]
impl MessageDatabase for FailingConnectDatabase {
    async fn connect(&self) -> Result<Box<dyn MessageConnection>, DatabaseError> {
        Err(DatabaseError::ConnectTimeout {
            host: "db.internal".to_string(),
            seconds: 5,
        })
    }
}

fn location() -> ObjectLocation {
    ObjectLocation::new("site-bucket", "greeting.txt")
}

#[tokio::test]
async fn test_repeated_renders_use_independent_connections() {
    let database = Arc::new(CountingDatabase::default());
    let log = database.log.clone();
    let renderer = PageRenderer::new(Arc::new(FixedStore("S3-VALUE")), database, location());

    for i in 0..3 {
        let response = renderer.render().await.unwrap();
        assert_eq!(
            response.body,
            format!("<html><body><h1>S3-VALUE</h1><h2>message-{i}</h2></body></html>")
        );
    }

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 3);
    for id in 0..3 {
        assert_eq!(log[&id], vec!["open", "query", "close"], "connection {id}");
    }
}

#[tokio::test]
async fn test_concurrent_renders_do_not_share_connections() {
    let database = Arc::new(CountingDatabase::default());
    let log = database.log.clone();
    let renderer = Arc::new(PageRenderer::new(
        Arc::new(FixedStore("S3-VALUE")),
        database,
        location(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let renderer = renderer.clone();
            tokio::spawn(async move { renderer.render().await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 8);
    assert!(log.values().all(|events| events == &vec!["open", "query", "close"]));
}

#[tokio::test]
async fn test_connect_failure_propagates() {
    let renderer = PageRenderer::new(
        Arc::new(FixedStore("S3-VALUE")),
        Arc::new(FailingConnectDatabase),
        location(),
    );

    let err = renderer.render().await.unwrap_err();

    assert!(matches!(
        err,
        ReadoutError::Database(DatabaseError::ConnectTimeout { seconds: 5, .. })
    ));
}
