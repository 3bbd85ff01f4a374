//! Test harness for price alert store testing
//!
//! Provides:
//! - An in-memory `PriceAlertRepo` with fault injection and an operation log
//! - Connection/connector wrappers so a `StoreHandle` can be built around it
//! - MongoDB: Testcontainers-based instances with one database per test

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use futures::{StreamExt, stream};

use crate::{
    db::{
        ConnectionParameters, Connector, DbError, DbResult, PriceAlertRepo, PriceAlertStream,
        StoreConnection, StoreHandle,
    },
    models::{PriceAlertFilter, PriceAlertRecord},
};

/// A call observed by [`MemoryPriceAlertRepo`].
#[derive(Debug, Clone, PartialEq)]
pub enum RepoOp {
    Find(PriceAlertFilter),
    /// `archived_files` lists the watched directory at the moment of the delete.
    Delete {
        filter: PriceAlertFilter,
        archived_files: Vec<String>,
    },
}

/// Injected failures.
#[derive(Debug, Clone, Default)]
pub struct RepoFaults {
    /// `find` fails before yielding anything.
    pub fail_find: bool,
    /// The cursor yields this many records, then fails.
    pub fail_cursor_after: Option<usize>,
    /// `delete_many` fails without deleting.
    pub fail_delete: bool,
}

/// In-memory price alert collection.
#[derive(Default)]
pub struct MemoryPriceAlertRepo {
    records: Mutex<Vec<PriceAlertRecord>>,
    ops: Mutex<Vec<RepoOp>>,
    faults: Mutex<RepoFaults>,
    watch_dir: Mutex<Option<PathBuf>>,
}

impl MemoryPriceAlertRepo {
    pub fn with_records(records: Vec<PriceAlertRecord>) -> Self {
        let repo = Self::default();
        repo.insert(records);
        repo
    }

    pub fn insert(&self, records: impl IntoIterator<Item = PriceAlertRecord>) {
        self.records.lock().unwrap().extend(records);
    }

    pub fn set_faults(&self, faults: RepoFaults) {
        *self.faults.lock().unwrap() = faults;
    }

    /// Snapshot the contents of `dir` whenever `delete_many` is called.
    pub fn watch_dir(&self, dir: impl Into<PathBuf>) {
        *self.watch_dir.lock().unwrap() = Some(dir.into());
    }

    pub fn ops(&self) -> Vec<RepoOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<PriceAlertRecord> {
        self.records.lock().unwrap().clone()
    }

    fn watched_files(&self) -> Vec<String> {
        let Some(dir) = self.watch_dir.lock().unwrap().clone() else {
            return Vec::new();
        };
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[async_trait]
impl PriceAlertRepo for MemoryPriceAlertRepo {
    async fn find(&self, filter: &PriceAlertFilter) -> DbResult<PriceAlertStream> {
        self.ops.lock().unwrap().push(RepoOp::Find(*filter));

        let faults = self.faults.lock().unwrap().clone();
        if faults.fail_find {
            return Err(DbError::Connection("find rejected".into()));
        }

        let matching: Vec<DbResult<PriceAlertRecord>> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .map(Ok)
            .collect();

        match faults.fail_cursor_after {
            Some(n) => {
                let mut items: Vec<_> = matching.into_iter().take(n).collect();
                items.push(Err(DbError::Connection("cursor interrupted".into())));
                Ok(stream::iter(items).boxed())
            }
            None => Ok(stream::iter(matching).boxed()),
        }
    }

    async fn delete_many(&self, filter: &PriceAlertFilter) -> DbResult<u64> {
        self.ops.lock().unwrap().push(RepoOp::Delete {
            filter: *filter,
            archived_files: self.watched_files(),
        });

        if self.faults.lock().unwrap().fail_delete {
            return Err(DbError::Connection("delete rejected".into()));
        }

        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|record| !filter.matches(record));
        Ok((before - records.len()) as u64)
    }
}

/// Connection whose every database resolves to the same in-memory repo.
pub struct MemoryConnection {
    repo: Arc<MemoryPriceAlertRepo>,
}

impl MemoryConnection {
    pub fn new(repo: Arc<MemoryPriceAlertRepo>) -> Self {
        Self { repo }
    }
}

impl StoreConnection for MemoryConnection {
    fn price_alerts(&self, _database: &str) -> Arc<dyn PriceAlertRepo> {
        self.repo.clone()
    }
}

/// Connector handing out a [`MemoryConnection`], or refusing every attempt.
pub struct MemoryConnector {
    repo: Arc<MemoryPriceAlertRepo>,
    refuse: bool,
}

impl MemoryConnector {
    pub fn new(repo: Arc<MemoryPriceAlertRepo>) -> Self {
        Self {
            repo,
            refuse: false,
        }
    }

    pub fn refusing() -> Self {
        Self {
            repo: Arc::new(MemoryPriceAlertRepo::default()),
            refuse: true,
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, params: &ConnectionParameters) -> DbResult<Arc<dyn StoreConnection>> {
        if self.refuse {
            return Err(DbError::Connection(format!(
                "connection to {} refused",
                params.redacted_uri()
            )));
        }
        Ok(Arc::new(MemoryConnection::new(self.repo.clone())))
    }
}

/// Parameters for a local store with no credentials.
pub fn test_parameters() -> ConnectionParameters {
    ConnectionParameters {
        uri: "mongodb://127.0.0.1:27017/".into(),
        database: "alerts".into(),
        credential: None,
        direct_connection: true,
        retry_writes: None,
        write_concern: None,
        replica_set: None,
        connect_timeout: std::time::Duration::from_secs(5),
    }
}

/// A store handle over the given in-memory repo.
pub fn memory_store(repo: Arc<MemoryPriceAlertRepo>) -> Arc<StoreHandle> {
    Arc::new(StoreHandle::new(
        Arc::new(MemoryConnector::new(repo)),
        test_parameters(),
    ))
}

/// MongoDB test harness using testcontainers
#[cfg(all(test, feature = "database-mongodb"))]
pub mod mongo {
    use std::sync::{
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    };

    use mongodb::{Client, Database};
    use testcontainers_modules::{
        mongo::Mongo,
        testcontainers::{ContainerAsync, runners::AsyncRunner},
    };
    use tokio::sync::OnceCell;

    /// Shared container state - initialized once per test run
    struct SharedContainer {
        #[allow(dead_code)] // Test infrastructure: keeps container alive
        container: ContainerAsync<Mongo>,
        host: String,
        port: u16,
    }

    static SHARED_CONTAINER: OnceLock<OnceCell<SharedContainer>> = OnceLock::new();
    static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

    async fn get_shared_container() -> &'static SharedContainer {
        let cell = SHARED_CONTAINER.get_or_init(OnceCell::new);
        cell.get_or_init(|| async {
            let container = Mongo::default()
                .start()
                .await
                .expect("Failed to start MongoDB container");

            let host = container
                .get_host()
                .await
                .expect("Failed to get host")
                .to_string();
            let port = container
                .get_host_port_ipv4(27017)
                .await
                .expect("Failed to get port");

            SharedContainer {
                container,
                host,
                port,
            }
        })
        .await
    }

    /// Host and mapped port of the shared container.
    pub async fn container_address() -> (String, u16) {
        let shared = get_shared_container().await;
        (shared.host.clone(), shared.port)
    }

    /// A fresh database on the shared container, unique to the calling test.
    pub async fn create_isolated_database() -> Database {
        let (host, port) = container_address().await;
        let client = Client::with_uri_str(format!("mongodb://{}:{}/", host, port))
            .await
            .expect("Failed to create MongoDB client");

        let n = NEXT_DATABASE.fetch_add(1, Ordering::SeqCst);
        client.database(&format!("test_{}_{}", std::process::id(), n))
    }
}
