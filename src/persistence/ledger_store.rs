//! Ledger storage keyed by account

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::BetRecord;
use crate::error::Result;

/// Load/save collaborator for an account's ledger
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Stored records, empty when the account has none yet
    async fn load(&self, account: &str) -> Result<Vec<BetRecord>>;

    /// Replace the stored records with `records`
    async fn save(&self, account: &str, records: &[BetRecord]) -> Result<()>;
}

/// Map an account name onto a file stem, one stem per name
///
/// Lowercase ASCII letters, digits and `-` pass through; every other byte is
/// written as `_xx` in lowercase hex. Stems never collide, even on
/// case-insensitive filesystems, and never contain a path separator.
pub(crate) fn file_stem(account: &str) -> String {
    if account.is_empty() {
        return "_".to_string();
    }
    let mut stem = String::with_capacity(account.len());
    for byte in account.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => stem.push(char::from(byte)),
            _ => stem.push_str(&format!("_{byte:02x}")),
        }
    }
    stem
}

/// One pretty-printed JSON file per account under `<data_dir>/ledgers/`
#[derive(Debug, Clone)]
pub struct JsonFileLedgerStore {
    dir: PathBuf,
}

impl JsonFileLedgerStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("ledgers"),
        }
    }

    pub fn path_for(&self, account: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(account)))
    }
}

#[async_trait]
impl LedgerStore for JsonFileLedgerStore {
    async fn load(&self, account: &str) -> Result<Vec<BetRecord>> {
        let path = self.path_for(account);
        if !tokio::fs::try_exists(&path).await? {
            debug!(account, "No stored ledger, starting fresh");
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let records: Vec<BetRecord> = serde_json::from_str(&content)?;
        info!(account, count = records.len(), "Loaded ledger");
        Ok(records)
    }

    async fn save(&self, account: &str, records: &[BetRecord]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(account);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(account, count = records.len(), "Saved ledger to {:?}", path);
        Ok(())
    }
}

/// In-process store, used for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    ledgers: RwLock<HashMap<String, Vec<BetRecord>>>,
    saves: AtomicUsize,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_records(account: &str, records: Vec<BetRecord>) -> Self {
        let store = Self::default();
        store.ledgers.write().await.insert(account.to_string(), records);
        store
    }

    /// Number of successful `save` calls so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn load(&self, account: &str) -> Result<Vec<BetRecord>> {
        Ok(self
            .ledgers
            .read()
            .await
            .get(account)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, account: &str, records: &[BetRecord]) -> Result<()> {
        self.ledgers
            .write()
            .await
            .insert(account.to_string(), records.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
