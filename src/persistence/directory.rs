//! Account directory: starting bankroll per account

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::Result;

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Starting bankroll on record, `None` for an unknown account
    async fn resolve_starting_bankroll(&self, account: &str) -> Result<Option<Decimal>>;

    async fn persist_starting_bankroll(&self, account: &str, amount: Decimal) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub created: DateTime<Utc>,
    pub starting_bankroll: Decimal,
}

/// Single `directory.json` file mapping account name to profile
#[derive(Debug)]
pub struct JsonFileDirectory {
    path: PathBuf,
    // Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl JsonFileDirectory {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("directory.json"),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, AccountProfile>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(BTreeMap::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Known account names, sorted
    pub async fn accounts(&self) -> Result<Vec<String>> {
        Ok(self.read_all().await?.into_keys().collect())
    }
}

#[async_trait]
impl AccountDirectory for JsonFileDirectory {
    async fn resolve_starting_bankroll(&self, account: &str) -> Result<Option<Decimal>> {
        let profiles = self.read_all().await?;
        Ok(profiles.get(account).map(|p| p.starting_bankroll))
    }

    async fn persist_starting_bankroll(&self, account: &str, amount: Decimal) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut profiles = self.read_all().await?;

        profiles
            .entry(account.to_string())
            .and_modify(|p| p.starting_bankroll = amount)
            .or_insert_with(|| {
                info!(account, "Registering account in directory");
                AccountProfile {
                    created: Utc::now(),
                    starting_bankroll: amount,
                }
            });

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&profiles)?;
        tokio::fs::write(&self.path, content).await?;

        debug!(account, starting_bankroll = %amount, "Directory updated");
        Ok(())
    }
}

/// In-process directory
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    bankrolls: RwLock<BTreeMap<String, Decimal>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_account(account: &str, starting_bankroll: Decimal) -> Self {
        let directory = Self::default();
        directory
            .bankrolls
            .write()
            .await
            .insert(account.to_string(), starting_bankroll);
        directory
    }
}

#[async_trait]
impl AccountDirectory for MemoryDirectory {
    async fn resolve_starting_bankroll(&self, account: &str) -> Result<Option<Decimal>> {
        Ok(self.bankrolls.read().await.get(account).copied())
    }

    async fn persist_starting_bankroll(&self, account: &str, amount: Decimal) -> Result<()> {
        self.bankrolls
            .write()
            .await
            .insert(account.to_string(), amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_json_directory_persists_and_updates() {
        let dir = tempfile::tempdir().unwrap();
        let directory = JsonFileDirectory::new(dir.path());

        assert_eq!(directory.resolve_starting_bankroll("ana").await.unwrap(), None);

        directory
            .persist_starting_bankroll("ana", dec!(1000))
            .await
            .unwrap();
        directory
            .persist_starting_bankroll("bob", dec!(250))
            .await
            .unwrap();
        directory
            .persist_starting_bankroll("ana", dec!(1950))
            .await
            .unwrap();

        // A fresh handle reads what the first one wrote
        let reopened = JsonFileDirectory::new(dir.path());
        assert_eq!(
            reopened.resolve_starting_bankroll("ana").await.unwrap(),
            Some(dec!(1950))
        );
        assert_eq!(reopened.accounts().await.unwrap(), vec!["ana", "bob"]);
    }

    #[tokio::test]
    async fn test_memory_directory() {
        let directory = MemoryDirectory::with_account("ana", dec!(500)).await;
        assert_eq!(
            directory.resolve_starting_bankroll("ana").await.unwrap(),
            Some(dec!(500))
        );
        directory
            .persist_starting_bankroll("ana", dec!(800))
            .await
            .unwrap();
        assert_eq!(
            directory.resolve_starting_bankroll("ana").await.unwrap(),
            Some(dec!(800))
        );
    }
}
