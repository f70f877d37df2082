use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::timestamp;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
struct StoredSession {
    account: Option<Address>,
    chain_id: Option<u64>,
    connected_at: Option<i64>,
}

/// Connected wallet, remembered in a small JSON file.
#[derive(Debug, Clone)]
pub struct WalletSession {
    path: PathBuf,
    stored: StoredSession,
}

impl WalletSession {
    /// A missing or unreadable session file means no wallet is connected.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let stored = match fs::read_to_string(&path) {
            Ok(data) => {
                serde_json::from_str(&data).unwrap_or_else(|err| {
                    debug!("ignoring session file {}: {err}", path.display());
                    StoredSession::default()
                })
            }
            Err(_) => StoredSession::default(),
        };
        Self { path, stored }
    }

    pub fn is_connected(&self) -> bool {
        self.stored.account.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.stored.account
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.stored.chain_id
    }

    pub fn connected_at(&self) -> Option<i64> {
        self.stored.connected_at
    }

    pub fn connect(&mut self, account: Address, chain_id: u64) -> io::Result<()> {
        self.stored = StoredSession {
            account: Some(account),
            chain_id: Some(chain_id),
            connected_at: Some(timestamp()),
        };
        self.save()?;
        info!("wallet {account} connected");
        Ok(())
    }

    /// Replaces the session file in one step, so readers never see half a file.
    fn save(&self) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let data = serde_json::to_string_pretty(&self.stored)?;
        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(data.as_bytes())?;
        file.flush()?;
        file.persist(&self.path)?;
        Ok(())
    }

    pub fn disconnect(&mut self) -> io::Result<()> {
        self.stored = StoredSession::default();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_is_disconnected() {
        let dir = TempDir::new().unwrap();
        let session = WalletSession::load(dir.path().join("wallet.json"));
        assert!(!session.is_connected());
        assert_eq!(session.account(), None);
    }

    #[test]
    fn connect_persists_until_disconnect() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet.json");
        let account = Address::repeat_byte(0x42);

        let mut session = WalletSession::load(&path);
        session.connect(account, 2810).unwrap();

        let reloaded = WalletSession::load(&path);
        assert!(reloaded.is_connected());
        assert_eq!(reloaded.account(), Some(account));
        assert_eq!(reloaded.chain_id(), Some(2810));

        session.disconnect().unwrap();
        assert!(!session.is_connected());
        assert!(!WalletSession::load(&path).is_connected());
        // second disconnect is fine
        session.disconnect().unwrap();
    }

    #[test]
    fn reconnect_replaces_session_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet.json");

        let mut session = WalletSession::load(&path);
        session.connect(Address::repeat_byte(0x01), 2810).unwrap();
        session.connect(Address::repeat_byte(0x02), 1).unwrap();

        let reloaded = WalletSession::load(&path);
        assert_eq!(reloaded.account(), Some(Address::repeat_byte(0x02)));
        assert_eq!(reloaded.chain_id(), Some(1));
        // only the session file remains, no temp files
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn connect_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let mut session = WalletSession::load(dir.path().join("nope").join("wallet.json"));
        assert!(session.connect(Address::repeat_byte(0x01), 2810).is_err());
    }

    #[test]
    fn garbage_file_is_disconnected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet.json");
        fs::write(&path, "not json").unwrap();
        assert!(!WalletSession::load(&path).is_connected());
    }
}
