//! Encrypted record cache.
//!
//! Each row holds one record, encoded with the binary codec and sealed with
//! XChaCha20-Poly1305 under the cache key. Rows are keyed by record UUID.

use crate::error::{VaultError, VaultResult};
use chrono::{DateTime, TimeZone, Utc};
use pqpass_crypto::{SymmetricKey, decrypt, encrypt};
use pqpass_types::{Decode, Encode, PasswordRecord, Uuid};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS passwords (
    id TEXT PRIMARY KEY,
    nonce BLOB NOT NULL,
    ciphertext BLOB NOT NULL,
    cached_at INTEGER NOT NULL
);";

/// Handle to an open cache database.
pub struct PasswordCache {
    conn: Mutex<Connection>,
    key: SymmetricKey,
}

impl PasswordCache {
    /// Opens (or creates) a file-backed cache.
    pub fn open(path: impl AsRef<Path>, key: SymmetricKey) -> VaultResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!("opened password cache at {}", path.display());
        Self::with_connection(conn, key)
    }

    /// Opens a cache that lives only as long as the handle.
    pub fn open_in_memory(key: SymmetricKey) -> VaultResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, key)
    }

    fn with_connection(conn: Connection, key: SymmetricKey) -> VaultResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            key,
        })
    }

    fn conn(&self) -> VaultResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VaultError::Storage(e.to_string()))
    }

    // ── Row codec ──

    fn seal(&self, record: &PasswordRecord) -> VaultResult<(Vec<u8>, Vec<u8>)> {
        let mut plaintext = record.to_bytes();
        let sealed = encrypt(&self.key, &plaintext);
        plaintext.zeroize();
        let sealed = sealed?;
        Ok((sealed.nonce.to_vec(), sealed.ciphertext))
    }

    fn open_row(&self, nonce: &[u8], ciphertext: &[u8]) -> VaultResult<PasswordRecord> {
        let mut plaintext = decrypt(&self.key, ciphertext, nonce)?;
        let record = PasswordRecord::from_bytes(&plaintext);
        plaintext.zeroize();
        Ok(record?)
    }

    // ── Operations ──

    /// Inserts or replaces the record stored under `id`.
    pub fn put(&self, id: Uuid, record: &PasswordRecord) -> VaultResult<()> {
        let (nonce, ciphertext) = self.seal(record)?;
        self.conn()?.execute(
            "INSERT OR REPLACE INTO passwords (id, nonce, ciphertext, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id.to_string(), nonce, ciphertext, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    /// Returns the record stored under `id`, if any.
    ///
    /// A row that no longer decrypts under the cache key is an error here,
    /// unlike [`PasswordCache::list`].
    pub fn get(&self, id: Uuid) -> VaultResult<Option<PasswordRecord>> {
        let row: Option<(Vec<u8>, Vec<u8>)> = self
            .conn()?
            .query_row(
                "SELECT nonce, ciphertext FROM passwords WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(nonce, ciphertext)| self.open_row(&nonce, &ciphertext))
            .transpose()
    }

    /// When the record under `id` was last written.
    pub fn cached_at(&self, id: Uuid) -> VaultResult<Option<DateTime<Utc>>> {
        let millis: Option<i64> = self
            .conn()?
            .query_row(
                "SELECT cached_at FROM passwords WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
    }

    /// Every readable record in insertion order. Rows that fail to decrypt
    /// or decode are skipped.
    pub fn list(&self) -> VaultResult<Vec<(PasswordRecord, Uuid)>> {
        let rows: Vec<(String, Vec<u8>, Vec<u8>)> = {
            let conn = self.conn()?;
            let mut stmt =
                conn.prepare("SELECT id, nonce, ciphertext FROM passwords ORDER BY rowid")?;
            let mapped = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
            let rows = mapped.collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut out = Vec::with_capacity(rows.len());
        for (id, nonce, ciphertext) in rows {
            let uuid = match Uuid::parse_str(&id) {
                Ok(u) => u,
                Err(e) => {
                    warn!("skipping cache row with invalid id {id}: {e}");
                    continue;
                }
            };
            match self.open_row(&nonce, &ciphertext) {
                Ok(record) => out.push((record, uuid)),
                Err(e) => warn!("skipping unreadable cache row {uuid}: {e}"),
            }
        }
        Ok(out)
    }

    /// Deletes the record under `id`. Returns whether a row existed.
    pub fn remove(&self, id: Uuid) -> VaultResult<bool> {
        let n = self
            .conn()?
            .execute("DELETE FROM passwords WHERE id = ?1", params![id.to_string()])?;
        Ok(n > 0)
    }

    pub fn clear(&self) -> VaultResult<()> {
        self.conn()?.execute("DELETE FROM passwords", [])?;
        Ok(())
    }

    pub fn len(&self) -> VaultResult<usize> {
        let n: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM passwords", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn is_empty(&self) -> VaultResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Replaces the whole cache with `records` in a single transaction.
    ///
    /// Either every row is replaced or the previous contents remain.
    pub fn rebuild(&self, records: &[(PasswordRecord, Uuid)]) -> VaultResult<usize> {
        let sealed = records
            .iter()
            .map(|(record, id)| self.seal(record).map(|(n, c)| (*id, n, c)))
            .collect::<VaultResult<Vec<_>>>()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM passwords", [])?;
        let now = Utc::now().timestamp_millis();
        {
            let mut insert = tx.prepare(
                "INSERT OR REPLACE INTO passwords (id, nonce, ciphertext, cached_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (id, nonce, ciphertext) in &sealed {
                insert.execute(params![id.to_string(), nonce, ciphertext, now])?;
            }
        }
        tx.commit()?;

        info!("rebuilt password cache with {} records", sealed.len());
        Ok(sealed.len())
    }
}
