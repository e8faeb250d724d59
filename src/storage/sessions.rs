use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::SessionRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // Session operations
    // ========================================================================

    /// Store a session row under its token digest
    pub fn put_session(
        &self,
        token_digest: &str,
        session: &SessionRecord,
    ) -> Result<(), DatabaseError> {
        debug_assert!(!token_digest.is_empty(), "token digest must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let data = rmp_serde::to_vec_named(session)?;
            table.insert(token_digest, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a live session by its token digest. Expired rows read as
    /// absent; the sweeper removes them later.
    pub fn get_session(&self, token_digest: &str) -> Result<Option<SessionRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;

        match table.get(token_digest)? {
            Some(data) => {
                let session: SessionRecord = rmp_serde::from_slice(data.value())?;
                if session.expires_at <= Utc::now() {
                    return Ok(None);
                }
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// Delete a session by its token digest
    pub fn delete_session(&self, token_digest: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let deleted = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let removed = table.remove(token_digest)?.is_some();
            removed
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// Drop every session that expired before `now`. Returns how many rows
    /// were removed.
    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let write_txn = self.begin_write()?;
        let mut purged = 0u64;

        {
            let table = write_txn.open_table(SESSIONS)?;
            let expired: Vec<String> = table
                .iter()?
                .filter_map(|r| {
                    let (key, value) = match r {
                        Ok(kv) => kv,
                        Err(e) => return Some(Err(e)),
                    };
                    match rmp_serde::from_slice::<SessionRecord>(value.value()) {
                        Ok(session) if session.expires_at <= now => {
                            Some(Ok(key.value().to_string()))
                        }
                        Ok(_) => None,
                        // Undecodable rows count as expired
                        Err(_) => Some(Ok(key.value().to_string())),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            drop(table);

            let mut table = write_txn.open_table(SESSIONS)?;
            for key in expired {
                table.remove(key.as_str())?;
                purged += 1;
            }
        }

        write_txn.commit()?;
        Ok(purged)
    }
}
