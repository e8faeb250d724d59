use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{AccountRecord, ProfileRecord, SessionRecord, Theme};
use super::tables::*;

impl Database {
    // ========================================================================
    // Profile operations
    // ========================================================================

    /// Store a profile record
    pub fn put_profile(&self, profile: &ProfileRecord) -> Result<(), DatabaseError> {
        debug_assert!(!profile.id.is_empty(), "profile id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(PROFILES)?;
            let data = rmp_serde::to_vec_named(profile)?;
            table.insert(profile.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a profile by its UUID
    pub fn get_profile(&self, id: &str) -> Result<Option<ProfileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PROFILES)?;

        match table.get(id)? {
            Some(data) => {
                let profile: ProfileRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Get all profiles, newest first
    pub fn list_profiles(&self) -> Result<Vec<ProfileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PROFILES)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let profile: ProfileRecord = rmp_serde::from_slice(value.value())?;
            records.push(profile);
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Set or clear a profile's administrator flag
    pub fn set_profile_admin(&self, id: &str, is_admin: bool) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(PROFILES)?;
            let result = match table.get(id)? {
                Some(data) => {
                    let profile: ProfileRecord = rmp_serde::from_slice(data.value())?;
                    Some(profile)
                }
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut profile) => {
                profile.is_admin = is_admin;
                let serialized = rmp_serde::to_vec_named(&profile)?;
                let mut table = write_txn.open_table(PROFILES)?;
                table.insert(id, serialized.as_slice())?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a profile along with its account, sessions, and theme preference
    pub fn delete_profile(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let deleted = {
            let mut table = write_txn.open_table(PROFILES)?;
            let removed = table.remove(id)?.is_some();
            removed
        };

        if deleted {
            // Remove the account via the email index
            let email: Option<String> = {
                let mut index = write_txn.open_table(PROFILE_EMAILS)?;
                let removed = index.remove(id)?.map(|v| v.value().to_string());
                removed
            };
            if let Some(email) = email {
                let mut accounts = write_txn.open_table(ACCOUNTS)?;
                accounts.remove(email.as_str())?;
            }

            // Drop any sessions belonging to the profile
            {
                let sessions = write_txn.open_table(SESSIONS)?;
                let mut stale = Vec::new();
                for result in sessions.iter()? {
                    let (key, value) = result?;
                    let session: SessionRecord = rmp_serde::from_slice(value.value())?;
                    if session.profile_id == id {
                        stale.push(key.value().to_string());
                    }
                }
                drop(sessions);

                let mut sessions = write_txn.open_table(SESSIONS)?;
                for key in stale {
                    sessions.remove(key.as_str())?;
                }
            }

            {
                let mut themes = write_txn.open_table(THEME_PREFS)?;
                themes.remove(id)?;
            }
        }

        write_txn.commit()?;
        Ok(deleted)
    }

    // ========================================================================
    // Account operations
    // ========================================================================

    /// Create an account and its profile in one transaction. Returns false
    /// without writing anything if the email is already taken.
    pub fn create_account(
        &self,
        account: &AccountRecord,
        profile: &ProfileRecord,
    ) -> Result<bool, DatabaseError> {
        debug_assert_eq!(
            account.email,
            account.email.to_lowercase(),
            "account email must be lowercased"
        );
        debug_assert_eq!(
            account.profile_id, profile.id,
            "account and profile must share an id"
        );

        let write_txn = self.begin_write()?;

        let taken = {
            let table = write_txn.open_table(ACCOUNTS)?;
            let exists = table.get(account.email.as_str())?.is_some();
            exists
        };
        if taken {
            return Ok(false);
        }

        {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            let data = rmp_serde::to_vec_named(account)?;
            accounts.insert(account.email.as_str(), data.as_slice())?;

            let mut profiles = write_txn.open_table(PROFILES)?;
            let data = rmp_serde::to_vec_named(profile)?;
            profiles.insert(profile.id.as_str(), data.as_slice())?;

            let mut index = write_txn.open_table(PROFILE_EMAILS)?;
            index.insert(profile.id.as_str(), account.email.as_str())?;
        }

        write_txn.commit()?;
        Ok(true)
    }

    /// Look up an account by email (case-insensitive)
    pub fn get_account(&self, email: &str) -> Result<Option<AccountRecord>, DatabaseError> {
        let email = email.trim().to_lowercase();
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;

        match table.get(email.as_str())? {
            Some(data) => {
                let account: AccountRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // Theme preferences
    // ========================================================================

    /// Get a profile's stored theme preference, if any
    pub fn get_theme(&self, profile_id: &str) -> Result<Option<Theme>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(THEME_PREFS)?;

        match table.get(profile_id)? {
            Some(data) => Ok(Theme::parse(data.value())),
            None => Ok(None),
        }
    }

    /// Persist a profile's theme preference
    pub fn set_theme(&self, profile_id: &str, theme: Theme) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(THEME_PREFS)?;
            table.insert(profile_id, theme.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
