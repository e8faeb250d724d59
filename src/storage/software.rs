use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use redb::{ReadableTable, ReadableTableMetadata};

use super::db::{Database, DatabaseError};
use super::models::{CatalogStats, DailyStat, Patch, SoftwareRecord};
use super::tables::*;

impl Database {
    // ========================================================================
    // Software operations
    // ========================================================================

    /// Store a software record
    pub fn put_software(&self, software: &SoftwareRecord) -> Result<(), DatabaseError> {
        debug_assert!(!software.id.is_empty(), "software id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SOFTWARE)?;
            let data = rmp_serde::to_vec_named(software)?;
            table.insert(software.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a software record by its UUID
    pub fn get_software(&self, id: &str) -> Result<Option<SoftwareRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SOFTWARE)?;

        match table.get(id)? {
            Some(data) => {
                let software: SoftwareRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(software))
            }
            None => Ok(None),
        }
    }

    /// Get all software records, newest first; creation-time ties fall back
    /// to id order.
    pub fn list_software(&self) -> Result<Vec<SoftwareRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SOFTWARE)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let software: SoftwareRecord = rmp_serde::from_slice(value.value())?;
            records.push(software);
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Delete a software record by its UUID
    pub fn delete_software(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let deleted = {
            let mut table = write_txn.open_table(SOFTWARE)?;
            let removed = table.remove(id)?.is_some();
            removed
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// Update a software record's mutable fields
    #[allow(clippy::too_many_arguments)]
    pub fn update_software(
        &self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
        version: Option<&str>,
        tags: Option<&[String]>,
        is_featured: Option<bool>,
        thumbnail_url: Patch<String>,
    ) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(SOFTWARE)?;
            let result = match table.get(id)? {
                Some(data) => {
                    let software: SoftwareRecord = rmp_serde::from_slice(data.value())?;
                    Some(software)
                }
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut software) => {
                if let Some(t) = title {
                    software.title = t.to_string();
                }
                if let Some(d) = description {
                    software.description = d.to_string();
                }
                if let Some(c) = category {
                    software.category = c.to_string();
                }
                if let Some(v) = version {
                    software.version = v.to_string();
                }
                if let Some(t) = tags {
                    software.tags = t.to_vec();
                }
                if let Some(f) = is_featured {
                    software.is_featured = f;
                }
                if let Some(t) = thumbnail_url.as_option() {
                    software.thumbnail_url = t.cloned();
                }

                let serialized = rmp_serde::to_vec_named(&software)?;
                let mut table = write_txn.open_table(SOFTWARE)?;
                table.insert(id, serialized.as_slice())?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Add one to a record's download count inside a single write transaction.
    /// Returns the new count, or None if the record does not exist.
    pub fn increment_download_count(&self, id: &str) -> Result<Option<u64>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(SOFTWARE)?;
            let result = match table.get(id)? {
                Some(data) => {
                    let software: SoftwareRecord = rmp_serde::from_slice(data.value())?;
                    Some(software)
                }
                None => None,
            };
            result
        };

        let new_count = match existing {
            Some(mut software) => {
                software.download_count += 1;
                let serialized = rmp_serde::to_vec_named(&software)?;
                let mut table = write_txn.open_table(SOFTWARE)?;
                table.insert(id, serialized.as_slice())?;
                Some(software.download_count)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(new_count)
    }

    /// Count software records
    pub fn count_software(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SOFTWARE)?;
        Ok(table.len()?)
    }

    /// Distinct categories with their entry counts, largest first.
    /// Ties break alphabetically so the ordering is stable.
    pub fn category_counts(&self) -> Result<Vec<(String, u64)>, DatabaseError> {
        let all = self.list_software()?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for software in &all {
            *counts.entry(software.category.clone()).or_insert(0) += 1;
        }

        let mut result: Vec<(String, u64)> = counts.into_iter().collect();
        result.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(result)
    }

    /// Catalog-wide totals for the admin overview. `recent_window` bounds
    /// what counts as a recent upload.
    pub fn catalog_stats(&self, recent_window: Duration) -> Result<CatalogStats, DatabaseError> {
        let all = self.list_software()?;
        let cutoff = Utc::now() - recent_window;

        let mut categories: HashSet<&str> = HashSet::new();
        let mut total_downloads = 0u64;
        let mut recent_uploads = 0u64;
        for software in &all {
            categories.insert(software.category.as_str());
            total_downloads += software.download_count;
            if software.created_at >= cutoff {
                recent_uploads += 1;
            }
        }

        Ok(CatalogStats {
            total_software: all.len() as u64,
            total_downloads,
            total_categories: categories.len() as u64,
            recent_uploads,
        })
    }

    /// Per-day upload and download tallies for the trailing `days` days
    /// (including today), oldest day first. Every day in the window gets an
    /// entry even when nothing happened.
    pub fn daily_stats(&self, days: i64) -> Result<Vec<DailyStat>, DatabaseError> {
        debug_assert!(days >= 1, "daily stats window must cover at least one day");

        let today = Utc::now().date_naive();
        let start = today - Duration::days(days - 1);

        let mut buckets: Vec<DailyStat> = (0..days)
            .map(|offset| DailyStat {
                date: start + Duration::days(offset),
                uploads: 0,
                downloads: 0,
            })
            .collect();

        for software in self.list_software()? {
            let day = software.created_at.date_naive();
            if day < start || day > today {
                continue;
            }
            let idx = (day - start).num_days() as usize;
            buckets[idx].uploads += 1;
            buckets[idx].downloads += software.download_count;
        }

        Ok(buckets)
    }
}
