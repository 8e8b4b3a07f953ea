//! SQLite cleanup executor

use crate::target::Idents;
use crate::TableTarget;
use rusqlite::{params, params_from_iter, Connection};
use std::time::SystemTime;
use tidemark_domain::{
    CleanupExecutor, CleanupReport, ExecutionError, QuotaPolicy, RetentionPolicy, TimeWindowPolicy,
};

/// Most rowids bound into one eviction statement, well under SQLite's host parameter limit
const MAX_EVICT_CHUNK: usize = 500;

/// Deletes history rows from a SQLite table
///
/// - Time-window policies delete every row strictly older than the cutoff,
///   `batch_rows` rows per statement, until none is left.
/// - Quota policies measure the table (exactly through the size column, or
///   `row count × avgItemSize`), and when it is over quota delete the oldest
///   rows until one eviction batch has been freed or the table is empty.
///   One pass per call.
///
/// The connection is used in autocommit mode: each statement commits on its
/// own, so batches completed before an error stay deleted.
#[derive(Debug, Clone, Copy)]
pub struct SqliteCleaner {
    clock: fn() -> SystemTime,
}

impl Default for SqliteCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl SqliteCleaner {
    /// Create a cleaner using the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemTime::now)
    }

    /// Create a cleaner with a custom clock
    pub fn with_clock(clock: fn() -> SystemTime) -> Self {
        Self { clock }
    }

    /// Delete all rows older than the policy's cutoff
    fn delete_expired(
        &self,
        conn: &Connection,
        target: &TableTarget,
        idents: &Idents,
        policy: &TimeWindowPolicy,
    ) -> Result<CleanupReport, ExecutionError> {
        let cutoff = policy.cutoff_millis((self.clock)())?;

        let sql = format!(
            "DELETE FROM {table} WHERE rowid IN (
                SELECT rowid FROM {table} WHERE {ts} < ?1 ORDER BY {ts}, rowid LIMIT ?2
            )",
            table = idents.table,
            ts = idents.timestamp,
        );

        let mut rows_deleted = 0u64;
        loop {
            let deleted = conn
                .execute(&sql, params![cutoff, target.batch_rows])
                .map_err(|e| ExecutionError::data_access(format!("delete expired rows from {}", target.table), e))?;

            rows_deleted += deleted as u64;
            tracing::debug!(table = %target.table, deleted, cutoff, "Deleted expired batch");

            if deleted < target.batch_rows as usize {
                break;
            }
        }

        Ok(CleanupReport {
            rows_deleted,
            bytes_freed: None,
            occupied_before: None,
        })
    }

    /// Free one eviction batch if the table is over quota
    fn evict_over_quota(
        &self,
        conn: &Connection,
        target: &TableTarget,
        idents: &Idents,
        policy: &QuotaPolicy,
    ) -> Result<CleanupReport, ExecutionError> {
        let occupied = match &idents.size {
            Some(size) => Self::measure_exact(conn, target, idents, size)?,
            None => {
                let rows = Self::count_rows(conn, target, idents)?;
                policy
                    .estimate_occupied(rows)
                    .ok_or_else(|| ExecutionError::Unmeasurable(target.table.clone()))?
            }
        };

        if !policy.is_exceeded(occupied) {
            tracing::debug!(
                table = %target.table,
                occupied,
                quota = policy.quota_bytes(),
                "Within quota"
            );
            return Ok(CleanupReport {
                occupied_before: Some(occupied),
                ..CleanupReport::nothing()
            });
        }

        let goal = policy.delete_batch_bytes();
        let (rows_deleted, bytes_freed) = match &idents.size {
            Some(size) => self.evict_measured(conn, target, idents, size, goal)?,
            None => {
                // Only reachable with an average size, since the estimate exceeded the quota
                let avg = policy.avg_item_size_bytes().unwrap_or(1).max(1);
                let rows = self.evict_estimated(conn, target, idents, goal.div_ceil(avg))?;
                (rows, rows.saturating_mul(avg))
            }
        };

        tracing::debug!(
            table = %target.table,
            occupied,
            rows_deleted,
            bytes_freed,
            "Evicted over-quota rows"
        );

        Ok(CleanupReport {
            rows_deleted,
            bytes_freed: Some(bytes_freed),
            occupied_before: Some(occupied),
        })
    }

    fn count_rows(conn: &Connection, target: &TableTarget, idents: &Idents) -> Result<u64, ExecutionError> {
        let sql = format!("SELECT COUNT(*) FROM {}", idents.table);
        let rows: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| ExecutionError::data_access(format!("count rows of {}", target.table), e))?;
        Ok(u64::try_from(rows).unwrap_or(0))
    }

    fn measure_exact(
        conn: &Connection,
        target: &TableTarget,
        idents: &Idents,
        size: &str,
    ) -> Result<u64, ExecutionError> {
        let sql = format!("SELECT COALESCE(SUM({}), 0) FROM {}", size, idents.table);
        let bytes: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| ExecutionError::data_access(format!("measure size of {}", target.table), e))?;
        Ok(u64::try_from(bytes).unwrap_or(0))
    }

    /// Delete oldest rows until their summed size reaches `goal`
    fn evict_measured(
        &self,
        conn: &Connection,
        target: &TableTarget,
        idents: &Idents,
        size: &str,
        goal: u64,
    ) -> Result<(u64, u64), ExecutionError> {
        let victims = {
            let sql = format!(
                "SELECT rowid, COALESCE({size}, 0) FROM {table} ORDER BY {ts}, rowid",
                size = size,
                table = idents.table,
                ts = idents.timestamp,
            );
            let select_err = |e: rusqlite::Error| {
                ExecutionError::data_access(format!("select eviction victims from {}", target.table), e)
            };

            let mut stmt = conn.prepare(&sql).map_err(select_err)?;
            let mut rows = stmt.query([]).map_err(select_err)?;

            let mut victims = Vec::new();
            let mut selected = 0u64;
            while selected < goal {
                let Some(row) = rows.next().map_err(select_err)? else {
                    break;
                };
                let rowid: i64 = row.get(0).map_err(select_err)?;
                let bytes: i64 = row.get(1).map_err(select_err)?;
                selected = selected.saturating_add(u64::try_from(bytes).unwrap_or(0));
                victims.push((rowid, bytes));
            }
            victims
        };

        let mut rows_deleted = 0u64;
        let mut bytes_freed = 0u64;
        let chunk_rows = (target.batch_rows as usize).clamp(1, MAX_EVICT_CHUNK);
        for chunk in victims.chunks(chunk_rows) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("DELETE FROM {} WHERE rowid IN ({})", idents.table, placeholders);

            let deleted = conn
                .execute(&sql, params_from_iter(chunk.iter().map(|(rowid, _)| rowid)))
                .map_err(|e| ExecutionError::data_access(format!("evict rows from {}", target.table), e))?;

            rows_deleted += deleted as u64;
            bytes_freed = chunk
                .iter()
                .map(|(_, bytes)| u64::try_from(*bytes).unwrap_or(0))
                .fold(bytes_freed, u64::saturating_add);
        }

        Ok((rows_deleted, bytes_freed))
    }

    /// Delete up to `count` oldest rows
    fn evict_estimated(
        &self,
        conn: &Connection,
        target: &TableTarget,
        idents: &Idents,
        count: u64,
    ) -> Result<u64, ExecutionError> {
        let sql = format!(
            "DELETE FROM {table} WHERE rowid IN (
                SELECT rowid FROM {table} ORDER BY {ts}, rowid LIMIT ?1
            )",
            table = idents.table,
            ts = idents.timestamp,
        );

        let mut rows_deleted = 0u64;
        while rows_deleted < count {
            let limit = (count - rows_deleted).min(u64::from(target.batch_rows));
            let deleted = conn
                .execute(&sql, params![limit as i64])
                .map_err(|e| ExecutionError::data_access(format!("evict rows from {}", target.table), e))?;

            if deleted == 0 {
                break;
            }
            rows_deleted += deleted as u64;
        }

        Ok(rows_deleted)
    }
}

impl CleanupExecutor<Connection, TableTarget> for SqliteCleaner {
    fn exec(
        &self,
        session: &mut Connection,
        policy: &RetentionPolicy,
        payload: &TableTarget,
    ) -> Result<CleanupReport, ExecutionError> {
        let idents = payload.idents()?;

        match policy {
            RetentionPolicy::TimeWindow(policy) => self.delete_expired(session, payload, &idents, policy),
            RetentionPolicy::Quota(policy) => self.evict_over_quota(session, payload, &idents, policy),
        }
    }
}
