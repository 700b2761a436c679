//! Append-only JSONL audit log

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{DefterError, DefterResult};

use super::entry::{AuditEntry, EntityType};

/// Selection for reading the log back
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    /// Matches the display ID or any prefix of it
    pub entity_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(entity_type) = self.entity_type {
            if entry.entity_type != entity_type {
                return false;
            }
        }
        if let Some(id) = &self.entity_id {
            if !entry.entity_id.starts_with(id.trim()) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.timestamp < since {
                return false;
            }
        }
        true
    }
}

/// Writes entries one JSON object per line, flushing after each write
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    fn open_append(&self) -> DefterResult<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| DefterError::Io(format!("Denetim kaydı açılamadı: {}", e)))
    }

    pub fn log(&self, entry: &AuditEntry) -> DefterResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> DefterResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = self.open_append()?;
        for entry in entries {
            let json = serde_json::to_string(entry)?;
            writeln!(file, "{}", json)
                .map_err(|e| DefterError::Io(format!("Denetim kaydı yazılamadı: {}", e)))?;
        }
        file.flush()
            .map_err(|e| DefterError::Io(format!("Denetim kaydı yazılamadı: {}", e)))?;

        Ok(())
    }

    /// All entries, oldest first
    pub fn read_all(&self) -> DefterResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| DefterError::Io(format!("Denetim kaydı açılamadı: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                DefterError::Io(format!("Denetim kaydı satır {} okunamadı: {}", line_num + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                DefterError::Json(format!("Denetim kaydı satır {} çözümlenemedi: {}", line_num + 1, e))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Entries matching `filter`; with a limit, the most recent ones
    pub fn query(&self, filter: &AuditFilter) -> DefterResult<Vec<AuditEntry>> {
        let matching: Vec<AuditEntry> = self
            .read_all()?
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect();

        Ok(match filter.limit {
            Some(limit) => {
                let start = matching.len().saturating_sub(limit);
                matching[start..].to_vec()
            }
            None => matching,
        })
    }

    pub fn read_recent(&self, count: usize) -> DefterResult<Vec<AuditEntry>> {
        self.query(&AuditFilter::new().limit(count))
    }

    pub fn entry_count(&self) -> DefterResult<usize> {
        Ok(self.read_all()?.len())
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::Operation;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    fn entry(entity_type: EntityType, id: &str) -> AuditEntry {
        AuditEntry::create(entity_type, id, None, &json!({"id": id}))
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger.log(&entry(EntityType::Party, "pty-00000001")).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::Party);
    }

    #[test]
    fn test_read_recent_keeps_order() {
        let (logger, _temp) = create_test_logger();
        let entries: Vec<_> = (0..10)
            .map(|i| entry(EntityType::Debt, &format!("dbt-{:08}", i)))
            .collect();
        logger.log_batch(&entries).unwrap();

        let recent = logger.read_recent(3).unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["dbt-00000007", "dbt-00000008", "dbt-00000009"]);
        assert_eq!(logger.entry_count().unwrap(), 10);
    }

    #[test]
    fn test_query_by_type_and_id() {
        let (logger, _temp) = create_test_logger();
        logger.log(&entry(EntityType::Debt, "dbt-aaaa0000")).unwrap();
        logger.log(&entry(EntityType::Payment, "pmt-bbbb0000")).unwrap();
        logger.log(&entry(EntityType::Debt, "dbt-cccc0000")).unwrap();

        let debts = logger.query(&AuditFilter::new().entity_type(EntityType::Debt)).unwrap();
        assert_eq!(debts.len(), 2);

        let one = logger.query(&AuditFilter::new().entity_id("dbt-cc")).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].entity_id, "dbt-cccc0000");
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();
        assert_eq!(logger.entry_count().unwrap(), 0);
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_reopened_logger_reads_existing_entries() {
        let (logger, temp) = create_test_logger();
        logger.log(&entry(EntityType::Grant, "grt-00000001")).unwrap();

        let reopened = AuditLogger::new(temp.path().join("audit.log"));
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }
}
