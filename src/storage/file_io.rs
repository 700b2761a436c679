//! File I/O utilities with atomic writes
//!
//! A data file is either the previous version or the new one, never a
//! half-written mix.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{DefterError, DefterResult};

/// Read JSON from a file, returning a default value if the file doesn't exist
pub fn read_json<T, P>(path: P) -> DefterResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| DefterError::Storage(format!("{} açılamadı: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| DefterError::Storage(format!("{} çözümlenemedi: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, sync, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> DefterResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            DefterError::Storage(format!("Dizin oluşturulamadı {}: {}", parent.display(), e))
        })?;
    }

    // Same directory, so the rename cannot cross filesystems
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| DefterError::Storage(format!("Geçici dosya oluşturulamadı: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| DefterError::Storage(format!("Veri serileştirilemedi: {}", e)))?;
    writer
        .flush()
        .map_err(|e| DefterError::Storage(format!("Veri yazılamadı: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| DefterError::Storage(format!("Veri diske aktarılamadı: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        DefterError::Storage(format!("Dosya değiştirilemedi: {}", e))
    })?;

    tracing::debug!(path = %path.display(), "data file written");
    Ok(())
}

/// Whether a file exists and parses as JSON
pub fn json_file_valid<P: AsRef<Path>>(path: P) -> bool {
    File::open(path.as_ref())
        .map(|file| serde_json::from_reader::<_, serde_json::Value>(BufReader::new(file)).is_ok())
        .unwrap_or(false)
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> DefterResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| DefterError::Storage(format!("Okuma kilidi alınamadı: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> DefterResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| DefterError::Storage(format!("Yazma kilidi alınamadı: {}", e)))
}
