//! Backup CLI commands

use clap::Subcommand;
use std::path::PathBuf;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::{DefterPaths, Settings};
use crate::error::{DefterError, DefterResult};

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create,

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore from a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about a specific backup
    Info {
        /// Backup filename or path
        backup: String,
    },

    /// Delete old backups according to retention policy
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub fn handle_backup_command(
    paths: &DefterPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> DefterResult<()> {
    let retention = settings.backup_retention.clone();
    let manager = BackupManager::new(paths.clone(), retention.clone());

    match cmd {
        BackupCommands::Create => {
            let (backup_path, pruned) = manager.create_backup_with_retention()?;
            println!("Yedek oluşturuldu: {}", file_name(&backup_path));
            println!("Konum: {}", backup_path.display());
            if !pruned.is_empty() {
                println!("{} eski yedek silindi.", pruned.len());
            }
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("Yedek bulunamadı.");
                println!("Oluşturmak için: defter backup create");
                return Ok(());
            }

            println!("Yedekler");
            println!("========");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);
                let monthly_marker = if backup.is_monthly { " [aylık]" } else { "" };

                if verbose {
                    println!(
                        "{}. {}{}\n   Oluşturma: {}\n   Boyut: {}\n   Yaş: {}\n",
                        i + 1,
                        backup.filename,
                        monthly_marker,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        format_duration(age),
                    );
                } else {
                    println!(
                        "  {}. {} ({} önce, {}){}",
                        i + 1,
                        backup.filename,
                        format_duration(age),
                        format_size(backup.size_bytes),
                        monthly_marker,
                    );
                }
            }

            println!();
            println!("Toplam: {} yedek", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let restore_manager = RestoreManager::new(paths.clone());
            let validation = restore_manager.validate_backup(&backup_path)?;

            println!("Dosya: {}", backup_path.display());
            println!(
                "Oluşturma: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Şema sürümü: {}", validation.schema_version);
            println!("Durum: {}", validation.summary());
            println!();

            if !force {
                println!("UYARI: Mevcut tüm veriler yedekteki verilerle değiştirilecek.");
                println!("Devam etmek için --force ile tekrar çalıştırın:");
                println!("  defter backup restore {} --force", backup);
                return Ok(());
            }

            let pre_restore = manager.create_backup()?;
            println!("Geri yükleme öncesi yedek: {}", file_name(&pre_restore));

            let result = restore_manager.restore_from_file(&backup_path)?;
            println!("Geri yükleme tamamlandı.");
            println!("{}", result.summary());
        }

        BackupCommands::Info { backup } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let validation = RestoreManager::new(paths.clone()).validate_backup(&backup_path)?;
            let metadata = std::fs::metadata(&backup_path)?;

            println!("Dosya: {}", backup_path.display());
            println!("Boyut: {}", format_size(metadata.len()));
            println!(
                "Oluşturma: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Şema sürümü: {}", validation.schema_version);
            println!();
            println!("İçerik:");
            for name in &validation.present {
                println!("  {:<16} var", name);
            }
            for name in &validation.missing {
                println!("  {:<16} yok", name);
            }
            println!();
            println!("Durum: {}", validation.summary());
        }

        BackupCommands::Prune { force } => {
            let candidates = manager.prune_candidates()?;
            println!(
                "Saklama politikası: {} günlük, {} aylık",
                retention.daily_count, retention.monthly_count
            );

            if candidates.is_empty() {
                println!("Silinecek yedek yok.");
                return Ok(());
            }

            println!("Silinecek yedekler ({}):", candidates.len());
            for backup in &candidates {
                println!("  {}", backup.filename);
            }

            if !force {
                println!();
                println!("Silmek için --force ile tekrar çalıştırın:");
                println!("  defter backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("{} yedek silindi.", deleted.len());
        }
    }

    Ok(())
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolve "latest", a path, or a file name in the backup directory
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> DefterResult<PathBuf> {
    let not_found = || DefterError::NotFound {
        entity_type: "Yedek",
        identifier: backup.to_string(),
    };

    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(not_found);
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    if let Some(info) = manager.get_backup(backup)? {
        return Ok(info.path);
    }
    manager
        .get_backup(&format!("{}.json", backup))?
        .map(|b| b.path)
        .ok_or_else(not_found)
}

fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        return format!("{}sn", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}dk", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}sa", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}g", days);
    }

    format!("{}ay", days / 30)
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
