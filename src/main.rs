use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use defter::cli::{
    handle_audit_command, handle_backup_command, handle_category_command, handle_debt_command,
    handle_grant_command, handle_milestone_command, handle_party_command, handle_payment_command,
    handle_project_command, handle_rate_command, handle_report_command, handle_transaction_command,
    AuditCommands, BackupCommands, CategoryCommands, DebtCommands, GrantCommands, MilestoneCommands,
    PartyCommands, PaymentCommands, ProjectCommands, RateCommands, ReportCommands,
    TransactionCommands,
};
use defter::config::{DefterPaths, Settings};
use defter::storage::init::{initialize_storage, needs_initialization};
use defter::storage::Storage;

#[derive(Parser)]
#[command(
    name = "defter",
    version,
    about = "Command-line bookkeeping for small businesses",
    long_about = "Defter keeps the books of a small business from the terminal: \
                  income and expenses with VAT and withholding, debts and \
                  receivables paid in installments, projects with milestones \
                  and grant funding, and multi-currency amounts."
)]
struct Cli {
    /// Data directory (overrides the platform default)
    #[arg(long, global = true, env = "DEFTER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the data directory with default categories
    Init {
        /// Company name shown on reports
        #[arg(long)]
        company: Option<String>,
    },

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Customers and suppliers (cari)
    #[command(subcommand)]
    Party(PartyCommands),

    /// Income and expense categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Income and expense transactions
    #[command(subcommand, name = "txn", alias = "transaction")]
    Transaction(TransactionCommands),

    /// Debts and receivables with installments
    #[command(subcommand)]
    Debt(DebtCommands),

    /// Payments against debts, installments and grants
    #[command(subcommand)]
    Payment(PaymentCommands),

    /// Projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Project milestones
    #[command(subcommand)]
    Milestone(MilestoneCommands),

    /// Project grants (hibe)
    #[command(subcommand)]
    Grant(GrantCommands),

    /// Exchange rates
    #[command(subcommand)]
    Rate(RateCommands),

    /// Reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Backups
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Audit log
    #[command(subcommand)]
    Audit(AuditCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show paths and settings
    Show,

    /// Change one setting, e.g. `config set default_vat_rate 10`
    Set { key: String, value: String },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("DEFTER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => DefterPaths::with_base_dir(dir),
        None => DefterPaths::new()?,
    };
    let mut settings = Settings::load_or_create(&paths)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Defter - küçük işletmeler için ön muhasebe");
            println!();
            println!("Kullanım için 'defter --help' çalıştırın.");
            return Ok(());
        }
    };

    match &command {
        Commands::Init { company } => {
            if let Some(company) = company {
                settings.company_name = company.clone();
            }
            initialize_storage(&paths, &settings)?;
            println!("Defter hazır: {}", paths.base_dir().display());
            println!("Varsayılan kategoriler oluşturuldu. Görmek için: defter category list");
            return Ok(());
        }
        Commands::Config(ConfigCommands::Show) => {
            println!("Veri dizini:   {}", paths.data_dir().display());
            println!("Yedek dizini:  {}", paths.backup_dir().display());
            println!("Ayar dosyası:  {}", paths.settings_file().display());
            println!();
            println!("company_name     = {}", settings.company_name);
            println!("base_currency    = {}", settings.base_currency);
            println!("default_vat_rate = {}", settings.default_vat_rate);
            println!("date_format      = {}", settings.date_format);
            println!("upcoming_days    = {}", settings.upcoming_days);
            println!(
                "backup_retention = {} günlük, {} aylık",
                settings.backup_retention.daily_count, settings.backup_retention.monthly_count
            );
            return Ok(());
        }
        _ => {}
    }

    if needs_initialization(&paths) {
        bail!(
            "Defter bu dizinde başlatılmamış: {}\nÖnce 'defter init' çalıştırın.",
            paths.base_dir().display()
        );
    }

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match command {
        Commands::Init { .. } | Commands::Config(ConfigCommands::Show) => {}
        Commands::Config(ConfigCommands::Set { key, value }) => {
            settings.set(&key, &value)?;
            settings.save(&paths)?;
            println!("Ayar güncellendi: {} = {}", key, value.trim());
        }
        Commands::Party(cmd) => handle_party_command(&storage, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, cmd)?,
        Commands::Transaction(cmd) => handle_transaction_command(&storage, &settings, cmd)?,
        Commands::Debt(cmd) => handle_debt_command(&storage, &settings, cmd)?,
        Commands::Payment(cmd) => handle_payment_command(&storage, &settings, cmd)?,
        Commands::Project(cmd) => handle_project_command(&storage, &settings, cmd)?,
        Commands::Milestone(cmd) => handle_milestone_command(&storage, &settings, cmd)?,
        Commands::Grant(cmd) => handle_grant_command(&storage, cmd)?,
        Commands::Rate(cmd) => handle_rate_command(&storage, &settings, cmd)?,
        Commands::Report(cmd) => handle_report_command(&storage, &settings, cmd)?,
        Commands::Backup(cmd) => handle_backup_command(&paths, &settings, cmd)?,
        Commands::Audit(cmd) => handle_audit_command(&storage, cmd)?,
    }

    Ok(())
}
