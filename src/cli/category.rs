//! Category CLI commands

use clap::Subcommand;

use super::parse_kind;
use crate::display::format_category_list;
use crate::error::DefterResult;
use crate::models::TransactionKind;
use crate::services::CategoryService;
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only income or expense categories
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<TransactionKind>,
        /// Include archived categories
        #[arg(short, long)]
        all: bool,
    },

    /// Create a category
    Create {
        name: String,
        /// income or expense
        #[arg(short, long, value_parser = parse_kind)]
        kind: TransactionKind,
        #[arg(long)]
        color: Option<String>,
    },

    /// Rename or recolor a category
    Edit {
        /// Category name or ID
        category: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_color")]
        color: Option<String>,
        #[arg(long)]
        clear_color: bool,
    },

    /// Archive a category
    Archive { category: String },

    /// Restore an archived category
    Unarchive { category: String },

    /// Delete a category with no transactions
    Delete { category: String },
}

pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> DefterResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List { kind, all } => {
            print!("{}", format_category_list(&service.list(kind, all)?));
        }

        CategoryCommands::Create { name, kind, color } => {
            let category = service.create(&name, kind, color)?;
            println!("Kategori oluşturuldu: {} ({})", category.name, category.kind);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Edit {
            category,
            name,
            color,
            clear_color,
        } => {
            let category = service.resolve(&category, None)?;
            if name.is_none() && color.is_none() && !clear_color {
                println!("Değişiklik belirtilmedi. --name, --color veya --clear-color kullanın.");
                return Ok(());
            }
            let color = if clear_color { Some(None) } else { color.map(Some) };
            let updated = service.update(category.id, name.as_deref(), color)?;
            println!("Kategori güncellendi: {}", updated.name);
        }

        CategoryCommands::Archive { category } => {
            let category = service.resolve(&category, None)?;
            service.set_archived(category.id, true)?;
            println!("Kategori arşivlendi: {}", category.name);
        }

        CategoryCommands::Unarchive { category } => {
            let category = service.resolve(&category, None)?;
            service.set_archived(category.id, false)?;
            println!("Kategori arşivden çıkarıldı: {}", category.name);
        }

        CategoryCommands::Delete { category } => {
            let category = service.resolve(&category, None)?;
            service.delete(category.id)?;
            println!("Kategori silindi: {}", category.name);
        }
    }

    Ok(())
}
