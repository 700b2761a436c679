//! Grant (hibe) CLI commands

use clap::Subcommand;

use super::parse_percent;
use crate::display::format_grant_list;
use crate::error::DefterResult;
use crate::models::{GrantProvider, Percent};
use crate::services::{CreateGrantInput, GrantService, ProjectService, UpdateGrantInput};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum GrantCommands {
    /// Attach a grant covering a share of a project
    Add {
        /// Project name or ID
        project: String,
        /// TÜBİTAK, KOSGEB or any other provider name
        provider: String,
        /// Share of the contract amount, e.g. 60 or %60
        #[arg(value_parser = parse_percent)]
        percentage: Percent,
        /// Program name, e.g. 1507
        #[arg(long)]
        program: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List grants, optionally for one project
    List {
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Edit a grant
    Edit {
        id: String,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        program: Option<String>,
        #[arg(long, value_parser = parse_percent)]
        percentage: Option<Percent>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a grant without receipts
    Delete { id: String },
}

pub fn handle_grant_command(storage: &Storage, cmd: GrantCommands) -> DefterResult<()> {
    let service = GrantService::new(storage);
    let projects = ProjectService::new(storage);

    match cmd {
        GrantCommands::Add {
            project,
            provider,
            percentage,
            program,
            notes,
        } => {
            let project = projects.resolve(&project)?;
            let grant = service.add(CreateGrantInput {
                project_id: project.id,
                provider: GrantProvider::parse(&provider),
                program,
                percentage,
                notes,
            })?;
            println!(
                "Hibe eklendi: {} {} = {}",
                grant.provider,
                grant.percentage,
                grant.amount.format_with_currency(grant.currency)
            );
            println!("  ID: {}", grant.id);
        }

        GrantCommands::List { project } => {
            let project_id = project.map(|p| projects.resolve(&p)).transpose()?.map(|p| p.id);
            print!("{}", format_grant_list(&service.list(project_id)?));
        }

        GrantCommands::Edit {
            id,
            provider,
            program,
            percentage,
            notes,
        } => {
            let grant = service.resolve(&id)?;
            let input = UpdateGrantInput {
                provider: provider.as_deref().map(GrantProvider::parse),
                program,
                percentage,
                notes,
            };
            let updated = service.update(grant.id, input)?;
            println!(
                "Hibe güncellendi: {} {} = {}",
                updated.provider,
                updated.percentage,
                updated.amount.format_with_currency(updated.currency)
            );
        }

        GrantCommands::Delete { id } => {
            let grant = service.resolve(&id)?;
            service.delete(grant.id)?;
            println!("Hibe silindi: {}", grant.id);
        }
    }

    Ok(())
}
