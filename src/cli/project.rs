//! Project and milestone CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use super::{parse_currency, parse_date, parse_money, parse_project_status, today};
use crate::config::Settings;
use crate::display::{format_milestone_list, format_project_details, format_project_list, Names};
use crate::error::DefterResult;
use crate::models::{Currency, Money, ProjectStatus};
use crate::services::{
    CreateProjectInput, GrantService, PartyService, ProjectService, UpdateMilestoneInput,
    UpdateProjectInput,
};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project
    Create {
        name: String,
        /// Contract amount
        #[arg(value_parser = parse_money)]
        contract: Money,
        #[arg(short = 'C', long, value_parser = parse_currency)]
        currency: Option<Currency>,
        /// Client party name or ID
        #[arg(short, long)]
        party: Option<String>,
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,
        #[arg(short, long, value_parser = parse_project_status)]
        status: Option<ProjectStatus>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List projects
    List {
        #[arg(short, long, value_parser = parse_project_status)]
        status: Option<ProjectStatus>,
    },

    /// Show a project with milestones, grants and profitability
    Show { project: String },

    /// Edit a project
    Edit {
        project: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_money)]
        contract: Option<Money>,
        #[arg(short, long, conflicts_with = "clear_party")]
        party: Option<String>,
        #[arg(long)]
        clear_party: bool,
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_end")]
        end: Option<NaiveDate>,
        #[arg(long)]
        clear_end: bool,
        #[arg(short, long, value_parser = parse_project_status)]
        status: Option<ProjectStatus>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a project without transactions
    Delete { project: String },
}

#[derive(Subcommand)]
pub enum MilestoneCommands {
    /// Add a billable milestone to a project
    Add {
        project: String,
        title: String,
        #[arg(value_parser = parse_money)]
        amount: Money,
        #[arg(long, value_parser = parse_date)]
        due: NaiveDate,
    },

    /// List the milestones of a project
    List { project: String },

    /// Edit a milestone
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_money)]
        amount: Option<Money>,
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },

    /// Mark a milestone as completed
    Complete {
        id: String,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Mark a completed milestone as invoiced
    Invoice { id: String },

    /// Move a milestone back to pending
    Reopen { id: String },

    /// Delete a milestone
    Delete { id: String },
}

pub fn handle_project_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ProjectCommands,
) -> DefterResult<()> {
    let service = ProjectService::new(storage);
    let parties = PartyService::new(storage);
    let date_format = settings.date_format.as_str();

    match cmd {
        ProjectCommands::Create {
            name,
            contract,
            currency,
            party,
            start,
            end,
            status,
            description,
        } => {
            let mut input = CreateProjectInput::new(
                name,
                contract,
                currency.unwrap_or(settings.base_currency),
                start.unwrap_or_else(today),
            );
            input.party_id = party.map(|p| parties.resolve(&p)).transpose()?.map(|p| p.id);
            input.end_date = end;
            input.description = description;
            if let Some(status) = status {
                input.status = status;
            }

            let project = service.create(input)?;
            println!(
                "Proje oluşturuldu: {} ({})",
                project.name,
                project.contract_amount.format_with_currency(project.currency)
            );
            println!("  ID: {}", project.id);
        }

        ProjectCommands::List { status } => {
            let projects = service.list(status)?;
            let names = Names::load(storage)?;
            print!("{}", format_project_list(&projects, &names, date_format));
        }

        ProjectCommands::Show { project } => {
            let project = service.resolve(&project)?;
            let summary = service.summary(project.id)?;
            let milestones = service.milestones(project.id)?;
            let grants = GrantService::new(storage).list(Some(project.id))?;
            let names = Names::load(storage)?;
            print!(
                "{}",
                format_project_details(&summary, &milestones, &grants, &names, date_format)
            );
        }

        ProjectCommands::Edit {
            project,
            name,
            contract,
            party,
            clear_party,
            start,
            end,
            clear_end,
            status,
            description,
        } => {
            let project = service.resolve(&project)?;
            let party_id = match (party, clear_party) {
                (_, true) => Some(None),
                (Some(p), false) => Some(Some(parties.resolve(&p)?.id)),
                (None, false) => None,
            };
            let input = UpdateProjectInput {
                name,
                party_id,
                description,
                contract_amount: contract,
                start_date: start,
                end_date: if clear_end { Some(None) } else { end.map(Some) },
                status,
            };
            let updated = service.update(project.id, input)?;
            println!("Proje güncellendi: {}", updated.name);
        }

        ProjectCommands::Delete { project } => {
            let project = service.resolve(&project)?;
            service.delete(project.id)?;
            println!("Proje silindi: {}", project.name);
        }
    }

    Ok(())
}

pub fn handle_milestone_command(
    storage: &Storage,
    settings: &Settings,
    cmd: MilestoneCommands,
) -> DefterResult<()> {
    let service = ProjectService::new(storage);
    let date_format = settings.date_format.as_str();

    match cmd {
        MilestoneCommands::Add {
            project,
            title,
            amount,
            due,
        } => {
            let project = service.resolve(&project)?;
            let milestone = service.add_milestone(project.id, &title, amount, due)?;
            println!(
                "Aşama eklendi: {} ({})",
                milestone.title,
                milestone.amount.format_with_currency(project.currency)
            );
            println!("  ID: {}", milestone.id);
        }

        MilestoneCommands::List { project } => {
            let project = service.resolve(&project)?;
            let milestones = service.milestones(project.id)?;
            print!(
                "{}",
                format_milestone_list(&milestones, project.currency, date_format)
            );
        }

        MilestoneCommands::Edit {
            id,
            title,
            amount,
            due,
        } => {
            let milestone = service.find_milestone(&id)?;
            let input = UpdateMilestoneInput {
                title,
                amount,
                due_date: due,
            };
            let updated = service.update_milestone(milestone.id, input)?;
            println!("Aşama güncellendi: {}", updated.title);
        }

        MilestoneCommands::Complete { id, date } => {
            let milestone = service.find_milestone(&id)?;
            let updated = service.complete_milestone(milestone.id, date.unwrap_or_else(today))?;
            println!("Aşama tamamlandı: {}", updated.title);
        }

        MilestoneCommands::Invoice { id } => {
            let milestone = service.find_milestone(&id)?;
            let updated = service.invoice_milestone(milestone.id)?;
            println!("Aşama faturalandı: {}", updated.title);
        }

        MilestoneCommands::Reopen { id } => {
            let milestone = service.find_milestone(&id)?;
            let updated = service.reopen_milestone(milestone.id)?;
            println!("Aşama yeniden açıldı: {}", updated.title);
        }

        MilestoneCommands::Delete { id } => {
            let milestone = service.find_milestone(&id)?;
            service.delete_milestone(milestone.id)?;
            println!("Aşama silindi: {}", milestone.title);
        }
    }

    Ok(())
}
