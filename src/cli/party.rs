//! Party (cari) CLI commands

use clap::Subcommand;

use super::parse_party_kind;
use crate::display::{format_party_details, format_party_list};
use crate::error::DefterResult;
use crate::models::PartyKind;
use crate::services::{CreatePartyInput, PartyService, UpdatePartyInput};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum PartyCommands {
    /// List parties
    List {
        /// Include archived parties
        #[arg(short, long)]
        all: bool,
    },

    /// Create a party
    Create {
        name: String,
        /// customer, supplier or both
        #[arg(short, long, default_value = "customer", value_parser = parse_party_kind)]
        kind: PartyKind,
        #[arg(long)]
        tax_number: Option<String>,
        #[arg(long)]
        tax_office: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a party with its open balance
    Show {
        /// Party name or ID
        party: String,
    },

    /// Edit a party
    Edit {
        party: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, value_parser = parse_party_kind)]
        kind: Option<PartyKind>,
        #[arg(long)]
        tax_number: Option<String>,
        #[arg(long)]
        tax_office: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Archive a party (hidden from lists, history kept)
    Archive { party: String },

    /// Restore an archived party
    Unarchive { party: String },

    /// Delete a party that nothing refers to
    Delete { party: String },
}

pub fn handle_party_command(storage: &Storage, cmd: PartyCommands) -> DefterResult<()> {
    let service = PartyService::new(storage);

    match cmd {
        PartyCommands::List { all } => {
            print!("{}", format_party_list(&service.list(all)?));
        }

        PartyCommands::Create {
            name,
            kind,
            tax_number,
            tax_office,
            phone,
            email,
            address,
            notes,
        } => {
            let party = service.create(CreatePartyInput {
                name,
                kind,
                tax_number,
                tax_office,
                phone,
                email,
                address,
                notes,
            })?;
            println!("Cari oluşturuldu: {}", party.name);
            println!("  ID: {}", party.id);
        }

        PartyCommands::Show { party } => {
            let party = service.resolve(&party)?;
            let balances = service.balance(party.id)?;
            print!("{}", format_party_details(&party, &balances));
        }

        PartyCommands::Edit {
            party,
            name,
            kind,
            tax_number,
            tax_office,
            phone,
            email,
            address,
            notes,
        } => {
            let party = service.resolve(&party)?;
            let input = UpdatePartyInput {
                name,
                kind,
                tax_number,
                tax_office,
                phone,
                email,
                address,
                notes,
            };
            let updated = service.update(party.id, input)?;
            println!("Cari güncellendi: {}", updated.name);
        }

        PartyCommands::Archive { party } => {
            let party = service.resolve(&party)?;
            service.archive(party.id)?;
            println!("Cari arşivlendi: {}", party.name);
        }

        PartyCommands::Unarchive { party } => {
            let party = service.resolve(&party)?;
            service.unarchive(party.id)?;
            println!("Cari arşivden çıkarıldı: {}", party.name);
        }

        PartyCommands::Delete { party } => {
            let party = service.resolve(&party)?;
            service.delete(party.id)?;
            println!("Cari silindi: {}", party.name);
        }
    }

    Ok(())
}
