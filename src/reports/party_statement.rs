//! Party Statement
//!
//! Chronological account of a party (cari ekstre): debts issued and
//! payments made, with a running balance per currency. Positive balances
//! mean the party owes us. Ledger transactions with the party are listed
//! alongside for reference but do not move the balance, since the debts
//! and payments already carry those amounts.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{DefterError, DefterResult};
use crate::models::{Currency, DebtDirection, Money, Party, PartyId, TransactionKind};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementEntryKind {
    Debt,
    Payment,
    Transaction,
}

#[derive(Debug, Clone)]
pub struct StatementLine {
    pub date: NaiveDate,
    pub kind: StatementEntryKind,
    pub reference: String,
    pub description: String,
    /// Increases what the party owes us
    pub debit: Money,
    /// Decreases what the party owes us
    pub credit: Money,
    /// Running balance after this line; `None` for informational lines
    pub balance: Option<Money>,
}

/// Lines of one currency
#[derive(Debug, Clone)]
pub struct CurrencyStatement {
    pub currency: Currency,
    pub opening: Money,
    pub lines: Vec<StatementLine>,
    pub closing: Money,
}

#[derive(Debug, Clone)]
pub struct PartyStatement {
    pub party: Party,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub currencies: Vec<CurrencyStatement>,
}

/// A balance-moving event before it is placed in a statement
struct Movement {
    date: NaiveDate,
    kind: StatementEntryKind,
    reference: String,
    description: String,
    currency: Currency,
    /// Signed effect on what the party owes us
    effect: Money,
}

impl PartyStatement {
    pub fn generate(
        storage: &Storage,
        party_id: PartyId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DefterResult<Self> {
        let party = storage
            .parties
            .get(party_id)?
            .ok_or_else(|| DefterError::party_not_found(party_id.to_string()))?;

        let mut movements = Vec::new();
        for debt in storage.debts.get_by_party(party_id)? {
            let owed_to_us = debt.direction == DebtDirection::Receivable;
            movements.push(Movement {
                date: debt.issue_date,
                kind: StatementEntryKind::Debt,
                reference: debt.id.to_string(),
                description: format!("{}: {}", debt.direction, debt.description),
                currency: debt.currency,
                effect: if owed_to_us { debt.principal } else { -debt.principal },
            });

            for payment in storage.payments.get_by_debt(debt.id)? {
                movements.push(Movement {
                    date: payment.date,
                    kind: StatementEntryKind::Payment,
                    reference: payment.id.to_string(),
                    description: format!("Ödeme ({})", payment.method),
                    currency: payment.currency,
                    effect: if owed_to_us { -payment.amount } else { payment.amount },
                });
            }
        }
        movements.sort_by(|a, b| a.date.cmp(&b.date).then(kind_order(a.kind).cmp(&kind_order(b.kind))));

        let mut by_currency: BTreeMap<Currency, CurrencyStatement> = BTreeMap::new();
        for movement in movements {
            if movement.date > end_date {
                continue;
            }
            let statement = by_currency
                .entry(movement.currency)
                .or_insert_with(|| CurrencyStatement {
                    currency: movement.currency,
                    opening: Money::zero(),
                    lines: Vec::new(),
                    closing: Money::zero(),
                });

            statement.closing += movement.effect;
            if movement.date < start_date {
                statement.opening = statement.closing;
                continue;
            }

            let (debit, credit) = if movement.effect.is_negative() {
                (Money::zero(), -movement.effect)
            } else {
                (movement.effect, Money::zero())
            };
            statement.lines.push(StatementLine {
                date: movement.date,
                kind: movement.kind,
                reference: movement.reference,
                description: movement.description,
                debit,
                credit,
                balance: Some(statement.closing),
            });
        }

        for txn in storage.transactions.get_by_party(party_id)? {
            if txn.date < start_date || txn.date > end_date {
                continue;
            }
            let statement = by_currency
                .entry(txn.currency)
                .or_insert_with(|| CurrencyStatement {
                    currency: txn.currency,
                    opening: Money::zero(),
                    lines: Vec::new(),
                    closing: Money::zero(),
                });
            let (debit, credit) = match txn.kind {
                TransactionKind::Income => (Money::zero(), txn.tax.net),
                TransactionKind::Expense => (txn.tax.net, Money::zero()),
            };
            statement.lines.push(StatementLine {
                date: txn.date,
                kind: StatementEntryKind::Transaction,
                reference: txn.id.to_string(),
                description: format!("{}: {}", txn.kind, txn.description),
                debit,
                credit,
                balance: None,
            });
        }

        let mut currencies: Vec<CurrencyStatement> = by_currency.into_values().collect();
        for statement in &mut currencies {
            statement
                .lines
                .sort_by(|a, b| a.date.cmp(&b.date).then(kind_order(a.kind).cmp(&kind_order(b.kind))));
        }

        Ok(Self {
            party,
            start_date,
            end_date,
            currencies,
        })
    }

    /// Closing balance in a currency (zero when the party has none)
    pub fn closing(&self, currency: Currency) -> Money {
        self.currencies
            .iter()
            .find(|c| c.currency == currency)
            .map(|c| c.closing)
            .unwrap_or_default()
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Cari Ekstre: {}  ({} - {})\n",
            self.party.name,
            self.start_date.format("%d.%m.%Y"),
            self.end_date.format("%d.%m.%Y")
        ));
        output.push_str(&"=".repeat(96));
        output.push('\n');

        if self.currencies.is_empty() {
            output.push_str("Bu dönemde hareket yok.\n");
            return output;
        }

        for statement in &self.currencies {
            output.push_str(&format!(
                "\n[{}] Devreden bakiye: {}\n",
                statement.currency, statement.opening
            ));
            output.push_str(&format!(
                "{:<10} {:<14} {:<32} {:>12} {:>12} {:>12}\n",
                "Tarih", "Belge", "Açıklama", "Borç", "Alacak", "Bakiye"
            ));
            output.push_str(&"-".repeat(96));
            output.push('\n');
            for line in &statement.lines {
                let balance = line.balance.map(|b| b.to_string()).unwrap_or_else(|| "(bilgi)".into());
                let description: String = line.description.chars().take(32).collect();
                output.push_str(&format!(
                    "{:<10} {:<14} {:<32} {:>12} {:>12} {:>12}\n",
                    line.date.format("%d.%m.%Y"),
                    line.reference,
                    description,
                    line.debit,
                    line.credit,
                    balance
                ));
            }
            output.push_str(&format!("[{}] Bakiye: {}\n", statement.currency, statement.closing));
        }

        output
    }
}

fn kind_order(kind: StatementEntryKind) -> u8 {
    match kind {
        StatementEntryKind::Debt => 0,
        StatementEntryKind::Payment => 1,
        StatementEntryKind::Transaction => 2,
    }
}
