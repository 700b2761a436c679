//! Summary Report
//!
//! Income, expense and tax totals for a date range, in the base currency,
//! broken down by category and by month.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::error::DefterResult;
use crate::models::{CategoryId, Currency, Money, TransactionKind};
use crate::storage::Storage;

/// Totals for one category (or the uncategorized bucket)
#[derive(Debug, Clone)]
pub struct CategoryTotal {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub kind: TransactionKind,
    pub total: Money,
    pub count: usize,
}

/// Income and expense of one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub income: Money,
    pub expense: Money,
}

impl MonthTotal {
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub base_currency: Currency,
    pub total_income: Money,
    pub total_expense: Money,
    /// VAT charged on income
    pub vat_collected: Money,
    /// VAT paid on expenses
    pub vat_paid: Money,
    /// Withholding deducted from our income
    pub withholding_on_income: Money,
    /// Withholding we deducted from expenses
    pub withholding_on_expense: Money,
    pub categories: Vec<CategoryTotal>,
    pub months: Vec<MonthTotal>,
    pub transaction_count: usize,
}

impl SummaryReport {
    pub fn generate(
        storage: &Storage,
        start_date: NaiveDate,
        end_date: NaiveDate,
        base_currency: Currency,
    ) -> DefterResult<Self> {
        let transactions = storage.transactions.get_by_date_range(start_date, end_date)?;
        let category_names: HashMap<CategoryId, String> = storage
            .categories
            .get_all()?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut report = Self {
            start_date,
            end_date,
            base_currency,
            total_income: Money::zero(),
            total_expense: Money::zero(),
            vat_collected: Money::zero(),
            vat_paid: Money::zero(),
            withholding_on_income: Money::zero(),
            withholding_on_expense: Money::zero(),
            categories: Vec::new(),
            months: Vec::new(),
            transaction_count: transactions.len(),
        };

        let mut by_category: HashMap<(TransactionKind, Option<CategoryId>), (Money, usize)> =
            HashMap::new();
        let mut by_month: BTreeMap<(i32, u32), MonthTotal> = BTreeMap::new();

        for txn in &transactions {
            let vat = txn.to_base(txn.tax.vat);
            let withholding = txn.to_base(txn.tax.withholding);
            let month = by_month
                .entry((txn.date.year(), txn.date.month()))
                .or_insert(MonthTotal {
                    year: txn.date.year(),
                    month: txn.date.month(),
                    income: Money::zero(),
                    expense: Money::zero(),
                });

            match txn.kind {
                TransactionKind::Income => {
                    report.total_income += txn.base_net;
                    report.vat_collected += vat;
                    report.withholding_on_income += withholding;
                    month.income += txn.base_net;
                }
                TransactionKind::Expense => {
                    report.total_expense += txn.base_net;
                    report.vat_paid += vat;
                    report.withholding_on_expense += withholding;
                    month.expense += txn.base_net;
                }
            }

            let entry = by_category
                .entry((txn.kind, txn.category_id))
                .or_insert((Money::zero(), 0));
            entry.0 += txn.base_net;
            entry.1 += 1;
        }

        report.categories = by_category
            .into_iter()
            .map(|((kind, category_id), (total, count))| CategoryTotal {
                category_id,
                name: category_id
                    .and_then(|id| category_names.get(&id).cloned())
                    .unwrap_or_else(|| "(kategorisiz)".to_string()),
                kind,
                total,
                count,
            })
            .collect();
        report
            .categories
            .sort_by(|a, b| a.kind.cmp(&b.kind).then(b.total.cmp(&a.total)));
        report.months = by_month.into_values().collect();

        Ok(report)
    }

    pub fn net(&self) -> Money {
        self.total_income - self.total_expense
    }

    /// VAT owed to the tax office for the period (negative when refundable)
    pub fn vat_balance(&self) -> Money {
        self.vat_collected - self.vat_paid
    }

    pub fn format_terminal(&self) -> String {
        let currency = self.base_currency;
        let mut output = String::new();

        output.push_str(&format!(
            "Özet Rapor: {} - {} ({})\n",
            self.start_date.format("%d.%m.%Y"),
            self.end_date.format("%d.%m.%Y"),
            currency
        ));
        output.push_str(&"=".repeat(64));
        output.push('\n');
        output.push_str(&format!("{:<28} {:>20}\n", "Toplam gelir", self.total_income.format_with_currency(currency)));
        output.push_str(&format!("{:<28} {:>20}\n", "Toplam gider", self.total_expense.format_with_currency(currency)));
        output.push_str(&format!("{:<28} {:>20}\n", "Net", self.net().format_with_currency(currency)));
        output.push('\n');
        output.push_str(&format!("{:<28} {:>20}\n", "Hesaplanan KDV", self.vat_collected.format_with_currency(currency)));
        output.push_str(&format!("{:<28} {:>20}\n", "İndirilecek KDV", self.vat_paid.format_with_currency(currency)));
        output.push_str(&format!("{:<28} {:>20}\n", "KDV farkı", self.vat_balance().format_with_currency(currency)));
        output.push_str(&format!(
            "{:<28} {:>20}\n",
            "Gelirden kesilen stopaj",
            self.withholding_on_income.format_with_currency(currency)
        ));
        output.push_str(&format!(
            "{:<28} {:>20}\n",
            "Giderden kesilen stopaj",
            self.withholding_on_expense.format_with_currency(currency)
        ));
        output.push_str(&format!("{:<28} {:>20}\n", "İşlem sayısı", self.transaction_count));

        if !self.categories.is_empty() {
            output.push_str(&format!("\n{:<8} {:<26} {:>18} {:>8}\n", "Tür", "Kategori", "Tutar", "Adet"));
            output.push_str(&"-".repeat(64));
            output.push('\n');
            for row in &self.categories {
                output.push_str(&format!(
                    "{:<8} {:<26} {:>18} {:>8}\n",
                    row.kind, row.name, row.total, row.count
                ));
            }
        }

        if !self.months.is_empty() {
            output.push_str(&format!("\n{:<10} {:>16} {:>16} {:>16}\n", "Ay", "Gelir", "Gider", "Net"));
            output.push_str(&"-".repeat(64));
            output.push('\n');
            for month in &self.months {
                output.push_str(&format!(
                    "{:<10} {:>16} {:>16} {:>16}\n",
                    format!("{:02}.{}", month.month, month.year),
                    month.income,
                    month.expense,
                    month.net()
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Percent, RateSource};
    use crate::services::testing::{create_test_storage, date};
    use crate::services::{CreateTransactionInput, ExchangeRateService, TransactionService};
    use rust_decimal_macros::dec;

    #[test]
    fn test_totals_in_base_currency() {
        let (_temp_dir, storage) = create_test_storage();
        let sales = Category::new("Satış", TransactionKind::Income);
        storage.categories.upsert(sales.clone()).unwrap();
        ExchangeRateService::new(&storage, Currency::Try)
            .set(Currency::Usd, date(2025, 1, 1), dec!(30), RateSource::Manual)
            .unwrap();
        let service = TransactionService::new(&storage, Currency::Try);

        let mut sale = CreateTransactionInput::new(
            TransactionKind::Income,
            date(2025, 1, 10),
            Money::from_cents(100_000),
            Currency::Try,
        );
        sale.category_id = Some(sales.id);
        sale.vat_rate = Percent::whole(20);
        service.create(sale).unwrap();

        let mut export = CreateTransactionInput::new(
            TransactionKind::Income,
            date(2025, 2, 3),
            Money::from_cents(1_000),
            Currency::Usd,
        );
        export.category_id = Some(sales.id);
        service.create(export).unwrap();

        let mut rent = CreateTransactionInput::new(
            TransactionKind::Expense,
            date(2025, 2, 5),
            Money::from_cents(50_000),
            Currency::Try,
        );
        rent.withholding_rate = Percent::whole(20);
        service.create(rent).unwrap();

        // Outside the range
        service
            .create(CreateTransactionInput::new(
                TransactionKind::Expense,
                date(2025, 3, 1),
                Money::from_cents(999),
                Currency::Try,
            ))
            .unwrap();

        let report = SummaryReport::generate(&storage, date(2025, 1, 1), date(2025, 2, 28), Currency::Try).unwrap();
        assert_eq!(report.transaction_count, 3);
        assert_eq!(report.total_income.cents(), 120_000 + 30_000);
        assert_eq!(report.total_expense.cents(), 40_000);
        assert_eq!(report.vat_collected.cents(), 20_000);
        assert_eq!(report.withholding_on_expense.cents(), 10_000);
        assert_eq!(report.net().cents(), 110_000);

        assert_eq!(report.months.len(), 2);
        assert_eq!(report.months[1].income.cents(), 30_000);

        let sales_row = report.categories.iter().find(|c| c.name == "Satış").unwrap();
        assert_eq!(sales_row.count, 2);
        assert!(report.categories.iter().any(|c| c.name == "(kategorisiz)"));

        let text = report.format_terminal();
        assert!(text.contains("Toplam gelir"));
        assert!(text.contains("02.2025"));
    }
}
