//! Chart-ready projections of a set of transactions.
//!
//! Both projections expect a collection that has already been narrowed with
//! [crate::filter_by_period].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    category::category_key,
    report::{Period, aggregation::finite_amount},
    transaction::{Transaction, TransactionKind},
};

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// The category label, as first spelled in the collection.
    pub category: String,
    /// The summed expense amount, always positive.
    pub total: f64,
}

/// Sum expenses per category.
///
/// Categories are grouped by their canonical key and labelled with the first
/// spelling encountered. Categories whose total is not positive are omitted.
/// The result is sorted by canonical key.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<String, CategoryTotal> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
    {
        totals
            .entry(category_key(&transaction.category))
            .or_insert_with(|| CategoryTotal {
                category: transaction.category.clone(),
                total: 0.0,
            })
            .total += finite_amount(transaction);
    }

    let mut totals: Vec<(String, CategoryTotal)> = totals
        .into_iter()
        .filter(|(_, category_total)| category_total.total > 0.0)
        .collect();
    totals.sort_by(|(a, _), (b, _)| a.cmp(b));

    totals
        .into_iter()
        .map(|(_, category_total)| category_total)
        .collect()
}

/// Total income and total expenses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeExpenseTotals {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses.
    pub expense: f64,
}

impl IncomeExpenseTotals {
    /// Whether there is anything worth charting.
    pub fn has_data(&self) -> bool {
        self.income > 0.0 || self.expense > 0.0
    }
}

/// Sum income and expenses separately.
pub fn income_vs_expense_totals(transactions: &[Transaction]) -> IncomeExpenseTotals {
    transactions
        .iter()
        .fold(IncomeExpenseTotals::default(), |mut totals, transaction| {
            match transaction.kind {
                TransactionKind::Income => totals.income += finite_amount(transaction),
                TransactionKind::Expense => totals.expense += finite_amount(transaction),
            }

            totals
        })
}

/// Both projections over one period, as returned by the reports endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// The period the report covers.
    pub period: Period,
    /// Expenses per category, see [expenses_by_category].
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Whether the category view has anything to show.
    pub has_category_data: bool,
    /// Income and expense totals, see [income_vs_expense_totals].
    pub totals: IncomeExpenseTotals,
    /// Whether the totals view has anything to show.
    pub has_totals_data: bool,
}

impl Report {
    /// Project `transactions`, which should already be filtered to `period`.
    pub fn build(period: Period, transactions: &[Transaction]) -> Self {
        let expenses_by_category = expenses_by_category(transactions);
        let totals = income_vs_expense_totals(transactions);

        Self {
            period,
            has_category_data: !expenses_by_category.is_empty(),
            expenses_by_category,
            has_totals_data: totals.has_data(),
            totals,
        }
    }
}
