//! Bounded, currency-tagged tables.

use crate::symbol::FinancialSymbol;
use periodic_core::{Currency, MonthPeriod, Row, Value};

/// Rows of one symbol within a period range, tagged with a currency.
///
/// Owns its rows: filtering or consuming one table never affects another.
#[derive(Debug, Clone)]
pub struct DataTable<'a> {
    financial_symbol: &'a FinancialSymbol,
    currency: Currency,
    start_period: MonthPeriod,
    end_period: MonthPeriod,
    rows: Vec<Row>,
}

impl<'a> DataTable<'a> {
    pub(crate) fn new(
        financial_symbol: &'a FinancialSymbol,
        currency: Currency,
        start_period: MonthPeriod,
        end_period: MonthPeriod,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            financial_symbol,
            currency,
            start_period,
            end_period,
            rows,
        }
    }

    /// Symbol the rows were taken from.
    pub fn financial_symbol(&self) -> &'a FinancialSymbol {
        self.financial_symbol
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Requested start of the range (inclusive).
    pub fn start_period(&self) -> MonthPeriod {
        self.start_period
    }

    /// Requested end of the range (inclusive).
    pub fn end_period(&self) -> MonthPeriod {
        self.end_period
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn periods(&self) -> impl Iterator<Item = MonthPeriod> + '_ {
        self.rows.iter().map(|r| r.period)
    }

    pub fn get(&self, period: MonthPeriod) -> Option<&Row> {
        self.rows
            .binary_search_by_key(&period, |r| r.period)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// First period actually present, which may be later than `start_period`.
    pub fn first_period(&self) -> Option<MonthPeriod> {
        self.rows.first().map(|r| r.period)
    }

    /// Last period actually present.
    pub fn last_period(&self) -> Option<MonthPeriod> {
        self.rows.last().map(|r| r.period)
    }

    /// Numeric series of one column. Rows where it is missing or not numeric
    /// are skipped.
    pub fn column(&self, name: &str) -> Vec<(MonthPeriod, Value)> {
        self.rows
            .iter()
            .filter_map(|r| r.value(name).map(|v| (r.period, v)))
            .collect()
    }
}
