//! Financial symbols.

use crate::data_table::DataTable;
use crate::supplier::ValuesSupplier;
use periodic_core::{
    CanonicalTable, Currency, Granularity, MonthPeriod, NormalizerConfig, Result, SecurityType,
    SymbolId,
};
use periodic_ingestion::PeriodNormalizer;
use std::fmt;
use tracing::debug;

/// One instrument's identity, metadata and raw-value supplier.
///
/// Metadata is fixed at construction. Every call to [`values`](Self::values)
/// or [`get_table`](Self::get_table) fetches and normalizes afresh; nothing is
/// cached, so callers that need repeated access should keep the returned
/// table.
pub struct FinancialSymbol {
    id: SymbolId,
    isin: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
    exchange: Option<String>,
    currency: Option<Currency>,
    security_type: Option<SecurityType>,
    period: Granularity,
    adjusted_close: Option<bool>,
    normalizer: PeriodNormalizer,
    values: Box<dyn ValuesSupplier>,
}

impl FinancialSymbol {
    /// Create a symbol whose raw values are encoded with `period` granularity.
    pub fn new(id: SymbolId, period: Granularity, values: impl ValuesSupplier + 'static) -> Self {
        Self {
            id,
            isin: None,
            short_name: None,
            long_name: None,
            exchange: None,
            currency: None,
            security_type: None,
            period,
            adjusted_close: None,
            normalizer: PeriodNormalizer::default(),
            values: Box::new(values),
        }
    }

    pub fn with_isin(mut self, isin: impl Into<String>) -> Self {
        self.isin = Some(isin.into());
        self
    }

    pub fn with_short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = Some(name.into());
        self
    }

    pub fn with_long_name(mut self, name: impl Into<String>) -> Self {
        self.long_name = Some(name.into());
        self
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// Currency the raw values are quoted in.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_security_type(mut self, security_type: SecurityType) -> Self {
        self.security_type = Some(security_type);
        self
    }

    pub fn with_adjusted_close(mut self, adjusted_close: bool) -> Self {
        self.adjusted_close = Some(adjusted_close);
        self
    }

    /// Override the normalizer settings.
    pub fn with_config(mut self, config: NormalizerConfig) -> Self {
        self.normalizer = PeriodNormalizer::new(config);
        self
    }

    pub fn id(&self) -> &SymbolId {
        &self.id
    }

    pub fn namespace(&self) -> &str {
        &self.id.namespace
    }

    pub fn ticker(&self) -> &str {
        &self.id.ticker
    }

    pub fn isin(&self) -> Option<&str> {
        self.isin.as_deref()
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    pub fn exchange(&self) -> Option<&str> {
        self.exchange.as_deref()
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    pub fn security_type(&self) -> Option<SecurityType> {
        self.security_type
    }

    /// Granularity of the raw values.
    pub fn period(&self) -> Granularity {
        self.period
    }

    pub fn adjusted_close(&self) -> Option<bool> {
        self.adjusted_close
    }

    /// Fetch the raw values and normalize them into a canonical table.
    pub fn values(&self) -> Result<CanonicalTable> {
        let raw = self.values.fetch()?;
        self.normalizer.normalize(&raw, self.period)
    }

    /// Bounded table for `[start_period, end_period]` tagged with `currency_code`.
    ///
    /// Arguments are validated before the supplier is invoked. An inverted
    /// range yields an empty table.
    pub fn get_table(
        &self,
        start_period: &str,
        end_period: &str,
        currency_code: &str,
    ) -> Result<DataTable<'_>> {
        let start: MonthPeriod = start_period.parse()?;
        let end: MonthPeriod = end_period.parse()?;
        let currency = Currency::from_code(currency_code)?;
        self.get_table_for(start, end, currency)
    }

    /// Typed form of [`get_table`](Self::get_table).
    pub fn get_table_for(
        &self,
        start: MonthPeriod,
        end: MonthPeriod,
        currency: Currency,
    ) -> Result<DataTable<'_>> {
        let values = self.values()?;
        let rows = values.range(start, end);

        debug!(
            symbol = %self.id,
            %start,
            %end,
            %currency,
            rows = rows.len(),
            "projected bounded table"
        );

        Ok(DataTable::new(self, currency, start, end, rows))
    }
}

impl fmt::Debug for FinancialSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinancialSymbol")
            .field("namespace", &self.id.namespace)
            .field("ticker", &self.id.ticker)
            .field("isin", &self.isin)
            .field("short_name", &self.short_name)
            .field("long_name", &self.long_name)
            .field("exchange", &self.exchange)
            .field("currency", &self.currency)
            .field("security_type", &self.security_type)
            .field("period", &self.period)
            .field("adjusted_close", &self.adjusted_close)
            .finish_non_exhaustive()
    }
}
