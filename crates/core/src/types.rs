//! Core data types for the periodic system.

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date-time layouts accepted for DAY and MONTH observations.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Date-only layouts accepted for DAY and MONTH observations.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Parse an observation timestamp.
///
/// Accepts plain dates (`2021-03-05`, `2021/03/05`, `05.03.2021`), naive
/// date-times and RFC 3339 timestamps. Offsets are dropped and the wall-clock
/// time is kept.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let t = s.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(t, fmt) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Ok(dt.naive_local());
    }

    Err(Error::malformed_temporal(format!("cannot parse {s:?} as a date")))
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// A calendar month, the canonical time key.
///
/// Ordered chronologically; displayed and serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthPeriod(NaiveDate);

impl MonthPeriod {
    /// Create a period from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(MonthPeriod)
            .ok_or_else(|| Error::malformed_temporal(format!("invalid month {year}-{month}")))
    }

    /// The month enclosing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        MonthPeriod(date.with_day0(0).unwrap_or(date))
    }

    /// The month enclosing `dt`.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self::from_date(dt.date())
    }

    /// The month of the local clock.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// The following month, if representable.
    pub fn succ(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(MonthPeriod)
    }

    /// The preceding month, if representable.
    pub fn pred(&self) -> Option<Self> {
        self.0.checked_sub_months(Months::new(1)).map(MonthPeriod)
    }

    fn parse_quarter(year: &str, quarter: &str) -> Option<Self> {
        let year = year.strip_suffix('-').unwrap_or(year);
        if !is_digits(year, 4) {
            return None;
        }
        let q: u32 = quarter.parse().ok().filter(|q| (1..=4).contains(q))?;
        Self::new(year.parse().ok()?, (q - 1) * 3 + 1).ok()
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthPeriod {
    type Err = Error;

    /// Accepts `YYYY-MM`, `YYYY/MM`, `YYYYMM`, `YYYY`, quarters (`YYYYQn`,
    /// `YYYY-Qn`, mapped to the quarter's first month) and any date accepted
    /// by [`parse_datetime`].
    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim();
        let malformed = || Error::malformed_temporal(format!("cannot parse {s:?} as a month"));

        if let Some(idx) = t.find(|c: char| c == 'Q' || c == 'q') {
            return Self::parse_quarter(&t[..idx], &t[idx + 1..]).ok_or_else(malformed);
        }

        if is_digits(t, 4) {
            return t.parse().map_err(|_| malformed()).and_then(|y| Self::new(y, 1));
        }

        if is_digits(t, 6) {
            let year = t[..4].parse().map_err(|_| malformed())?;
            let month = t[4..].parse().map_err(|_| malformed())?;
            return Self::new(year, month);
        }

        if t.len() == 7 && matches!(t.as_bytes()[4], b'-' | b'/') {
            let (year, month) = (&t[..4], &t[5..]);
            if !is_digits(year, 4) || !is_digits(month, 2) {
                return Err(malformed());
            }
            let year = year.parse().map_err(|_| malformed())?;
            let month = month.parse().map_err(|_| malformed())?;
            return Self::new(year, month);
        }

        parse_datetime(t)
            .map(Self::from_datetime)
            .map_err(|_| malformed())
    }
}

impl TryFrom<String> for MonthPeriod {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<MonthPeriod> for String {
    fn from(p: MonthPeriod) -> Self {
        p.to_string()
    }
}

/// How a raw table encodes time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    /// Exact daily dates; needs recency filtering and deduplication.
    Day,
    /// Exact dates, one observation per month.
    Month,
    /// Decade-coded labels with a sub-period suffix.
    Decade,
}

impl Granularity {
    /// Tag of this granularity.
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "DAY",
            Granularity::Month => "MONTH",
            Granularity::Decade => "DECADE",
        }
    }

    /// Name of the raw column carrying the temporal key.
    pub fn temporal_column(self) -> &'static str {
        match self {
            Granularity::Day | Granularity::Month => "date",
            Granularity::Decade => "decade",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" => Ok(Granularity::Day),
            "MONTH" => Ok(Granularity::Month),
            "DECADE" => Ok(Granularity::Decade),
            _ => Err(Error::unsupported_granularity(s)),
        }
    }
}

/// Currency a bounded table is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Usd,
    Eur,
    Gbp,
    Chf,
    Cny,
    Jpy,
}

impl Currency {
    /// All recognized currencies.
    pub const ALL: [Currency; 7] = [
        Currency::Rub,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Chf,
        Currency::Cny,
        Currency::Jpy,
    ];

    /// Resolve an ISO 4217 code. Lookup is exact: `"usd"` is not `USD`.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| Error::unknown_currency(code))
    }

    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Chf => "CHF",
            Currency::Cny => "CNY",
            Currency::Jpy => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

/// Kind of instrument behind a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityType {
    StockEtf,
    MutualFund,
    Index,
    Currency,
    Commodity,
    Inflation,
    Rate,
}

/// Identity of a financial symbol: `namespace/ticker`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId {
    pub namespace: String,
    pub ticker: String,
}

impl SymbolId {
    pub fn new(namespace: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ticker: ticker.into(),
        }
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.ticker)
    }
}

impl FromStr for SymbolId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((ns, ticker)) if !ns.is_empty() && !ticker.is_empty() && !ticker.contains('/') => {
                Ok(Self::new(ns, ticker))
            }
            _ => Err(Error::malformed_symbol_id(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i32, month: u32) -> MonthPeriod {
        MonthPeriod::new(year, month).unwrap()
    }

    #[test]
    fn test_period_parse_forms() {
        assert_eq!("2021-03".parse::<MonthPeriod>().unwrap(), period(2021, 3));
        assert_eq!("2021/03".parse::<MonthPeriod>().unwrap(), period(2021, 3));
        assert_eq!("202103".parse::<MonthPeriod>().unwrap(), period(2021, 3));
        assert_eq!("2021-03-31".parse::<MonthPeriod>().unwrap(), period(2021, 3));
        assert_eq!("2021".parse::<MonthPeriod>().unwrap(), period(2021, 1));
        assert_eq!("2021Q1".parse::<MonthPeriod>().unwrap(), period(2021, 1));
        assert_eq!("2021-Q3".parse::<MonthPeriod>().unwrap(), period(2021, 7));
    }

    #[test]
    fn test_period_parse_rejects_garbage() {
        for bad in ["", "2021-13", "2021Q5", "21-03", "March 2021", "2021-3"] {
            let err = bad.parse::<MonthPeriod>().unwrap_err();
            assert!(matches!(err, Error::MalformedTemporalValue(_)), "{bad}");
        }
    }

    #[test]
    fn test_period_ordering_and_display() {
        assert!(period(2020, 12) < period(2021, 1));
        assert_eq!(period(2021, 3).to_string(), "2021-03");
        assert_eq!(period(2020, 12).succ(), Some(period(2021, 1)));
        assert_eq!(period(2021, 1).pred(), Some(period(2020, 12)));
    }

    #[test]
    fn test_period_serde_as_string() {
        let json = serde_json::to_string(&period(2021, 3)).unwrap();
        assert_eq!(json, "\"2021-03\"");
        let back: MonthPeriod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period(2021, 3));
    }

    #[test]
    fn test_parse_datetime_forms() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
        assert_eq!(parse_datetime("2021-03-05").unwrap().date(), expected);
        assert_eq!(parse_datetime("05.03.2021").unwrap().date(), expected);
        assert_eq!(parse_datetime("2021-03-05 18:30:00").unwrap().date(), expected);
        assert_eq!(parse_datetime("2021-03-05T18:30:00+03:00").unwrap().date(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_granularity_tags() {
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert_eq!("DECADE".parse::<Granularity>().unwrap(), Granularity::Decade);
        let err = "WEEK".parse::<Granularity>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedGranularity(ref t) if t == "WEEK"));
        assert_eq!(Granularity::Decade.temporal_column(), "decade");
    }

    #[test]
    fn test_currency_lookup() {
        assert_eq!(Currency::from_code("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::Rub.to_string(), "RUB");
        assert!(matches!(
            Currency::from_code("ZZZ"),
            Err(Error::UnknownCurrency(_))
        ));
        assert!(Currency::from_code("usd").is_err());
    }

    #[test]
    fn test_symbol_id() {
        let id: SymbolId = "micex/SBER".parse().unwrap();
        assert_eq!(id, SymbolId::new("micex", "SBER"));
        assert_eq!(id.to_string(), "micex/SBER");
        assert!("SBER".parse::<SymbolId>().is_err());
        assert!("a/b/c".parse::<SymbolId>().is_err());
        assert!("/SBER".parse::<SymbolId>().is_err());
    }
}
