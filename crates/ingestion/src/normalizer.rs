//! Period normalization.
//!
//! Converts a raw observation table into a canonical table indexed by month:
//! one row per period, sorted ascending, temporal column removed.

use crate::decade;
use chrono::{Duration, Local, NaiveDateTime};
use periodic_core::{
    parse_datetime, CanonicalTable, Error, Granularity, MonthPeriod, NormalizerConfig, RawRow,
    RawTable, Result, Row,
};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Counters collected during one normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Raw rows received.
    pub rows_in: usize,
    /// DAY rows dropped because their month is the newest month of a stale feed.
    pub stale_dropped: usize,
    /// DAY rows dropped because their month is still open.
    pub current_dropped: usize,
    /// DAY rows superseded by a later observation in the same month.
    pub superseded: usize,
    /// DECADE rows whose sub-period is not the authoritative one.
    pub decade_filtered: usize,
    /// Canonical rows produced.
    pub rows_out: usize,
}

/// Normalizer from raw observations to month-indexed tables.
#[derive(Debug, Clone, Default)]
pub struct PeriodNormalizer {
    config: NormalizerConfig,
}

impl PeriodNormalizer {
    /// Create a new normalizer.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize against the local wall clock.
    pub fn normalize(&self, raw: &RawTable, granularity: Granularity) -> Result<CanonicalTable> {
        self.normalize_at(raw, granularity, Local::now().naive_local())
    }

    /// Normalize with `now` as the reference time for recency checks.
    pub fn normalize_at(
        &self,
        raw: &RawTable,
        granularity: Granularity,
        now: NaiveDateTime,
    ) -> Result<CanonicalTable> {
        self.normalize_with_stats_at(raw, granularity, now)
            .map(|(table, _)| table)
    }

    /// Normalize with a textual granularity tag.
    ///
    /// An unrecognized tag fails before any row is looked at.
    pub fn normalize_tagged(&self, raw: &RawTable, tag: &str) -> Result<CanonicalTable> {
        let granularity: Granularity = tag.parse()?;
        self.normalize(raw, granularity)
    }

    /// Normalize and report what was dropped along the way.
    pub fn normalize_with_stats_at(
        &self,
        raw: &RawTable,
        granularity: Granularity,
        now: NaiveDateTime,
    ) -> Result<(CanonicalTable, NormalizeStats)> {
        let mut stats = NormalizeStats {
            rows_in: raw.len(),
            ..Default::default()
        };

        let rows = match granularity {
            Granularity::Day => self.daily_rows(raw, now, &mut stats)?,
            Granularity::Month => monthly_rows(raw)?,
            Granularity::Decade => self.decade_rows(raw, &mut stats)?,
        };

        let table = CanonicalTable::from_rows(rows)?;
        stats.rows_out = table.len();

        debug!(
            granularity = %granularity,
            rows_in = stats.rows_in,
            rows_out = stats.rows_out,
            stale_dropped = stats.stale_dropped,
            current_dropped = stats.current_dropped,
            superseded = stats.superseded,
            decade_filtered = stats.decade_filtered,
            "normalized raw table"
        );

        Ok((table, stats))
    }

    /// Latest observation per month, minus incomplete trailing months.
    fn daily_rows(
        &self,
        raw: &RawTable,
        now: NaiveDateTime,
        stats: &mut NormalizeStats,
    ) -> Result<Vec<Row>> {
        let column = Granularity::Day.temporal_column();
        let dated = raw
            .rows()
            .iter()
            .map(|row| {
                let dt = parse_datetime(temporal_text(row, column)?)?;
                Ok((dt, MonthPeriod::from_datetime(dt), row))
            })
            .collect::<Result<Vec<_>>>()?;

        let Some(max_date) = dated.iter().map(|(dt, _, _)| *dt).max() else {
            return Ok(Vec::new());
        };

        let is_stale = Duration::try_days(self.config.staleness_days)
            .and_then(|d| now.checked_sub_signed(d))
            .is_some_and(|cutoff| max_date < cutoff);
        let stale_period = is_stale.then(|| MonthPeriod::from_datetime(max_date));
        if let Some(period) = stale_period {
            warn!(
                %max_date,
                %period,
                staleness_days = self.config.staleness_days,
                "stale daily feed, dropping newest period"
            );
        }

        let current_period = MonthPeriod::from_datetime(now);
        let mut latest: BTreeMap<MonthPeriod, (NaiveDateTime, &RawRow)> = BTreeMap::new();

        for (dt, period, row) in dated {
            if stale_period == Some(period) {
                trace!(%dt, %period, "dropping row of stale period");
                stats.stale_dropped += 1;
                continue;
            }
            if self.config.drop_current_period && period == current_period {
                trace!(%dt, %period, "dropping row of open period");
                stats.current_dropped += 1;
                continue;
            }

            match latest.entry(period) {
                Entry::Vacant(e) => {
                    e.insert((dt, row));
                }
                Entry::Occupied(mut e) => {
                    stats.superseded += 1;
                    // Ties go to the row appearing later in the input.
                    if dt >= e.get().0 {
                        e.insert((dt, row));
                    }
                }
            }
        }

        Ok(latest
            .into_iter()
            .map(|(period, (_, row))| Row::new(period, row.columns_without(column)))
            .collect())
    }

    /// Authoritative decade rows, keyed by the month in their label.
    fn decade_rows(&self, raw: &RawTable, stats: &mut NormalizeStats) -> Result<Vec<Row>> {
        let column = Granularity::Decade.temporal_column();
        let mut rows = Vec::new();

        for row in raw.rows() {
            let label = temporal_text(row, column)?;
            match decade::authoritative_month(label, self.config.decade_marker)? {
                Some(period) => rows.push(Row::new(period, row.columns_without(column))),
                None => {
                    trace!(label, "dropping non-authoritative decade row");
                    stats.decade_filtered += 1;
                }
            }
        }

        Ok(rows)
    }
}

/// One row per monthly observation; a repeated month surfaces later as
/// [`Error::DuplicatePeriod`].
fn monthly_rows(raw: &RawTable) -> Result<Vec<Row>> {
    let column = Granularity::Month.temporal_column();
    raw.rows()
        .iter()
        .map(|row| {
            let dt = parse_datetime(temporal_text(row, column)?)?;
            Ok(Row::new(
                MonthPeriod::from_datetime(dt),
                row.columns_without(column),
            ))
        })
        .collect()
}

fn temporal_text<'a>(row: &'a RawRow, column: &str) -> Result<&'a str> {
    match row.get(column) {
        Some(cell) => cell.as_text().ok_or_else(|| {
            Error::malformed_temporal(format!("column {column:?} is not text: {cell:?}"))
        }),
        None => Err(Error::malformed_temporal(format!(
            "missing column {column:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn period(year: i32, month: u32) -> MonthPeriod {
        MonthPeriod::new(year, month).unwrap()
    }

    fn make_day(date: &str, close: f64) -> RawRow {
        RawRow::new().with("date", date).with("close", close)
    }

    fn make_decade(label: &str, rate: f64) -> RawRow {
        RawRow::new().with("decade", label).with("rate", rate)
    }

    fn close_of(table: &CanonicalTable, p: MonthPeriod) -> f64 {
        table.get(p).unwrap().value("close").unwrap().0
    }

    #[test]
    fn test_day_keeps_latest_observation() {
        let raw: RawTable = vec![
            make_day("2021-03-20", 2.0),
            make_day("2021-03-05", 1.0),
            make_day("2021-04-30", 4.0),
        ]
        .into_iter()
        .collect();

        let table = PeriodNormalizer::default()
            .normalize_at(&raw, Granularity::Day, at(2021, 5, 10))
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_relative_eq!(close_of(&table, period(2021, 3)), 2.0);
        assert!(table.get(period(2021, 3)).unwrap().get("date").is_none());
    }

    #[test]
    fn test_day_drops_newest_period_when_stale() {
        let raw: RawTable = vec![
            make_day("2021-02-26", 1.0),
            make_day("2021-03-05", 2.0),
            make_day("2021-03-10", 3.0),
        ]
        .into_iter()
        .collect();

        let (table, stats) = PeriodNormalizer::default()
            .normalize_with_stats_at(&raw, Granularity::Day, at(2021, 6, 1))
            .unwrap();

        let periods: Vec<_> = table.periods().collect();
        assert_eq!(periods, vec![period(2021, 2)]);
        assert_eq!(stats.stale_dropped, 2);
    }

    #[test]
    fn test_day_fresh_feed_keeps_newest_period() {
        let raw: RawTable = vec![make_day("2021-02-26", 1.0), make_day("2021-03-31", 2.0)]
            .into_iter()
            .collect();

        // 11 days after the newest date: not stale, March is closed.
        let table = PeriodNormalizer::default()
            .normalize_at(&raw, Granularity::Day, at(2021, 4, 11))
            .unwrap();

        assert_eq!(table.last_period(), Some(period(2021, 3)));
    }

    #[test]
    fn test_day_drops_current_period() {
        let raw: RawTable = vec![make_day("2021-03-31", 1.0), make_day("2021-04-02", 2.0)]
            .into_iter()
            .collect();

        let normalizer = PeriodNormalizer::default();
        let (table, stats) = normalizer
            .normalize_with_stats_at(&raw, Granularity::Day, at(2021, 4, 5))
            .unwrap();
        assert_eq!(table.periods().collect::<Vec<_>>(), vec![period(2021, 3)]);
        assert_eq!(stats.current_dropped, 1);

        let keep_open = PeriodNormalizer::new(NormalizerConfig {
            drop_current_period: false,
            ..Default::default()
        });
        let table = keep_open
            .normalize_at(&raw, Granularity::Day, at(2021, 4, 5))
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_day_tie_goes_to_later_row() {
        let raw: RawTable = vec![make_day("2021-03-20", 1.0), make_day("2021-03-20", 2.0)]
            .into_iter()
            .collect();

        let table = PeriodNormalizer::default()
            .normalize_at(&raw, Granularity::Day, at(2021, 4, 1))
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_relative_eq!(close_of(&table, period(2021, 3)), 2.0);
    }

    #[test]
    fn test_day_empty_input() {
        let table = PeriodNormalizer::default()
            .normalize_at(&RawTable::new(), Granularity::Day, at(2021, 4, 1))
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_month_maps_dates_to_periods() {
        let raw: RawTable = vec![
            make_day("2021-02-28", 2.0),
            make_day("2021-01-31", 1.0),
            make_day("2021-03-31", 3.0),
        ]
        .into_iter()
        .collect();

        // Monthly feeds are neither deduplicated nor checked for staleness.
        let table = PeriodNormalizer::default()
            .normalize_at(&raw, Granularity::Month, at(2030, 1, 1))
            .unwrap();

        let periods: Vec<_> = table.periods().collect();
        assert_eq!(periods, vec![period(2021, 1), period(2021, 2), period(2021, 3)]);
        assert_relative_eq!(close_of(&table, period(2021, 2)), 2.0);
    }

    #[test]
    fn test_month_duplicate_is_error() {
        let raw: RawTable = vec![make_day("2021-03-01", 1.0), make_day("2021-03-31", 2.0)]
            .into_iter()
            .collect();

        let err = PeriodNormalizer::default()
            .normalize_at(&raw, Granularity::Month, at(2021, 5, 1))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePeriod(p) if p == period(2021, 3)));
    }

    #[test]
    fn test_decade_keeps_marker_rows() {
        let raw: RawTable = vec![
            make_decade("2021Q1_3", 1.0),
            make_decade("2021Q1_7", 7.0),
            make_decade("2020-12_3", 0.5),
            make_decade("2020-12_1", 0.1),
        ]
        .into_iter()
        .collect();

        let (table, stats) = PeriodNormalizer::default()
            .normalize_with_stats_at(&raw, Granularity::Decade, at(2021, 5, 1))
            .unwrap();

        let periods: Vec<_> = table.periods().collect();
        assert_eq!(periods, vec![period(2020, 12), period(2021, 1)]);
        assert_relative_eq!(
            table.get(period(2021, 1)).unwrap().value("rate").unwrap().0,
            1.0
        );
        assert!(table.get(period(2021, 1)).unwrap().get("decade").is_none());
        assert_eq!(stats.decade_filtered, 2);
    }

    #[test]
    fn test_custom_decade_marker() {
        let raw: RawTable = vec![make_decade("2021-03_1", 1.0), make_decade("2021-03_3", 3.0)]
            .into_iter()
            .collect();
        let normalizer = PeriodNormalizer::new(NormalizerConfig {
            decade_marker: '1',
            ..Default::default()
        });

        let table = normalizer
            .normalize_at(&raw, Granularity::Decade, at(2021, 5, 1))
            .unwrap();
        assert_relative_eq!(
            table.get(period(2021, 3)).unwrap().value("rate").unwrap().0,
            1.0
        );
    }

    #[test]
    fn test_malformed_date() {
        let raw: RawTable = vec![make_day("2021-03-05", 1.0), make_day("not a date", 2.0)]
            .into_iter()
            .collect();

        let err = PeriodNormalizer::default()
            .normalize_at(&raw, Granularity::Day, at(2021, 5, 1))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedTemporalValue(_)));
    }

    #[test]
    fn test_missing_or_numeric_temporal_column() {
        let normalizer = PeriodNormalizer::default();

        let missing: RawTable = vec![RawRow::new().with("close", 1.0)].into_iter().collect();
        assert!(matches!(
            normalizer.normalize_at(&missing, Granularity::Month, at(2021, 5, 1)),
            Err(Error::MalformedTemporalValue(_))
        ));

        let numeric: RawTable = vec![RawRow::new().with("date", 20210305.0)]
            .into_iter()
            .collect();
        assert!(matches!(
            normalizer.normalize_at(&numeric, Granularity::Day, at(2021, 5, 1)),
            Err(Error::MalformedTemporalValue(_))
        ));
    }

    #[test]
    fn test_unsupported_tag_fails_before_rows() {
        // Rows are garbage; the tag must be rejected first.
        let raw: RawTable = vec![RawRow::new().with("date", "???")].into_iter().collect();

        let err = PeriodNormalizer::default()
            .normalize_tagged(&raw, "WEEK")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedGranularity(_)));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let raw: RawTable = vec![make_day("2021-03-05", 1.0), make_day("2021-03-20", 2.0)]
            .into_iter()
            .collect();
        let before = raw.clone();

        PeriodNormalizer::default()
            .normalize_at(&raw, Granularity::Day, at(2021, 5, 1))
            .unwrap();

        assert_eq!(raw, before);
    }
}
