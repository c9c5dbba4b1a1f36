//! Filter, group, sum and truncate sales records into chart buckets

use crate::record::SalesRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument, warn};
use vgchart_config::{BucketOrder, GroupBy, PageConfig, YearRange};

/// Label of the catch-all bucket
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Fixed release-year intervals, in chronological order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Interval {
    Eighties,
    Nineties,
    Noughties,
    TwentyTens,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::Eighties,
        Interval::Nineties,
        Interval::Noughties,
        Interval::TwentyTens,
    ];

    /// Interval containing `year`; years before 1980 have none
    pub fn from_year(year: i32) -> Option<Self> {
        match year {
            y if y < 1980 => None,
            1980..=1989 => Some(Self::Eighties),
            1990..=1999 => Some(Self::Nineties),
            2000..=2009 => Some(Self::Noughties),
            _ => Some(Self::TwentyTens),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Eighties => "1980-1989",
            Self::Nineties => "1990-1999",
            Self::Noughties => "2000-2009",
            Self::TwentyTens => "2010+",
        }
    }
}

/// Grouping key of one bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum GroupKey {
    Year(i32),
    Interval(Interval),
    Publisher(String),
    Unknown,
}

impl GroupKey {
    /// Key of `record` under the given grouping
    pub fn for_record(record: &SalesRecord, group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Year => record.year.map_or(Self::Unknown, Self::Year),
            GroupBy::Interval => record
                .year
                .and_then(Interval::from_year)
                .map_or(Self::Unknown, Self::Interval),
            GroupBy::Publisher => {
                let publisher = record.publisher.trim();
                // The dataset spells missing publishers both ways
                if publisher.is_empty() || publisher == UNKNOWN_LABEL {
                    Self::Unknown
                } else {
                    Self::Publisher(publisher.to_string())
                }
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Year(year) => year.to_string(),
            Self::Interval(interval) => interval.label().to_string(),
            Self::Publisher(name) => name.clone(),
            Self::Unknown => UNKNOWN_LABEL.to_string(),
        }
    }

    /// Release year when the key can be placed on a continuous axis
    pub fn year(&self) -> Option<i32> {
        match self {
            Self::Year(year) => Some(*year),
            _ => None,
        }
    }

    // Catch-all first; publishers compare equal so a stable sort keeps them in place
    fn chronological_rank(&self) -> (u8, i64) {
        match self {
            Self::Unknown => (0, 0),
            Self::Year(year) => (1, i64::from(*year)),
            Self::Interval(interval) => (1, *interval as i64),
            Self::Publisher(_) => (1, 0),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One aggregated group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: GroupKey,
    /// Sum of finite global sales, in millions
    pub sum: f64,
    /// Records that fell into this group, NaN sales included
    pub count: usize,
}

impl Bucket {
    pub fn label(&self) -> String {
        self.key.label()
    }
}

/// What one page asks of the aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSpec {
    pub group_by: GroupBy,
    pub filter: Option<YearRange>,
    pub order: BucketOrder,
    pub top_n: Option<usize>,
}

impl AggregationSpec {
    pub fn new(group_by: GroupBy) -> Self {
        Self {
            group_by,
            filter: None,
            order: BucketOrder::Natural,
            top_n: None,
        }
    }

    pub fn with_filter(mut self, filter: YearRange) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order(mut self, order: BucketOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    fn passes(&self, record: &SalesRecord) -> bool {
        self.filter.map_or(true, |range| range.contains(record.year))
    }
}

impl From<&PageConfig> for AggregationSpec {
    fn from(page: &PageConfig) -> Self {
        Self {
            group_by: page.group_by,
            filter: page.filter,
            order: page.order,
            top_n: page.top_n,
        }
    }
}

/// Ordered buckets plus the counters gathered on the way
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregationReport {
    pub buckets: Vec<Bucket>,
    /// Records handed to the aggregator
    pub considered: usize,
    /// Records that satisfied the filter
    pub passed: usize,
    /// Passing records whose sales were NaN and counted as zero
    pub nan_sales: usize,
}

impl AggregationReport {
    /// Sum over every bucket
    pub fn total(&self) -> f64 {
        self.buckets.iter().map(|b| b.sum).sum()
    }

    /// Bucket with the largest sum, first one on ties
    pub fn top_bucket(&self) -> Option<&Bucket> {
        self.buckets
            .iter()
            .fold(None, |best: Option<&Bucket>, bucket| match best {
                Some(best) if best.sum >= bucket.sum => Some(best),
                _ => Some(bucket),
            })
    }
}

/// Filter, group, sum, order then truncate.
///
/// Summation runs in record order, so repeated runs are bit-identical.
/// Truncation keeps the `top_n` largest sums in descending order whatever
/// the requested ordering.
#[instrument(skip(records), fields(records = records.len()))]
pub fn aggregate(records: &[SalesRecord], spec: &AggregationSpec) -> AggregationReport {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut passed = 0;
    let mut nan_sales = 0;

    for record in records.iter().filter(|r| spec.passes(r)) {
        passed += 1;
        if record.global_sales.is_nan() {
            nan_sales += 1;
        }

        let key = GroupKey::for_record(record, spec.group_by);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(Bucket { key, sum: 0.0, count: 0 });
                buckets.len() - 1
            }
        };
        buckets[slot].sum += record.finite_sales();
        buckets[slot].count += 1;
    }

    match spec.order {
        BucketOrder::Natural => {}
        BucketOrder::Chronological => buckets.sort_by_key(|b| b.key.chronological_rank()),
        BucketOrder::DescendingSum => sort_descending(&mut buckets),
    }

    if let Some(n) = spec.top_n {
        sort_descending(&mut buckets);
        buckets.truncate(n);
    }

    if nan_sales > 0 {
        warn!(nan_sales, "Records with unparseable sales counted as zero");
    }
    debug!(considered = records.len(), passed, buckets = buckets.len(), "Aggregated records");

    AggregationReport {
        buckets,
        considered: records.len(),
        passed,
        nan_sales,
    }
}

fn sort_descending(buckets: &mut [Bucket]) {
    buckets.sort_by(|a, b| b.sum.total_cmp(&a.sum));
}

/// The `n` best-ranked records within the filter, unranked records last
pub fn top_records_by_rank<'a>(
    records: &'a [SalesRecord],
    filter: Option<&YearRange>,
    n: usize,
) -> Vec<&'a SalesRecord> {
    let mut selected: Vec<&SalesRecord> = records
        .iter()
        .filter(|r| filter.map_or(true, |range| range.contains(r.year)))
        .collect();
    selected.sort_by_key(|r| (r.rank.is_none(), r.rank));
    selected.truncate(n);
    selected
}

/// Names of a publisher's `n` best-selling titles within the filter.
///
/// `publisher` is a bucket label, so `"Unknown"` selects the catch-all.
pub fn top_titles_for(
    records: &[SalesRecord],
    filter: Option<&YearRange>,
    publisher: &str,
    n: usize,
) -> Vec<String> {
    let mut titles: Vec<&SalesRecord> = records
        .iter()
        .filter(|r| filter.map_or(true, |range| range.contains(r.year)))
        .filter(|r| GroupKey::for_record(r, GroupBy::Publisher).label() == publisher)
        .collect();
    titles.sort_by(|a, b| {
        a.global_sales
            .is_nan()
            .cmp(&b.global_sales.is_nan())
            .then(b.finite_sales().total_cmp(&a.finite_sales()))
    });
    titles.into_iter().take(n).map(|r| r.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_records;
    use vgchart_common::test_utils::{assert_approx_eq, csv_from_rows, SAMPLE_VGSALES_CSV};

    fn records(rows: &[(&str, &str, &str, &str)]) -> Vec<SalesRecord> {
        parse_records(csv_from_rows(rows).as_bytes()).unwrap().records
    }

    fn pairs(report: &AggregationReport) -> Vec<(String, f64)> {
        report.buckets.iter().map(|b| (b.label(), b.sum)).collect()
    }

    #[test]
    fn test_interval_boundaries() {
        assert_eq!(Interval::from_year(1979), None);
        assert_eq!(Interval::from_year(1980), Some(Interval::Eighties));
        assert_eq!(Interval::from_year(1989), Some(Interval::Eighties));
        assert_eq!(Interval::from_year(1990), Some(Interval::Nineties));
        assert_eq!(Interval::from_year(2009), Some(Interval::Noughties));
        assert_eq!(Interval::from_year(2010), Some(Interval::TwentyTens));
        assert_eq!(Interval::from_year(2020), Some(Interval::TwentyTens));
    }

    #[test]
    fn test_sales_by_interval() {
        let data = records(&[
            ("A", "1985", "P", "1"),
            ("B", "1995", "P", "2"),
            ("C", "2005", "P", "3"),
            ("D", "2015", "P", "4"),
        ]);
        let spec = AggregationSpec::new(GroupBy::Interval).with_order(BucketOrder::Chronological);
        let report = aggregate(&data, &spec);

        assert_eq!(
            pairs(&report),
            vec![
                ("1980-1989".to_string(), 1.0),
                ("1990-1999".to_string(), 2.0),
                ("2000-2009".to_string(), 3.0),
                ("2010+".to_string(), 4.0),
            ]
        );
    }

    #[test]
    fn test_interval_order_independent_of_encounter() {
        let data = records(&[
            ("D", "2015", "P", "4"),
            ("X", "N/A", "P", "9"),
            ("A", "1985", "P", "1"),
            ("C", "2005", "P", "3"),
        ]);
        let spec = AggregationSpec::new(GroupBy::Interval).with_order(BucketOrder::Chronological);
        let labels: Vec<_> = aggregate(&data, &spec).buckets.iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["Unknown", "1980-1989", "2000-2009", "2010+"]);
    }

    #[test]
    fn test_interval_catch_all_leads_chronological_order() {
        let data = records(&[("a", "2015", "P", "1"), ("b", "N/A", "P", "1"), ("c", "1985", "P", "1")]);
        let spec = AggregationSpec::new(GroupBy::Interval).with_order(BucketOrder::Chronological);
        let labels: Vec<_> = aggregate(&data, &spec).buckets.iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["Unknown", "1980-1989", "2010+"]);
    }

    #[test]
    fn test_top_publisher_truncation() {
        let data = records(&[("x", "2011", "A", "5"), ("y", "2012", "B", "1"), ("z", "2013", "A", "2")]);
        let spec = AggregationSpec::new(GroupBy::Publisher).with_top_n(1);
        let report = aggregate(&data, &spec);
        assert_eq!(pairs(&report), vec![("A".to_string(), 7.0)]);
    }

    #[test]
    fn test_truncation_ties_keep_encounter_order() {
        let data = records(&[
            ("x", "2011", "B", "2"),
            ("y", "2012", "A", "2"),
            ("z", "2013", "C", "3"),
        ]);
        let spec = AggregationSpec::new(GroupBy::Publisher).with_top_n(2);
        let labels: Vec<_> = aggregate(&data, &spec).buckets.iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["C", "B"]);
    }

    #[test]
    fn test_filter_applies_before_grouping() {
        let data = parse_records(SAMPLE_VGSALES_CSV.as_bytes()).unwrap().records;
        let spec = AggregationSpec::new(GroupBy::Publisher).with_filter(YearRange::between(1980, 1989));
        let report = aggregate(&data, &spec);

        assert_eq!(report.considered, 11);
        assert_eq!(report.passed, 4);
        let sums: HashMap<_, _> = pairs(&report).into_iter().collect();
        assert_approx_eq(sums["Nintendo"], 40.24 + 30.26, 1e-9);
        assert_approx_eq(sums["Atari"], 7.81, 1e-9);
        assert_approx_eq(sums["Activision"], 4.5, 1e-9);
    }

    #[test]
    fn test_missing_year_only_in_unbounded_pages() {
        let data = parse_records(SAMPLE_VGSALES_CSV.as_bytes()).unwrap().records;

        let all = aggregate(&data, &AggregationSpec::new(GroupBy::Year));
        let unknown = all.buckets.iter().find(|b| b.key == GroupKey::Unknown).unwrap();
        assert_approx_eq(unknown.sum, 5.23, 1e-9);

        let modern = aggregate(
            &data,
            &AggregationSpec::new(GroupBy::Year).with_filter(YearRange::from_year(2010)),
        );
        assert!(modern.buckets.iter().all(|b| b.key != GroupKey::Unknown));
    }

    #[test]
    fn test_nan_sales_contribute_zero() {
        let data = records(&[("x", "2011", "A", "n/a"), ("y", "2011", "A", "1.5")]);
        let report = aggregate(&data, &AggregationSpec::new(GroupBy::Publisher));

        assert_eq!(report.nan_sales, 1);
        assert_eq!(report.buckets.len(), 1);
        assert_eq!(report.buckets[0].count, 2);
        assert_approx_eq(report.buckets[0].sum, 1.5, 1e-12);
    }

    #[test]
    fn test_empty_and_unknown_publishers_share_bucket() {
        let data = records(&[("x", "2011", "", "1"), ("y", "2011", "Unknown", "2"), ("z", "2011", "N/A", "4")]);
        let report = aggregate(&data, &AggregationSpec::new(GroupBy::Publisher));
        assert_eq!(
            pairs(&report),
            vec![("Unknown".to_string(), 3.0), ("N/A".to_string(), 4.0)]
        );
    }

    #[test]
    fn test_chronological_years_unknown_first() {
        let data = records(&[("a", "2001", "P", "1"), ("b", "N/A", "P", "1"), ("c", "1999", "P", "1")]);
        let spec = AggregationSpec::new(GroupBy::Year).with_order(BucketOrder::Chronological);
        let labels: Vec<_> = aggregate(&data, &spec).buckets.iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["Unknown", "1999", "2001"]);
    }

    #[test]
    fn test_empty_filter_result() {
        let data = records(&[("a", "2001", "P", "1")]);
        let spec = AggregationSpec::new(GroupBy::Publisher).with_filter(YearRange::between(1980, 1989));
        let report = aggregate(&data, &spec);
        assert!(report.buckets.is_empty());
        assert_eq!(report.total(), 0.0);
        assert!(report.top_bucket().is_none());
    }

    #[test]
    fn test_spec_from_page_config() {
        let page = &vgchart_config::default_pages()[2];
        let spec = AggregationSpec::from(page);
        assert_eq!(spec.group_by, GroupBy::Publisher);
        assert_eq!(spec.top_n, Some(10));
        assert_eq!(spec.filter, Some(YearRange::between(1980, 1989)));
    }

    #[test]
    fn test_top_records_by_rank() {
        let data = parse_records(SAMPLE_VGSALES_CSV.as_bytes()).unwrap().records;
        let range = YearRange::between(1980, 1989);
        let top: Vec<_> = top_records_by_rank(&data, Some(&range), 3)
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(top, vec!["Super Mario Bros.", "Tetris", "Pac-Man"]);
    }

    #[test]
    fn test_top_titles_for_publisher() {
        let data = parse_records(SAMPLE_VGSALES_CSV.as_bytes()).unwrap().records;
        let titles = top_titles_for(&data, None, "Nintendo", 3);
        assert_eq!(titles, vec!["Wii Sports", "Super Mario Bros.", "Mario Kart Wii"]);

        let range = YearRange::between(1980, 1989);
        let titles = top_titles_for(&data, Some(&range), "Nintendo", 3);
        assert_eq!(titles, vec!["Super Mario Bros.", "Tetris"]);
    }

    #[test]
    fn test_top_titles_nan_last() {
        let data = records(&[("broken", "2011", "A", "n/a"), ("fine", "2011", "A", "0.1")]);
        assert_eq!(top_titles_for(&data, None, "A", 3), vec!["fine", "broken"]);
    }
}
