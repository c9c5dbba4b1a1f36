//! CSV loading and numeric coercion

use crate::record::{Dataset, LoadStats, SalesRecord};
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use std::borrow::Cow;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use vgchart_common::{Result, VgError};

const REQUIRED_COLUMNS: [&str; 4] = ["Year", "Global_Sales", "Publisher", "Name"];

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct Columns {
    rank: Option<usize>,
    name: usize,
    platform: Option<usize>,
    year: usize,
    genre: Option<usize>,
    publisher: usize,
    na_sales: Option<usize>,
    eu_sales: Option<usize>,
    jp_sales: Option<usize>,
    other_sales: Option<usize>,
    global_sales: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| find(column).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(VgError::data(format!(
                "Dataset is missing required columns: {}",
                missing.join(", ")
            )));
        }

        // Required columns are present past this point
        let required = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            rank: find("Rank"),
            name: required("Name"),
            platform: find("Platform"),
            year: required("Year"),
            genre: find("Genre"),
            publisher: required("Publisher"),
            na_sales: find("NA_Sales"),
            eu_sales: find("EU_Sales"),
            jp_sales: find("JP_Sales"),
            other_sales: find("Other_Sales"),
            global_sales: required("Global_Sales"),
        })
    }
}

// Invalid UTF-8 is replaced with U+FFFD and counted in `lossy`
fn text(row: &ByteRecord, index: Option<usize>, lossy: &mut usize) -> String {
    let Some(bytes) = index.and_then(|i| row.get(i)) else {
        return String::new();
    };
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            *lossy += 1;
            text
        }
    }
}

/// Parse a release year, accepting integral floats such as `2006.0`
pub fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= f64::from(i32::MAX) {
        Some(value as i32)
    } else {
        None
    }
}

/// Parse global sales in millions; any failure yields NaN
pub fn parse_sales(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => f64::NAN,
    }
}

/// Parse a sales rank
pub fn parse_rank(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Parse every row of a CSV document.
///
/// A structurally broken row fails the whole resource. Unparseable numbers
/// and text that is not valid UTF-8 never do; they are counted in
/// [`LoadStats`] instead.
pub fn parse_records<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::resolve(csv_reader.headers()?)?;
    let mut stats = LoadStats::default();
    let mut records = Vec::new();

    let mut lossy = 0;
    for row in csv_reader.byte_records() {
        let row = row?;
        stats.rows += 1;

        let year = parse_year(&text(&row, Some(columns.year), &mut lossy));
        if year.is_none() {
            stats.invalid_years += 1;
        }
        let global_sales = parse_sales(&text(&row, Some(columns.global_sales), &mut lossy));
        if global_sales.is_nan() {
            stats.invalid_sales += 1;
        }
        let rank = columns
            .rank
            .and_then(|i| parse_rank(&text(&row, Some(i), &mut lossy)));

        records.push(SalesRecord {
            rank,
            name: text(&row, Some(columns.name), &mut lossy),
            platform: text(&row, columns.platform, &mut lossy),
            year,
            genre: text(&row, columns.genre, &mut lossy),
            publisher: text(&row, Some(columns.publisher), &mut lossy),
            na_sales: text(&row, columns.na_sales, &mut lossy),
            eu_sales: text(&row, columns.eu_sales, &mut lossy),
            jp_sales: text(&row, columns.jp_sales, &mut lossy),
            other_sales: text(&row, columns.other_sales, &mut lossy),
            global_sales,
        });
    }
    stats.lossy_text = lossy;

    debug!(rows = stats.rows, "Parsed dataset rows");
    Ok(Dataset::new(records, stats))
}

/// Read and parse the dataset at `path`
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        VgError::data_with_source(format!("Failed to read dataset {}", path.display()), e)
    })?;

    let dataset = parse_records(bytes.as_slice())?;
    let stats = dataset.stats;

    info!(
        rows = stats.rows,
        invalid_years = stats.invalid_years,
        invalid_sales = stats.invalid_sales,
        lossy_text = stats.lossy_text,
        "Loaded dataset"
    );
    if stats.invalid_years > 0 || stats.invalid_sales > 0 || stats.lossy_text > 0 {
        warn!(
            invalid_years = stats.invalid_years,
            invalid_sales = stats.invalid_sales,
            lossy_text = stats.lossy_text,
            "Some dataset cells could not be coerced and were replaced"
        );
    }

    Ok(dataset)
}
