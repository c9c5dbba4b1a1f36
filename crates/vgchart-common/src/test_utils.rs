//! Test utilities and shared test helpers for vgchart.
//!
//! Provides logging initialisation, float comparison and CSV fixtures that
//! the other workspace crates use in unit and integration tests.

use std::io::Write;
use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Header row of the vgsales dataset.
pub const VGSALES_HEADER: &str =
    "Rank,Name,Platform,Year,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales";

/// A small, realistic slice of the dataset, including an `N/A` year and a
/// malformed sales cell.
pub const SAMPLE_VGSALES_CSV: &str = "\
Rank,Name,Platform,Year,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales
1,Wii Sports,Wii,2006,Sports,Nintendo,41.49,29.02,3.77,8.46,82.74
2,Super Mario Bros.,NES,1985,Platform,Nintendo,29.08,3.58,6.81,0.77,40.24
3,Mario Kart Wii,Wii,2008,Racing,Nintendo,15.85,12.88,3.79,3.31,35.82
5,Pokemon Red/Pokemon Blue,GB,1996,Role-Playing,Nintendo,11.27,8.89,10.22,1,31.37
6,Tetris,GB,1989,Puzzle,Nintendo,23.2,2.26,4.22,0.58,30.26
17,Grand Theft Auto V,PS3,2013,Action,Take-Two Interactive,7.01,9.27,0.97,4.14,21.4
90,Pac-Man,2600,1982,Puzzle,Atari,7.28,0.45,0,0.08,7.81
180,Madden NFL 2004,PS2,N/A,Sports,Electronic Arts,4.26,0.26,0.01,0.71,5.23
240,Pitfall!,2600,1981,Platform,Activision,4.21,0.24,0,0.05,4.5
377,FIFA Soccer 13,PS3,2012,Sports,Electronic Arts,1.06,5.01,0.13,1.97,8.17
9999,Broken Sales Row,PC,2011,Misc,Unknown Studio,0,0,0,0,n/a
";

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Build a CSV document with the dataset header from `(name, year, publisher, sales)` rows.
///
/// Ranks are assigned in row order starting at 1; regional sales are zero.
pub fn csv_from_rows(rows: &[(&str, &str, &str, &str)]) -> String {
    let mut out = String::from(VGSALES_HEADER);
    out.push('\n');
    for (i, (name, year, publisher, sales)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{},{},PC,{},Misc,{},0,0,0,0,{}\n",
            i + 1,
            name,
            year,
            publisher,
            sales
        ));
    }
    out
}

/// Write CSV content to a temporary file that is removed when dropped.
pub fn write_csv_fixture(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("vgsales")
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temporary CSV file");
    file.write_all(content.as_bytes())
        .expect("Failed to write CSV fixture");
    file.flush().expect("Failed to flush CSV fixture");
    file
}

/// Create a temporary directory for tests that automatically cleans up.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}
