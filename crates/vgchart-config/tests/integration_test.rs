//! Integration tests for vgchart-config crate.

use std::io::Write;
use validator::Validate;
use vgchart_config::{ChartKind, Config, ConfigLoader, GroupBy, HoverMode, YearRange};

#[test]
fn test_default_config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_full_site_definition_from_yaml() {
    let yaml = r##"
data:
  path: vgsales.csv
style:
  bar_color: "#4682b4"
  hover_color: purple
pages:
  - name: yearly
    file: yearly.html
    title: Sales by Year
    chart: line
    group_by: year
    order: chronological
  - name: decades
    file: decades.html
    title: Sales by Decade
    group_by: interval
    order: chronological
    hover: linked
    links:
      "2010+": modern.html
  - name: modern
    file: modern.html
    title: Modern Publishers
    group_by: publisher
    filter:
      start: 2010
    top_n: 10
    tooltip: true
    hover: all
    layout:
      width: 900
      height: 700
      margin: { top: 20, right: 200, bottom: 120, left: 70 }
"##;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let config = ConfigLoader::load_config(file.path()).unwrap();
    assert_eq!(config.pages.len(), 3);
    assert_eq!(config.pages[0].chart, ChartKind::Line);
    assert_eq!(config.pages[1].hover, HoverMode::Linked);
    assert_eq!(config.pages[1].links.get("2010+").map(String::as_str), Some("modern.html"));
    assert_eq!(config.pages[2].group_by, GroupBy::Publisher);
    assert_eq!(config.pages[2].filter, Some(YearRange::from_year(2010)));
    assert_eq!(config.pages[2].layout.margin.right, 200);
}

#[test]
fn test_link_to_outside_page_rejected() {
    let mut config = Config::default();
    config.pages[1]
        .links
        .insert("1990-1999".to_string(), "https://example.com/".to_string());

    let errors = config.validate_all().unwrap_err();
    assert!(errors.field_errors().contains_key("links"));
}
