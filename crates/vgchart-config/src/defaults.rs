//! Default values, including the four pages of the standard site.

use crate::settings::*;
use std::collections::BTreeMap;

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            output: OutputConfig::default(),
            style: StyleConfig::default(),
            logging: LoggingConfig::default(),
            pages: default_pages(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: "vgsales.csv".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "site".to_string(),
            snapshots: false,
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            bar_color: "steelblue".to_string(),
            hover_color: "purple".to_string(),
            line_color: "steelblue".to_string(),
            line_width: 1.5,
            background_color: "#FFFFFF".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 12,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
            pretty: false,
        }
    }
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            top: 20,
            right: 30,
            bottom: 40,
            left: 50,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: MarginConfig::default(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            name: "page".to_string(),
            enabled: true,
            file: "page.html".to_string(),
            title: "Global Sales".to_string(),
            chart: ChartKind::Bar,
            group_by: GroupBy::Publisher,
            filter: None,
            order: BucketOrder::Natural,
            top_n: None,
            hover: HoverMode::None,
            tooltip: false,
            links: BTreeMap::new(),
            annotate_top: false,
            top_games_table: None,
            nice_y: false,
            rotate_labels: false,
            x_title: None,
            y_title: None,
            layout: LayoutConfig::default(),
        }
    }
}

/// The standard site: sales by year, by interval, and the two decade
/// publisher breakdowns the interval chart links to.
pub fn default_pages() -> Vec<PageConfig> {
    let mut interval_links = BTreeMap::new();
    interval_links.insert("1980-1989".to_string(), "publishers_1980.html".to_string());
    interval_links.insert("2010+".to_string(), "publishers_2010.html".to_string());

    vec![
        PageConfig {
            name: "sales_by_year".to_string(),
            file: "sales_by_year.html".to_string(),
            title: "Global Video Game Sales by Year".to_string(),
            chart: ChartKind::Line,
            group_by: GroupBy::Year,
            order: BucketOrder::Chronological,
            ..PageConfig::default()
        },
        PageConfig {
            name: "sales_by_interval".to_string(),
            file: "sales_by_interval.html".to_string(),
            title: "Global Video Game Sales by Decade".to_string(),
            chart: ChartKind::Bar,
            group_by: GroupBy::Interval,
            order: BucketOrder::Chronological,
            hover: HoverMode::Linked,
            links: interval_links,
            ..PageConfig::default()
        },
        PageConfig {
            name: "publishers_1980".to_string(),
            file: "publishers_1980.html".to_string(),
            title: "Top Publishers 1980-1989".to_string(),
            group_by: GroupBy::Publisher,
            filter: Some(YearRange::between(1980, 1989)),
            top_n: Some(10),
            hover: HoverMode::All,
            tooltip: true,
            annotate_top: true,
            top_games_table: Some(10),
            nice_y: true,
            rotate_labels: true,
            x_title: Some("Publisher".to_string()),
            y_title: Some("Total Global Sales (millions)".to_string()),
            layout: LayoutConfig {
                width: 800,
                height: 800,
                margin: MarginConfig {
                    top: 20,
                    right: 200,
                    bottom: 120,
                    left: 70,
                },
            },
            ..PageConfig::default()
        },
        PageConfig {
            name: "publishers_2010".to_string(),
            file: "publishers_2010.html".to_string(),
            title: "Top Publishers 2010 and Later".to_string(),
            group_by: GroupBy::Publisher,
            filter: Some(YearRange::from_year(2010)),
            top_n: Some(10),
            rotate_labels: true,
            ..PageConfig::default()
        },
    ]
}
