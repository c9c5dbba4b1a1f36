//! Static HTML documents wrapping the rendered charts

use crate::context::escape_html;
use crate::record::SalesRecord;
use std::fmt::Write;

/// Entry of the navigation footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    pub file: String,
}

/// Column headers of the top-games table
pub const TABLE_COLUMNS: [&str; 7] = ["Rank", "Name", "Publisher", "Platform", "Year", "Genre", "Global Sales"];

fn cell_or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// `<table id="top-games-table">` with one row per record
pub fn top_games_table(records: &[&SalesRecord]) -> String {
    let mut html = String::from("<table id=\"top-games-table\">\n<thead><tr>");
    for column in TABLE_COLUMNS {
        let _ = write!(html, "<th>{column}</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for record in records {
        let sales = if record.global_sales.is_nan() {
            "N/A".to_string()
        } else {
            format!("{:.2}", record.global_sales)
        };
        let cells = [
            cell_or_na(record.rank),
            record.name.clone(),
            record.publisher.clone(),
            record.platform.clone(),
            cell_or_na(record.year),
            record.genre.clone(),
            sales,
        ];

        html.push_str("<tr>");
        for cell in cells {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

fn nav_footer(nav: &[NavLink], current: &str) -> String {
    let mut html = String::from("<nav class=\"site-nav\">\n<ul>\n");
    for link in nav {
        if link.file == current {
            let _ = writeln!(
                html,
                "<li class=\"current\">{}</li>",
                escape_html(&link.title)
            );
        } else {
            let _ = writeln!(
                html,
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&link.file),
                escape_html(&link.title)
            );
        }
    }
    html.push_str("</ul>\n</nav>\n");
    html
}

/// Parts of one generated page
#[derive(Debug, Clone, Copy)]
pub struct PageDocument<'a> {
    pub title: &'a str,
    pub file: &'a str,
    pub svg: &'a str,
    pub table: Option<&'a [&'a SalesRecord]>,
    pub nav: &'a [NavLink],
}

impl PageDocument<'_> {
    pub fn render(&self) -> String {
        let title = escape_html(self.title);
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{title}</title>");
        html.push_str(
            "<style>\n\
             body { font-family: sans-serif; margin: 2em; }\n\
             #top-games-table { border-collapse: collapse; margin-top: 1em; }\n\
             #top-games-table th, #top-games-table td { border: 1px solid #ccc; padding: 4px 8px; }\n\
             .site-nav ul { list-style: none; padding: 0; }\n\
             .site-nav li { display: inline; margin-right: 1em; }\n\
             </style>\n",
        );
        html.push_str("</head>\n<body>\n");
        let _ = writeln!(html, "<h1>{title}</h1>");
        html.push_str("<div id=\"chart\">");
        html.push_str(self.svg);
        html.push_str("</div>\n");

        if let Some(records) = self.table {
            html.push_str("<h2>Top Games</h2>\n");
            html.push_str(&top_games_table(records));
        }

        if !self.nav.is_empty() {
            html.push_str("<footer>\n");
            html.push_str(&nav_footer(self.nav, self.file));
            html.push_str("</footer>\n");
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_records;
    use vgchart_common::test_utils::SAMPLE_VGSALES_CSV;

    fn nav() -> Vec<NavLink> {
        vec![
            NavLink {
                title: "By Year".into(),
                file: "sales_by_year.html".into(),
            },
            NavLink {
                title: "By Decade".into(),
                file: "sales_by_interval.html".into(),
            },
        ]
    }

    #[test]
    fn test_document_structure() {
        let links = nav();
        let doc = PageDocument {
            title: "Sales & Trends",
            file: "sales_by_year.html",
            svg: "<svg></svg>",
            table: None,
            nav: &links,
        };
        let html = doc.render();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Sales &amp; Trends</title>"));
        assert!(html.contains("<div id=\"chart\"><svg></svg></div>"));
        assert!(!html.contains("top-games-table\">"));
        assert!(html.contains("<li class=\"current\">By Year</li>"));
        assert!(html.contains("<a href=\"sales_by_interval.html\">By Decade</a>"));
    }

    #[test]
    fn test_top_games_table_rows() {
        let dataset = parse_records(SAMPLE_VGSALES_CSV.as_bytes()).unwrap();
        let rows: Vec<&SalesRecord> = dataset
            .records
            .iter()
            .filter(|r| r.name == "Tetris" || r.name == "Madden NFL 2004")
            .collect();
        let html = top_games_table(&rows);

        assert!(html.contains("<th>Global Sales</th>"));
        assert!(html.contains(
            "<tr><td>6</td><td>Tetris</td><td>Nintendo</td><td>GB</td><td>1989</td><td>Puzzle</td><td>30.26</td></tr>"
        ));
        assert!(html.contains("<td>N/A</td><td>Sports</td><td>5.23</td>"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn test_table_escapes_names() {
        let dataset = parse_records(
            "Rank,Name,Platform,Year,Genre,Publisher,Global_Sales\n1,<b>Evil</b>,PC,2001,Misc,A&B,1\n".as_bytes(),
        )
        .unwrap();
        let rows: Vec<&SalesRecord> = dataset.records.iter().collect();
        let html = top_games_table(&rows);
        assert!(html.contains("<td>&lt;b&gt;Evil&lt;/b&gt;</td>"));
        assert!(html.contains("<td>A&amp;B</td>"));
    }
}
