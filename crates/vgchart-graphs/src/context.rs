//! SVG element tree and the per-page drawing surface

use vgchart_config::{LayoutConfig, MarginConfig, StyleConfig};

/// Escape text for HTML and SVG content and attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Format a coordinate with at most three decimals
pub fn px(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// A node in the generated SVG tree
#[derive(Debug, Clone, PartialEq)]
pub struct SvgElement {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<SvgElement>,
}

impl SvgElement {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &'static str, value: impl ToString) -> Self {
        self.attrs.push((key, value.to_string()));
        self
    }

    /// Numeric attribute written with [`px`]
    pub fn num(self, key: &'static str, value: f64) -> Self {
        self.attr(key, px(value))
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: SvgElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: SvgElement) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[SvgElement] {
        &self.children
    }

    /// Depth-first search for elements with `name`
    pub fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a SvgElement>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.find_all(name, out);
        }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }

        if self.text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_html(text));
        }
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(self.name);
        out.push('>');
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

/// Drawing surface of one chart.
///
/// Marks are drawn in plot coordinates: the origin is the top-left corner
/// of the area inside the margins.
#[derive(Debug, Clone)]
pub struct RenderContext {
    width: u32,
    height: u32,
    margin: MarginConfig,
    style: StyleConfig,
    css: Vec<String>,
    plot: SvgElement,
}

impl RenderContext {
    pub fn new(layout: &LayoutConfig, style: &StyleConfig) -> Self {
        let margin = layout.margin;
        let plot = SvgElement::new("g").attr(
            "transform",
            format!("translate({},{})", margin.left, margin.top),
        );

        Self {
            width: layout.width,
            height: layout.height,
            margin,
            style: style.clone(),
            css: vec![format!(
                "text {{ font-family: {}; font-size: {}px; }}",
                style.font_family, style.font_size
            )],
            plot,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn margin(&self) -> MarginConfig {
        self.margin
    }

    /// Width available to marks
    pub fn inner_width(&self) -> f64 {
        f64::from(self.width.saturating_sub(self.margin.left + self.margin.right))
    }

    /// Height available to marks
    pub fn inner_height(&self) -> f64 {
        f64::from(self.height.saturating_sub(self.margin.top + self.margin.bottom))
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn add_css(&mut self, rule: impl Into<String>) {
        self.css.push(rule.into());
    }

    pub fn draw(&mut self, element: SvgElement) {
        self.plot.push(element);
    }

    /// Elements drawn so far
    pub fn plot(&self) -> &SvgElement {
        &self.plot
    }

    /// Serialize the surface as a standalone `<svg>` element
    pub fn finish(self) -> String {
        let css = self.css.join("\n");
        let svg = SvgElement::new("svg")
            .attr("xmlns", "http://www.w3.org/2000/svg")
            .attr("width", self.width)
            .attr("height", self.height)
            .attr("viewBox", format!("0 0 {} {}", self.width, self.height))
            .child(SvgElement::new("style").text(css))
            .child(
                SvgElement::new("rect")
                    .attr("class", "background")
                    .attr("width", self.width)
                    .attr("height", self.height)
                    .attr("fill", &self.style.background_color),
            )
            .child(self.plot);
        svg.render()
    }
}
