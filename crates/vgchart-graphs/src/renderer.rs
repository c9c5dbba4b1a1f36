//! SVG chart renderers

use crate::aggregator::{AggregationReport, Bucket};
use crate::context::{px, RenderContext, SvgElement};
use crate::scale::{BandScale, LinearScale};
use tracing::debug;
use vgchart_common::Result;
use vgchart_config::{ChartKind, HoverMode, PageConfig};

/// Padding between and around bars, as a fraction of the band step
pub const BAND_PADDING: f64 = 0.1;

/// Tick count hint for value axes
pub const TICK_COUNT: usize = 10;

const TICK_SIZE: f64 = 6.0;

/// Label shown while hovering a bar
pub fn tooltip_text(label: &str, value: f64) -> String {
    format!("{label}: {value:.2}M")
}

/// Best-selling titles of the largest bucket
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub label: String,
    pub sum: f64,
    pub titles: Vec<String>,
}

impl Annotation {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Publisher: {}", self.label),
            format!("Sales: {:.2}M", self.sum),
            "Top Games:".to_string(),
        ];
        lines.extend(self.titles.iter().cloned());
        lines
    }
}

/// Everything a renderer needs for one page
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    pub page: &'a PageConfig,
    pub report: &'a AggregationReport,
    pub annotation: Option<&'a Annotation>,
}

/// Draws one chart kind into a [`RenderContext`]
pub trait ChartRenderer: Send + Sync {
    fn kind(&self) -> ChartKind;

    fn render(&self, ctx: &mut RenderContext, input: &ChartInput<'_>) -> Result<()>;
}

/// Renderer for a chart kind
pub fn renderer_for(kind: ChartKind) -> Box<dyn ChartRenderer> {
    match kind {
        ChartKind::Bar => Box::new(BarChartRenderer),
        ChartKind::Line => Box::new(LineChartRenderer),
    }
}

fn value_scale(buckets: &[Bucket], height: f64, nice: bool) -> LinearScale {
    let max = buckets.iter().map(|b| b.sum).fold(0.0, f64::max);
    // An empty or all-zero aggregate still gets a drawable axis
    let upper = if max > 0.0 { max } else { 1.0 };
    let scale = LinearScale::new((0.0, upper), (height, 0.0));
    if nice {
        scale.nice(TICK_COUNT)
    } else {
        scale
    }
}

fn domain_path(d: String) -> SvgElement {
    SvgElement::new("path")
        .attr("class", "domain")
        .attr("fill", "none")
        .attr("stroke", "currentColor")
        .attr("d", d)
}

fn band_axis_bottom(x: &BandScale, width: f64, height: f64, rotate: bool) -> SvgElement {
    let mut axis = SvgElement::new("g")
        .attr("class", "axis axis-x")
        .attr("transform", format!("translate(0,{})", px(height)))
        .child(domain_path(format!("M0,{TICK_SIZE}V0H{}V{TICK_SIZE}", px(width))));

    for label in x.domain() {
        let Some(center) = x.center(label) else { continue };
        let mut text = SvgElement::new("text")
            .attr("fill", "currentColor")
            .num("y", TICK_SIZE + 3.0)
            .attr("dy", "0.71em");
        text = if rotate {
            text.attr("transform", "rotate(-45)").attr("text-anchor", "end")
        } else {
            text.attr("text-anchor", "middle")
        };

        axis.push(
            SvgElement::new("g")
                .attr("class", "tick")
                .attr("transform", format!("translate({},0)", px(center)))
                .child(SvgElement::new("line").attr("stroke", "currentColor").num("y2", TICK_SIZE))
                .child(text.text(label.clone())),
        );
    }
    axis
}

fn linear_axis_bottom(x: &LinearScale, width: f64, height: f64) -> SvgElement {
    let mut axis = SvgElement::new("g")
        .attr("class", "axis axis-x")
        .attr("transform", format!("translate(0,{})", px(height)))
        .child(domain_path(format!("M0,{TICK_SIZE}V0H{}V{TICK_SIZE}", px(width))));

    // Years print as integers; fractional ticks would repeat a label
    for tick in x.ticks(TICK_COUNT).into_iter().filter(|t| t.fract() == 0.0) {
        axis.push(
            SvgElement::new("g")
                .attr("class", "tick")
                .attr("transform", format!("translate({},0)", px(x.scale(tick))))
                .child(SvgElement::new("line").attr("stroke", "currentColor").num("y2", TICK_SIZE))
                .child(
                    SvgElement::new("text")
                        .attr("fill", "currentColor")
                        .num("y", TICK_SIZE + 3.0)
                        .attr("dy", "0.71em")
                        .attr("text-anchor", "middle")
                        .text(format!("{tick:.0}")),
                ),
        );
    }
    axis
}

fn linear_axis_left(y: &LinearScale) -> SvgElement {
    let (r0, r1) = y.range();
    let mut axis = SvgElement::new("g")
        .attr("class", "axis axis-y")
        .child(domain_path(format!(
            "M-{TICK_SIZE},{}H0V{}H-{TICK_SIZE}",
            px(r0),
            px(r1)
        )));

    let precision = y.tick_precision(TICK_COUNT);
    for tick in y.ticks(TICK_COUNT) {
        axis.push(
            SvgElement::new("g")
                .attr("class", "tick")
                .attr("transform", format!("translate(0,{})", px(y.scale(tick))))
                .child(SvgElement::new("line").attr("stroke", "currentColor").num("x2", -TICK_SIZE))
                .child(
                    SvgElement::new("text")
                        .attr("fill", "currentColor")
                        .num("x", -(TICK_SIZE + 3.0))
                        .attr("dy", "0.32em")
                        .attr("text-anchor", "end")
                        .text(LinearScale::format_tick(tick, precision)),
                ),
        );
    }
    axis
}

fn axis_titles(ctx: &mut RenderContext, page: &PageConfig) {
    let (width, height) = (ctx.inner_width(), ctx.inner_height());
    let margin = ctx.margin();

    if let Some(title) = &page.x_title {
        ctx.draw(
            SvgElement::new("text")
                .attr("class", "axis-title")
                .num("x", width / 2.0)
                .num("y", height + f64::from(margin.bottom) - 10.0)
                .attr("text-anchor", "middle")
                .attr("font-size", "16px")
                .text(title.clone()),
        );
    }
    if let Some(title) = &page.y_title {
        ctx.draw(
            SvgElement::new("text")
                .attr("class", "axis-title")
                .num("x", -height / 2.0)
                .num("y", -f64::from(margin.left) / 2.0)
                .attr("text-anchor", "middle")
                .attr("transform", "rotate(-90)")
                .attr("font-size", "16px")
                .text(title.clone()),
        );
    }
}

/// One rectangle per bucket on a band scale
#[derive(Debug, Default, Clone, Copy)]
pub struct BarChartRenderer;

impl BarChartRenderer {
    fn annotation(
        ctx: &RenderContext,
        x: &BandScale,
        y: &LinearScale,
        annotation: &Annotation,
    ) -> Option<SvgElement> {
        let center = x.center(&annotation.label)?;
        let top = y.scale(annotation.sum);
        let ax = (ctx.inner_width() - 200.0).min(center + 50.0);
        let ay = (top - 30.0).max(30.0);

        let mut group = SvgElement::new("g").attr("class", "annotation").child(
            SvgElement::new("line")
                .num("x1", center)
                .num("y1", top)
                .num("x2", ax - 10.0)
                .num("y2", ay + 10.0)
                .attr("stroke", "black"),
        );

        for (i, line) in annotation.lines().into_iter().enumerate() {
            group.push(
                SvgElement::new("text")
                    .num("x", ax)
                    .num("y", ay + 15.0 * i as f64)
                    .attr("font-size", "12px")
                    .attr("alignment-baseline", "middle")
                    .text(line),
            );
        }
        Some(group)
    }
}

impl ChartRenderer for BarChartRenderer {
    fn kind(&self) -> ChartKind {
        ChartKind::Bar
    }

    fn render(&self, ctx: &mut RenderContext, input: &ChartInput<'_>) -> Result<()> {
        let page = input.page;
        let buckets = &input.report.buckets;
        let (width, height) = (ctx.inner_width(), ctx.inner_height());

        let labels: Vec<String> = buckets.iter().map(Bucket::label).collect();
        let x = BandScale::new(labels, (0.0, width), BAND_PADDING);
        let y = value_scale(buckets, height, page.nice_y);

        let style = ctx.style().clone();
        ctx.add_css(format!(".bar {{ fill: {}; }}", style.bar_color));
        ctx.add_css(format!(".mark.interactive:hover .bar {{ fill: {}; }}", style.hover_color));
        ctx.add_css(".mark .tooltip { visibility: hidden; pointer-events: none; font-size: 12px; }");
        ctx.add_css(".mark:hover .tooltip { visibility: visible; }");
        ctx.add_css(".mark.linked { cursor: pointer; }");

        ctx.draw(band_axis_bottom(&x, width, height, page.rotate_labels));
        ctx.draw(linear_axis_left(&y));
        axis_titles(ctx, page);

        let mut marks = SvgElement::new("g").attr("class", "marks");
        for bucket in buckets {
            let label = bucket.label();
            let Some(left) = x.position(&label) else { continue };
            let top = y.scale(bucket.sum);
            let link = page.links.get(&label);
            let interactive = match page.hover {
                HoverMode::None => false,
                HoverMode::All => true,
                HoverMode::Linked => link.is_some(),
            };

            let mut class = String::from("mark");
            if interactive {
                class.push_str(" interactive");
            }
            if link.is_some() {
                class.push_str(" linked");
            }

            let rect = SvgElement::new("rect")
                .attr("class", "bar")
                .num("x", left)
                .num("y", top)
                .num("width", x.bandwidth())
                .num("height", (height - top).max(0.0));

            let mut content = vec![rect];
            if page.tooltip {
                content.push(
                    SvgElement::new("text")
                        .attr("class", "tooltip")
                        .num("x", left + x.bandwidth() / 2.0)
                        .num("y", top - 10.0)
                        .attr("text-anchor", "middle")
                        .text(tooltip_text(&label, bucket.sum)),
                );
            }

            let mut mark = SvgElement::new("g")
                .attr("class", class)
                .attr("data-label", &label)
                .attr("data-value", format!("{:.2}", bucket.sum));
            match link {
                Some(href) => {
                    let mut anchor = SvgElement::new("a").attr("href", href);
                    for element in content {
                        anchor.push(element);
                    }
                    mark.push(anchor);
                }
                None => {
                    for element in content {
                        mark.push(element);
                    }
                }
            }
            marks.push(mark);
        }
        ctx.draw(marks);

        if page.annotate_top {
            if let Some(annotation) = input.annotation {
                if let Some(element) = Self::annotation(ctx, &x, &y, annotation) {
                    ctx.draw(element);
                }
            }
        }

        debug!(page = %page.name, bars = buckets.len(), "Rendered bar chart");
        Ok(())
    }
}

/// One connected path over year buckets on a linear scale
#[derive(Debug, Default, Clone, Copy)]
pub struct LineChartRenderer;

impl ChartRenderer for LineChartRenderer {
    fn kind(&self) -> ChartKind {
        ChartKind::Line
    }

    fn render(&self, ctx: &mut RenderContext, input: &ChartInput<'_>) -> Result<()> {
        let page = input.page;
        let buckets = &input.report.buckets;
        let (width, height) = (ctx.inner_width(), ctx.inner_height());

        let mut points: Vec<(i32, f64)> = buckets
            .iter()
            .filter_map(|b| b.key.year().map(|year| (year, b.sum)))
            .collect();
        let skipped = buckets.len() - points.len();
        if skipped > 0 {
            debug!(page = %page.name, skipped, "Buckets without a year left off the line");
        }
        points.sort_by_key(|(year, _)| *year);

        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (f64::from(first.0), f64::from(last.0)),
            _ => (0.0, 1.0),
        };
        let x = LinearScale::new((first, last), (0.0, width));
        let point_buckets: Vec<Bucket> = buckets
            .iter()
            .filter(|b| b.key.year().is_some())
            .cloned()
            .collect();
        let y = value_scale(&point_buckets, height, page.nice_y);

        ctx.draw(linear_axis_bottom(&x, width, height));
        ctx.draw(linear_axis_left(&y));
        axis_titles(ctx, page);

        if !points.is_empty() {
            let d = points
                .iter()
                .enumerate()
                .map(|(i, (year, sum))| {
                    let cmd = if i == 0 { 'M' } else { 'L' };
                    format!("{cmd}{},{}", px(x.scale(f64::from(*year))), px(y.scale(*sum)))
                })
                .collect::<String>();

            let style = ctx.style().clone();
            ctx.draw(
                SvgElement::new("path")
                    .attr("class", "line")
                    .attr("fill", "none")
                    .attr("stroke", &style.line_color)
                    .num("stroke-width", style.line_width)
                    .attr("d", d),
            );
        }

        debug!(page = %page.name, points = points.len(), "Rendered line chart");
        Ok(())
    }
}
