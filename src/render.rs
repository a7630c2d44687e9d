use crate::config::RenderConfig;
use crate::format::{group_thousands, si_prefix};
use crate::projection::fmt_coord;
use crate::scale::linear_ticks;
use crate::scene::Scene;
use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

const LEGEND_WIDTH: f64 = 15.0;
const LEGEND_HEIGHT: f64 = 300.0;
const LEGEND_TICKS: usize = 5;
const GRADIENT_ID: &str = "legend-gradient-vertical";
const GRADIENT_STEPS: usize = 100;
const TITLE_Y: f64 = 28.0;
const NORTH_ARROW: (f64, f64, f64) = (900.0, 30.0, 40.0); // x, y, side
const LABEL_FONT: &str = "Cambria";
// axisRight draws on half-pixel offsets for crisp lines
const AXIS_OFFSET: f64 = 0.5;
const AXIS_TICK_SIZE: f64 = 6.0;

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub struct SvgDocument {
    width: f64,
    height: f64,
    body: String,
    depth: usize,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
            depth: 1,
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, String)]) {
        let _ = write!(self.body, "{}<{}", "  ".repeat(self.depth), tag);
        for (name, value) in attrs {
            let _ = write!(self.body, " {}=\"{}\"", name, escape_xml(value));
        }
    }

    pub fn open(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.start_tag(tag, attrs);
        self.body.push_str(">\n");
        self.depth += 1;
    }

    pub fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        let _ = writeln!(self.body, "{}</{}>", "  ".repeat(self.depth), tag);
    }

    pub fn empty(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.start_tag(tag, attrs);
        self.body.push_str("/>\n");
    }

    pub fn text(&mut self, tag: &str, attrs: &[(&str, String)], text: &str) {
        self.start_tag(tag, attrs);
        let _ = writeln!(self.body, ">{}</{}>", escape_xml(text), tag);
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\">\n{}</svg>\n",
            fmt_coord(self.width),
            fmt_coord(self.height),
            self.body
        )
    }
}

fn translate(x: f64, y: f64) -> String {
    format!("translate({},{})", fmt_coord(x), fmt_coord(y))
}

pub fn render_map(doc: &mut SvgDocument, config: &RenderConfig, scene: &Scene) {
    draw_title(doc, config);
    draw_subzones(doc, config, scene);
    draw_legend(doc, config, scene);
    draw_north_arrow(doc, config);
}

pub fn render_to_string(config: &RenderConfig, scene: &Scene) -> String {
    let mut doc = SvgDocument::new(config.width, config.height);
    render_map(&mut doc, config, scene);
    doc.finish()
}

fn draw_title(doc: &mut SvgDocument, config: &RenderConfig) {
    doc.text(
        "text",
        &[
            ("x", fmt_coord(config.width / 2.0)),
            ("y", fmt_coord(TITLE_Y)),
            ("text-anchor", "middle".into()),
            ("font-size", "20px".into()),
            ("font-weight", "bold".into()),
            ("font-family", LABEL_FONT.into()),
            ("fill", "black".into()),
        ],
        &config.title,
    );
}

fn draw_subzones(doc: &mut SvgDocument, config: &RenderConfig, scene: &Scene) {
    let rule = scene.rule();
    doc.open("g", &[("id", "subzones".into())]);

    for (index, shape) in scene.shapes().iter().enumerate() {
        let resting = scene.resting_fill(index).unwrap_or_else(|| shape.fill.clone());
        doc.empty(
            "path",
            &[
                ("class", "subzone".into()),
                ("d", shape.path.clone()),
                ("fill", rule.paint(&shape.fill)),
                ("stroke", config.stroke.clone()),
                ("fill-rule", "evenodd".into()),
                ("data-subzone", shape.info.subzone_name.clone()),
                ("data-planning-area", shape.info.planning_area.clone()),
                ("data-region", shape.info.region.clone()),
                ("data-population", group_thousands(shape.info.population)),
                ("data-fill", rule.paint(&resting)),
            ],
        );
    }

    doc.close("g");
}

fn draw_legend(doc: &mut SvgDocument, config: &RenderConfig, scene: &Scene) {
    let scale = scene.rule().scale();
    let [_, max] = scale.domain();

    doc.open(
        "g",
        &[
            ("id", "legend".into()),
            ("transform", translate(LEGEND_WIDTH + 10.0, (config.height - LEGEND_HEIGHT) / 2.0)),
        ],
    );

    doc.empty(
        "rect",
        &[
            ("width", fmt_coord(LEGEND_WIDTH)),
            ("height", fmt_coord(LEGEND_HEIGHT)),
            ("style", format!("fill: url(#{});", GRADIENT_ID)),
        ],
    );

    draw_axis(doc, max);

    doc.text(
        "text",
        &[
            ("x", "-18".into()),
            ("y", "-35".into()),
            ("text-anchor", "start".into()),
            ("style", format!("font-size: 18px; font-family: {}; font-weight: bold;", LABEL_FONT)),
        ],
        "Legend:",
    );
    doc.text(
        "text",
        &[
            ("x", "-10".into()),
            ("y", "-10".into()),
            ("text-anchor", "start".into()),
            ("style", format!("font-size: 12px; font-family: {}; font-weight: bold;", LABEL_FONT)),
        ],
        "Population count",
    );

    doc.close("g");

    // bottom (0%) is the low end of the domain
    doc.open("defs", &[]);
    doc.open(
        "linearGradient",
        &[
            ("id", GRADIENT_ID.into()),
            ("x1", "0%".into()),
            ("y1", "100%".into()),
            ("x2", "0%".into()),
            ("y2", "0%".into()),
        ],
    );
    for step in 0..=GRADIENT_STEPS {
        let t = step as f64 / GRADIENT_STEPS as f64;
        doc.empty(
            "stop",
            &[
                ("offset", format!("{}%", step * 100 / GRADIENT_STEPS)),
                ("stop-color", scale.color(t * max).to_string()),
            ],
        );
    }
    doc.close("linearGradient");
    doc.close("defs");
}

// Vertical axis on the right edge of the swatch, 0 at the bottom.
fn draw_axis(doc: &mut SvgDocument, max: f64) {
    let position = |v: f64| {
        if max == 0.0 {
            LEGEND_HEIGHT / 2.0
        } else {
            LEGEND_HEIGHT - v / max * LEGEND_HEIGHT
        }
    };

    doc.open(
        "g",
        &[
            ("class", "axis".into()),
            ("transform", translate(LEGEND_WIDTH, 0.0)),
            ("fill", "none".into()),
            ("font-size", "10".into()),
            ("font-family", "sans-serif".into()),
            ("text-anchor", "start".into()),
        ],
    );

    doc.empty(
        "path",
        &[
            ("class", "domain".into()),
            ("stroke", "currentColor".into()),
            (
                "d",
                format!(
                    "M{},{}H{}V{}H{}",
                    fmt_coord(AXIS_TICK_SIZE),
                    fmt_coord(LEGEND_HEIGHT + AXIS_OFFSET),
                    fmt_coord(AXIS_OFFSET),
                    fmt_coord(AXIS_OFFSET),
                    fmt_coord(AXIS_TICK_SIZE)
                ),
            ),
        ],
    );

    for tick in linear_ticks(0.0, max, LEGEND_TICKS) {
        doc.open(
            "g",
            &[
                ("class", "tick".into()),
                ("transform", translate(0.0, position(tick) + AXIS_OFFSET)),
            ],
        );
        doc.empty(
            "line",
            &[("stroke", "currentColor".into()), ("x2", fmt_coord(AXIS_TICK_SIZE))],
        );
        doc.text(
            "text",
            &[
                ("fill", "currentColor".into()),
                ("x", fmt_coord(AXIS_TICK_SIZE + 3.0)),
                ("dy", "0.32em".into()),
            ],
            &si_prefix(tick),
        );
        doc.close("g");
    }

    doc.close("g");
}

fn draw_north_arrow(doc: &mut SvgDocument, config: &RenderConfig) {
    let (x, y, side) = NORTH_ARROW;
    doc.empty(
        "image",
        &[
            ("href", config.north_arrow_href.clone()),
            ("x", fmt_coord(x)),
            ("y", fmt_coord(y)),
            ("width", fmt_coord(side)),
            ("height", fmt_coord(side)),
        ],
    );
}

/// Checks that the overlay image can be decoded and returns its pixel size.
pub fn probe_overlay(path: &Path) -> Result<(u32, u32)> {
    let (w, h) = image::image_dimensions(path)
        .with_context(|| format!("Failed to read overlay image: {:?}", path))?;
    info!("Overlay image {:?} is {}x{}, drawn at {}x{}", path, w, h, NORTH_ARROW.2, NORTH_ARROW.2);
    Ok((w, h))
}
