use std::fmt::Write as _;

use geo_types::{Coord, Polygon};

use crate::measure;
use crate::models::FigureData;

// Builds one annotated SVG figure per polygon: translucent fill, a length
// label on every side, the area at the centroid, a north arrow, title, axis
// labels and a background grid. The figure is returned as a value; handing it
// to the display surface is the caller's job.

pub const FIGURE_WIDTH: u32 = 640;
pub const FIGURE_HEIGHT: u32 = 480;

const MARGIN_LEFT: f64 = 78.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 42.0;
const MARGIN_BOTTOM: f64 = 58.0;

const FILL_COLOR: &str = "red";
const FILL_OPACITY: f64 = 0.2;
const GRID_COLOR: &str = "#b0b0b0";
const FRAME_COLOR: &str = "#444444";
const FONT_FAMILY: &str = "sans-serif";

const SIDE_LABEL_FONT_PX: u32 = 9;
const AREA_LABEL_FONT_PX: u32 = 12;
const TICK_LABEL_FONT_PX: u32 = 10;
const AXIS_LABEL_FONT_PX: u32 = 12;
const TITLE_FONT_PX: u32 = 14;

// North arrow in axes-fraction coordinates, independent of the data
const NORTH_ARROW_X: f64 = 0.95;
const NORTH_ARROW_TIP_Y: f64 = 0.95;
const NORTH_ARROW_LENGTH: f64 = 0.1;

const X_AXIS_LABEL: &str = "Longitude";
const Y_AXIS_LABEL: &str = "Latitude";

// Pixel mapping for the plot area, fitted to one polygon
struct Axes {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    plot_left: f64,
    plot_top: f64,
    plot_width: f64,
    plot_height: f64,
}

impl Axes {
    // Fit the axes to the polygon's exterior ring with a 5% data margin
    fn fit(polygon: &Polygon<f64>) -> Axes {
        let mut x_min = f64::INFINITY;
        let mut y_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for coord in polygon.exterior().coords() {
            x_min = x_min.min(coord.x);
            y_min = y_min.min(coord.y);
            x_max = x_max.max(coord.x);
            y_max = y_max.max(coord.y);
        }

        // Empty ring: fall back to a unit window around the origin
        if !x_min.is_finite() || !y_min.is_finite() {
            x_min = -0.5;
            x_max = 0.5;
            y_min = -0.5;
            y_max = 0.5;
        }

        let x_pad = pad_for_span(x_max - x_min);
        let y_pad = pad_for_span(y_max - y_min);

        Axes {
            x_min: x_min - x_pad,
            x_max: x_max + x_pad,
            y_min: y_min - y_pad,
            y_max: y_max + y_pad,
            plot_left: MARGIN_LEFT,
            plot_top: MARGIN_TOP,
            plot_width: FIGURE_WIDTH as f64 - MARGIN_LEFT - MARGIN_RIGHT,
            plot_height: FIGURE_HEIGHT as f64 - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    // Data coordinates to pixels; the y axis flips because SVG grows downward
    fn to_pixel(&self, coord: Coord<f64>) -> (f64, f64) {
        let px = self.plot_left + (coord.x - self.x_min) / (self.x_max - self.x_min) * self.plot_width;
        let py = self.plot_top + (self.y_max - coord.y) / (self.y_max - self.y_min) * self.plot_height;
        (px, py)
    }

    // Axes-fraction coordinates (0..1 from bottom-left) to pixels
    fn fraction_to_pixel(&self, fx: f64, fy: f64) -> (f64, f64) {
        let px = self.plot_left + fx * self.plot_width;
        let py = self.plot_top + (1.0 - fy) * self.plot_height;
        (px, py)
    }

    fn plot_right(&self) -> f64 {
        self.plot_left + self.plot_width
    }

    fn plot_bottom(&self) -> f64 {
        self.plot_top + self.plot_height
    }
}

fn pad_for_span(span: f64) -> f64 {
    if span > 0.0 {
        span * 0.05
    } else {
        0.5
    }
}

// Round a raw tick interval up to a 1-2-5 step
fn nice_step(span: f64, target_ticks: usize) -> f64 {
    let raw = span / target_ticks as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

// Tick positions covering [min, max] on multiples of step
fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    let mut values = Vec::new();
    let mut tick = (min / step).ceil() * step;
    while tick <= max + step * 1e-9 {
        values.push(tick);
        tick += step;
    }
    values
}

// Tick label with just enough decimals for the step size
fn format_tick(value: f64, step: f64) -> String {
    let value = if value.abs() < step * 1e-6 { 0.0 } else { value };
    if step >= 1.0 {
        format!("{:.0}", value)
    } else {
        let decimals = (-step.log10()).ceil().max(1.0).min(6.0) as usize;
        format!("{:.*}", decimals, value)
    }
}

// Escape text destined for SVG markup
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn push_text(
    svg: &mut String,
    x: f64,
    y: f64,
    font_px: u32,
    anchor: &str,
    content: &str,
) {
    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" font-size="{}" font-family="{}" text-anchor="{}">{}</text>"#,
        x,
        y,
        font_px,
        FONT_FAMILY,
        anchor,
        escape_xml(content)
    );
}

// Render one polygon with side lengths, area, north arrow, title and grid
pub fn render_polygon(polygon: &Polygon<f64>, title: &str) -> FigureData {
    let axes = Axes::fit(polygon);
    let mut svg = String::with_capacity(8 * 1024);

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = FIGURE_WIDTH,
        h = FIGURE_HEIGHT
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
        FIGURE_WIDTH, FIGURE_HEIGHT
    );

    draw_grid(&mut svg, &axes);
    draw_polygon_fill(&mut svg, &axes, polygon);
    draw_side_labels(&mut svg, &axes, polygon);
    draw_area_label(&mut svg, &axes, polygon);
    draw_north_arrow(&mut svg, &axes);
    draw_frame_and_labels(&mut svg, &axes, title);

    svg.push_str("</svg>");

    FigureData {
        title: title.to_string(),
        svg,
        width: FIGURE_WIDTH,
        height: FIGURE_HEIGHT,
    }
}

// Background grid with tick labels on both axes
fn draw_grid(svg: &mut String, axes: &Axes) {
    let x_step = nice_step(axes.x_max - axes.x_min, 6);
    let y_step = nice_step(axes.y_max - axes.y_min, 5);

    for tick in ticks(axes.x_min, axes.x_max, x_step) {
        let (px, _) = axes.to_pixel(Coord {
            x: tick,
            y: axes.y_min,
        });
        let _ = write!(
            svg,
            r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{color}" stroke-width="0.8"/>"#,
            x = px,
            y1 = axes.plot_top,
            y2 = axes.plot_bottom(),
            color = GRID_COLOR
        );
        push_text(
            svg,
            px,
            axes.plot_bottom() + 16.0,
            TICK_LABEL_FONT_PX,
            "middle",
            &format_tick(tick, x_step),
        );
    }

    for tick in ticks(axes.y_min, axes.y_max, y_step) {
        let (_, py) = axes.to_pixel(Coord {
            x: axes.x_min,
            y: tick,
        });
        let _ = write!(
            svg,
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="0.8"/>"#,
            x1 = axes.plot_left,
            x2 = axes.plot_right(),
            y = py,
            color = GRID_COLOR
        );
        push_text(
            svg,
            axes.plot_left - 8.0,
            py + 3.5,
            TICK_LABEL_FONT_PX,
            "end",
            &format_tick(tick, y_step),
        );
    }
}

// Translucent interior fill of the exterior ring, no edge stroke
fn draw_polygon_fill(svg: &mut String, axes: &Axes, polygon: &Polygon<f64>) {
    let mut path = String::new();
    for (index, coord) in polygon.exterior().coords().enumerate() {
        let (px, py) = axes.to_pixel(*coord);
        let command = if index == 0 { 'M' } else { 'L' };
        let _ = write!(path, "{} {:.2} {:.2} ", command, px, py);
    }
    if path.is_empty() {
        return;
    }
    path.push('Z');

    let _ = write!(
        svg,
        r#"<path d="{}" fill="{}" fill-opacity="{}" stroke="none"/>"#,
        path.trim_end_matches(' '),
        FILL_COLOR,
        FILL_OPACITY
    );
}

// One length label at the midpoint of every side
fn draw_side_labels(svg: &mut String, axes: &Axes, polygon: &Polygon<f64>) {
    let lengths = measure::side_lengths(polygon);
    let midpoints = measure::side_midpoints(polygon);

    for (length, midpoint) in lengths.iter().zip(midpoints.iter()) {
        let (px, py) = axes.to_pixel(*midpoint);
        push_text(
            svg,
            px,
            py,
            SIDE_LABEL_FONT_PX,
            "middle",
            &format!("{:.2} m", length),
        );
    }
}

// Area label anchored at the centroid
fn draw_area_label(svg: &mut String, axes: &Axes, polygon: &Polygon<f64>) {
    let anchor = measure::area_label_anchor(polygon);
    let (px, py) = axes.to_pixel(anchor);
    push_text(
        svg,
        px,
        py,
        AREA_LABEL_FONT_PX,
        "middle",
        &format!("Area: {:.2} sq.m", measure::area(polygon)),
    );
}

// Fixed-position north arrow in the top-right corner of the plot area
fn draw_north_arrow(svg: &mut String, axes: &Axes) {
    let (tip_x, tip_y) = axes.fraction_to_pixel(NORTH_ARROW_X, NORTH_ARROW_TIP_Y);
    let (tail_x, tail_y) =
        axes.fraction_to_pixel(NORTH_ARROW_X, NORTH_ARROW_TIP_Y - NORTH_ARROW_LENGTH);

    let head = 6.0;
    let _ = write!(
        svg,
        r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="black" stroke-width="1.5"/>"#,
        x1 = tail_x,
        y1 = tail_y - 4.0,
        x2 = tip_x,
        y2 = tip_y + head
    );
    let _ = write!(
        svg,
        r#"<path d="M {lx:.2} {ly:.2} L {rx:.2} {ry:.2} L {tx:.2} {ty:.2} Z" fill="black"/>"#,
        lx = tip_x - head / 2.0,
        ly = tip_y + head,
        rx = tip_x + head / 2.0,
        ry = tip_y + head,
        tx = tip_x,
        ty = tip_y
    );
    push_text(svg, tail_x, tail_y + 8.0, AREA_LABEL_FONT_PX, "middle", "N");
}

// Plot frame, title and axis labels
fn draw_frame_and_labels(svg: &mut String, axes: &Axes, title: &str) {
    let _ = write!(
        svg,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="1"/>"#,
        axes.plot_left, axes.plot_top, axes.plot_width, axes.plot_height, FRAME_COLOR
    );

    push_text(
        svg,
        axes.plot_left + axes.plot_width / 2.0,
        MARGIN_TOP - 16.0,
        TITLE_FONT_PX,
        "middle",
        title,
    );
    push_text(
        svg,
        axes.plot_left + axes.plot_width / 2.0,
        FIGURE_HEIGHT as f64 - 14.0,
        AXIS_LABEL_FONT_PX,
        "middle",
        X_AXIS_LABEL,
    );

    let label_y = axes.plot_top + axes.plot_height / 2.0;
    let _ = write!(
        svg,
        r#"<text x="0" y="0" font-size="{}" font-family="{}" text-anchor="middle" transform="translate(20 {:.2}) rotate(-90)">{}</text>"#,
        AXIS_LABEL_FONT_PX,
        FONT_FAMILY,
        label_y,
        escape_xml(Y_AXIS_LABEL)
    );
}
