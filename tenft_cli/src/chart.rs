use std::panic;
use std::path::Path;

use anyhow::{anyhow, Result};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::combinators::{BindKeyPoints, WithKeyPoints};
use plotters::coord::types::{RangedCoordi64, RangedCoordu32};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use tenft::{PlayerRecord, Sample, SESSION_SECONDS};
use tracing::{debug, warn};

/// 16x10 inch figure at 100 dpi.
pub const CANVAS_SIZE: (u32, u32) = (1600, 1000);

const X_TICK_SPACING_S: i64 = 10 * 60;
const Y_TICK_SPACING_FT: u32 = 20;
const Y_MIN_TOP_FT: u32 = 200;

const FAINT: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);
const MARKER_RADIUS: i32 = 7;
const RING_RADIUS: i32 = 14;
const THROWING_LABEL: &str = "Player starts throwing";

const PLAYER_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

type ShotCoord = Cartesian2d<WithKeyPoints<RangedCoordi64>, WithKeyPoints<RangedCoordu32>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Png,
    Svg,
}

impl ChartKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ChartKind::Svg,
            _ => ChartKind::Png,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChartOptions {
    pub title: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Cross,
    Plus,
    Star,
    TriangleUp,
    Diamond,
    TriangleRight,
    TriangleLeft,
    Square,
}

const MARKER_CYCLE: [Marker; 9] = [
    Marker::Circle,
    Marker::Cross,
    Marker::Plus,
    Marker::Star,
    Marker::TriangleUp,
    Marker::Diamond,
    Marker::TriangleRight,
    Marker::TriangleLeft,
    Marker::Square,
];

/// How a marker is put on the canvas, in pixel offsets from its center.
#[derive(Clone, Debug, PartialEq)]
enum Glyph {
    Dot(i32),
    Stroke(Vec<(i32, i32)>),
    Shape(Vec<(i32, i32)>),
}

impl Marker {
    pub fn for_player(index: usize) -> Self {
        MARKER_CYCLE[index % MARKER_CYCLE.len()]
    }

    fn is_line_art(self) -> bool {
        matches!(self, Marker::Cross | Marker::Plus)
    }

    fn stroke_width(self) -> u32 {
        if self.is_line_art() {
            2
        } else {
            1
        }
    }

    fn glyph(self, r: i32) -> Glyph {
        match self {
            Marker::Circle => Glyph::Dot(r),
            Marker::Cross => Glyph::Stroke(vec![(-r, -r), (r, r), (0, 0), (-r, r), (r, -r)]),
            Marker::Plus => Glyph::Stroke(vec![(-r, 0), (r, 0), (0, 0), (0, -r), (0, r)]),
            Marker::Star => Glyph::Shape(star_vertices(r)),
            Marker::TriangleUp => Glyph::Shape(vec![(0, -r), (r, r), (-r, r)]),
            Marker::Diamond => {
                let w = r * 3 / 5;
                Glyph::Shape(vec![(0, -r), (w, 0), (0, r), (-w, 0)])
            }
            Marker::TriangleRight => Glyph::Shape(vec![(r, 0), (-r, -r), (-r, r)]),
            Marker::TriangleLeft => Glyph::Shape(vec![(-r, 0), (r, -r), (r, r)]),
            Marker::Square => {
                let h = r * 4 / 5;
                Glyph::Shape(vec![(-h, -h), (h, -h), (h, h), (-h, h)])
            }
        }
    }
}

fn star_vertices(r: i32) -> Vec<(i32, i32)> {
    let outer = r as f64;
    let inner = outer * 0.4;
    (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
            (
                (radius * angle.cos()).round() as i32,
                (radius * angle.sin()).round() as i32,
            )
        })
        .collect()
}

fn offset(points: &[(i32, i32)], (x, y): (i32, i32)) -> Vec<(i32, i32)> {
    points.iter().map(|(dx, dy)| (x + dx, y + dy)).collect()
}

fn player_color(index: usize) -> RGBColor {
    PLAYER_COLORS[index % PLAYER_COLORS.len()]
}

/// Post-step path through the samples: each distance is held until the next shot.
pub fn step_path(samples: &[Sample]) -> Vec<(i64, u32)> {
    let mut path = Vec::with_capacity(samples.len() * 2);
    for (idx, sample) in samples.iter().enumerate() {
        path.push((sample.elapsed_s, sample.distance_ft));
        if let Some(next) = samples.get(idx + 1) {
            path.push((next.elapsed_s, sample.distance_ft));
        }
    }
    path
}

pub fn minutes_label(seconds: i64) -> String {
    format!("{}min", seconds / 60)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisExtent {
    pub x_min: i64,
    pub x_max: i64,
    pub y_max: u32,
}

impl AxisExtent {
    /// Covers the whole session and every sample, snapped to tick spacing.
    pub fn for_players(players: &[PlayerRecord]) -> Self {
        let samples = players.iter().flat_map(|p| p.samples());
        let (mut lo, mut hi, mut top) = (0i64, i64::from(SESSION_SECONDS), 0u32);
        for sample in samples {
            lo = lo.min(sample.elapsed_s);
            hi = hi.max(sample.elapsed_s);
            top = top.max(sample.distance_ft);
        }
        let x_min = lo.div_euclid(X_TICK_SPACING_S) * X_TICK_SPACING_S;
        let x_max = -((-hi).div_euclid(X_TICK_SPACING_S)) * X_TICK_SPACING_S;
        let padded = top.saturating_add(10);
        let y_max = padded
            .div_ceil(Y_TICK_SPACING_FT)
            .saturating_mul(Y_TICK_SPACING_FT)
            .max(Y_MIN_TOP_FT);
        Self {
            x_min,
            x_max,
            y_max,
        }
    }

    pub fn x_ticks(&self) -> Vec<i64> {
        let first = -((-self.x_min).div_euclid(X_TICK_SPACING_S)) * X_TICK_SPACING_S;
        (0..)
            .map(|i| first + i * X_TICK_SPACING_S)
            .take_while(|t| *t <= self.x_max)
            .collect()
    }

    pub fn y_ticks(&self) -> Vec<u32> {
        (0..self.y_max).step_by(Y_TICK_SPACING_FT as usize).collect()
    }
}

/// Render the chart, turning backend panics (missing fonts and the like) into errors.
pub fn render_chart(
    players: &[PlayerRecord],
    path: &Path,
    kind: ChartKind,
    opts: &ChartOptions,
) -> Result<()> {
    let render = || -> Result<()> {
        match kind {
            ChartKind::Png => {
                let root = BitMapBackend::new(path, CANVAS_SIZE).into_drawing_area();
                draw_chart(root, players, opts)
            }
            ChartKind::Svg => {
                let root = SVGBackend::new(path, CANVAS_SIZE).into_drawing_area();
                draw_chart(root, players, opts)
            }
        }
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| anyhow!("plotting backend panicked while drawing {}", path.display()))?
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    players: &[PlayerRecord],
    opts: &ChartOptions,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = root;
    area.fill(&WHITE)?;

    let extent = AxisExtent::for_players(players);
    debug!(?extent, "chart extent");

    let mut chart = ChartBuilder::on(&area)
        .caption(&opts.title, ("sans-serif", 30))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 90)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .set_label_area_size(LabelAreaPosition::Right, 40)
        .build_cartesian_2d(
            (extent.x_min..extent.x_max).with_key_points(extent.x_ticks()),
            (0u32..extent.y_max).with_key_points(extent.y_ticks()),
        )?;

    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(&TRANSPARENT)
        .x_label_formatter(&|v| minutes_label(*v))
        .y_label_formatter(&|v| format!("{}", v))
        .y_desc("distance (ft)")
        .axis_desc_style(("sans-serif", 28))
        .label_style(FontDesc::new(FontFamily::SansSerif, 24.0, FontStyle::Normal))
        .draw()?;

    // Faint background steps, under the markers.
    for player in players {
        chart.draw_series(DashedLineSeries::new(
            step_path(player.samples()),
            6,
            4,
            FAINT.stroke_width(1),
        ))?;
    }

    for (idx, player) in players.iter().enumerate() {
        draw_player_markers(&mut chart, player, idx)?;
    }

    let mut rings = Vec::new();
    for player in players {
        match (player.starts_throwing_at(), player.transition_sample()) {
            (Some(_), Some(sample)) => rings.push(sample),
            (Some(distance), None) => warn!(
                "{} starts throwing at {} ft but made no shot there; skipping marker",
                player.name(),
                distance
            ),
            (None, _) => {}
        }
    }
    chart.draw_series(rings.into_iter().map(|s| {
        Circle::new(
            (s.elapsed_s, s.distance_ft),
            RING_RADIUS,
            FAINT.stroke_width(1),
        )
    }))?;

    // Legend-only entry explaining the rings.
    chart
        .draw_series(std::iter::empty::<Circle<(i64, u32), i32>>())?
        .label(THROWING_LABEL)
        .legend(|(x, y)| Circle::new((x, y), RING_RADIUS, FAINT.stroke_width(1)));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .label_font(FontDesc::new(FontFamily::SansSerif, 22.0, FontStyle::Normal).color(&BLACK))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    area.present()?;
    Ok(())
}

fn draw_player_markers<DB>(
    chart: &mut ChartContext<'_, DB, ShotCoord>,
    player: &PlayerRecord,
    idx: usize,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let marker = Marker::for_player(idx);
    let style = ShapeStyle {
        color: player_color(idx).to_rgba(),
        filled: !marker.is_line_art(),
        stroke_width: marker.stroke_width(),
    };
    let points: Vec<(i64, u32)> = player
        .samples()
        .iter()
        .map(|s| (s.elapsed_s, s.distance_ft))
        .collect();

    match marker.glyph(MARKER_RADIUS) {
        Glyph::Dot(r) => {
            chart
                .draw_series(
                    points
                        .into_iter()
                        .map(|c| EmptyElement::at(c) + Circle::new((0, 0), r, style)),
                )?
                .label(player.name())
                .legend(move |(x, y)| Circle::new((x, y), r, style));
        }
        Glyph::Stroke(path) => {
            let legend_path = path.clone();
            chart
                .draw_series(
                    points
                        .into_iter()
                        .map(|c| EmptyElement::at(c) + PathElement::new(path.clone(), style)),
                )?
                .label(player.name())
                .legend(move |pos| PathElement::new(offset(&legend_path, pos), style));
        }
        Glyph::Shape(vertices) => {
            let legend_vertices = vertices.clone();
            chart
                .draw_series(
                    points
                        .into_iter()
                        .map(|c| EmptyElement::at(c) + Polygon::new(vertices.clone(), style)),
                )?
                .label(player.name())
                .legend(move |pos| Polygon::new(offset(&legend_vertices, pos), style));
        }
    }
    Ok(())
}
