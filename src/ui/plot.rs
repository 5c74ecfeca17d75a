use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use ev_dashboard::aggregate::{AggregationResult, ChartKind};

use crate::color::ColorMap;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart (central panel)
// ---------------------------------------------------------------------------

/// Render the active view in the central panel.
pub fn chart(ui: &mut Ui, state: &AppState) {
    if state.is_loading() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.spinner();
        });
        return;
    }

    let Some(result) = &state.result else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = if state.ingest.error().is_some() {
                "The dataset could not be loaded  (File → Open CSV…)"
            } else {
                "Open a CSV file to view the dashboard  (File → Open CSV…)"
            };
            ui.heading(hint);
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(result.title);
    });
    ui.add_space(4.0);

    if result.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No records to show for this view.");
        });
        return;
    }

    let fallback;
    let colors = match &state.color_map {
        Some(cm) => cm,
        None => {
            fallback = ColorMap::new(&result.labels, state.dark_mode);
            &fallback
        }
    };

    match result.chart {
        ChartKind::Bar | ChartKind::GroupedBar => bar_chart(ui, result, colors),
        ChartKind::Line => line_chart(ui, result, colors),
        ChartKind::Pie => round_chart(ui, result, colors, 0.0),
        ChartKind::Doughnut => round_chart(ui, result, colors, DOUGHNUT_HOLE),
    }
}

/// Category axis: integer grid marks map onto labels, everything else
/// stays blank.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }
}

fn bar_chart(ui: &mut Ui, result: &AggregationResult, colors: &ColorMap) {
    let n_series = result.series.len().max(1);
    let width = 0.8 / n_series as f64;
    let grouped = result.series.len() > 1;

    Plot::new("bar_chart")
        .legend(Legend::default())
        .x_axis_label(result.x_axis)
        .y_axis_label(result.y_axis)
        .x_axis_formatter(category_formatter(result.labels.clone()))
        .include_y(0.0)
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(true)
        .show(ui, |plot_ui| {
            for (j, series) in result.series.iter().enumerate() {
                let offset = (j as f64 - (n_series as f64 - 1.0) / 2.0) * width;
                let series_color = colors.color_for(&series.name);

                let bars: Vec<Bar> = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let label = &result.labels[i];
                        let fill = if grouped {
                            series_color
                        } else {
                            colors.color_for(label)
                        };
                        Bar::new(i as f64 + offset, v)
                            .width(width * 0.95)
                            .name(label)
                            .fill(fill)
                    })
                    .collect();

                let mut chart = BarChart::new(bars).name(&series.name);
                if grouped {
                    chart = chart.color(series_color);
                }
                plot_ui.bar_chart(chart);
            }
        });
}

fn line_chart(ui: &mut Ui, result: &AggregationResult, colors: &ColorMap) {
    Plot::new("line_chart")
        .legend(Legend::default())
        .x_axis_label(result.x_axis)
        .y_axis_label(result.y_axis)
        .x_axis_formatter(category_formatter(result.labels.clone()))
        .include_y(0.0)
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(true)
        .show(ui, |plot_ui| {
            for series in &result.series {
                let color = if result.series.len() > 1 {
                    colors.color_for(&series.name)
                } else {
                    colors.default_color()
                };
                let points: Vec<[f64; 2]> = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| [i as f64, v])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(&series.name)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(&series.name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie / doughnut
// ---------------------------------------------------------------------------

const DOUGHNUT_HOLE: f64 = 0.55;
/// Maximum angle covered by one polygon piece, radians.
const MAX_PIECE_ANGLE: f64 = TAU / 180.0;

/// Convex pieces approximating the ring sector between two fractions of a
/// full turn, clockwise from twelve o'clock. With `inner == 0.0` the
/// pieces are triangles from the centre (pie); otherwise quads (doughnut).
pub fn sector_pieces(start: f64, end: f64, inner: f64, outer: f64) -> Vec<Vec<[f64; 2]>> {
    let span = (end - start) * TAU;
    if span <= 0.0 {
        return Vec::new();
    }
    let steps = (span / MAX_PIECE_ANGLE).ceil().max(1.0) as usize;
    let point = |frac: f64, r: f64| {
        let angle = FRAC_PI_2 - frac * TAU;
        [r * angle.cos(), r * angle.sin()]
    };

    (0..steps)
        .map(|k| {
            let a = start + (end - start) * k as f64 / steps as f64;
            let b = start + (end - start) * (k + 1) as f64 / steps as f64;
            if inner <= 0.0 {
                vec![[0.0, 0.0], point(a, outer), point(b, outer)]
            } else {
                vec![point(a, inner), point(a, outer), point(b, outer), point(b, inner)]
            }
        })
        .collect()
}

fn round_chart(ui: &mut Ui, result: &AggregationResult, colors: &ColorMap, inner: f64) {
    let Some(series) = result.series.first() else {
        return;
    };
    let total: f64 = series.values.iter().sum();
    if total <= 0.0 {
        ui.label("All values are zero.");
        return;
    }

    Plot::new("round_chart")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .include_x(-1.3)
        .include_x(1.3)
        .include_y(-1.1)
        .include_y(1.1)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for (label, &value) in result.labels.iter().zip(&series.values) {
                let end = start + value / total;
                let color = colors.color_for(label);
                for piece in sector_pieces(start, end, inner, 1.0) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .name(label)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color)),
                    );
                }

                let fraction = value / total;
                if fraction >= 0.04 {
                    let mid = (start + end) / 2.0;
                    let r = if inner > 0.0 { (inner + 1.0) / 2.0 } else { 0.65 };
                    let angle = FRAC_PI_2 - mid * TAU;
                    plot_ui.text(Text::new(
                        PlotPoint::new(r * angle.cos(), r * angle.sin()),
                        RichText::new(format!("{:.1}%", fraction * 100.0))
                            .color(Color32::BLACK)
                            .strong(),
                    ));
                }
                start = end;
            }
        });
}
