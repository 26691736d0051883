//! Figures from aggregated tables.
//!
//! All figures are written as SVG with the `plotters` SVG backend, which needs no system fonts.
//! Every plotting function returns the paths of the files it wrote.

mod spatial;
mod timeseries;

pub use spatial::{plot_spatial, SpatialPlot};
pub use timeseries::{
    insecticide_legend, plot_insecticide_resistance, plot_timeseries, InsecticidePlot,
    TimeSeriesPlot,
};

use crate::error::VgError;
use crate::sweep::TagValue;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::style::RGBColor;
use std::path::{Path, PathBuf};

/// Days per simulated year.
pub const DAYS_PER_YEAR: f64 = 365.0;

const PALETTE: [RGBColor; 8] = [
    RGBColor(0x2c, 0xbc, 0xb2),
    RGBColor(0x5e, 0x49, 0x5a),
    RGBColor(0xd4, 0x4e, 0x28),
    RGBColor(0x56, 0x44, 0x5d),
    RGBColor(0xe3, 0x1a, 0x1c),
    RGBColor(0x37, 0x7e, 0xb8),
    RGBColor(0x4d, 0xaf, 0x4a),
    RGBColor(0xff, 0x7f, 0x00),
];

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for VgError {
    fn from(error: DrawingAreaErrorKind<E>) -> Self {
        VgError::PlotError(error.to_string())
    }
}

/// The `i`th line color, cycling.
#[must_use]
pub fn line_color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Maps `value` in `[0, 1]` onto a plasma-like ramp from dark blue through magenta to yellow.
/// Values outside the range are clamped; `NaN` maps to the low end.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn plasma(value: f64) -> RGBColor {
    const STOPS: [(f64, f64, f64); 5] = [
        (13.0, 8.0, 135.0),
        (126.0, 3.0, 168.0),
        (204.0, 71.0, 120.0),
        (248.0, 149.0, 64.0),
        (240.0, 249.0, 33.0),
    ];
    let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    let scaled = v * (STOPS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(STOPS.len() - 2);
    let t = scaled - lower as f64;
    let (r0, g0, b0) = STOPS[lower];
    let (r1, g1, b1) = STOPS[lower + 1];
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// The label of a year tick at `years` after the start: the offset, or the calendar year when
/// `start_year` is given.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn year_label(years: f64, start_year: Option<i32>) -> String {
    let offset = years.round() as i32;
    match start_year {
        Some(start) => (start + offset).to_string(),
        None => offset.to_string(),
    }
}

/// Replaces characters that do not belong in file names.
#[must_use]
pub fn file_stem(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// `dir/stem.svg`, creating `dir` if needed.
pub(crate) fn svg_path(dir: &Path, stem: &str) -> Result<PathBuf, VgError> {
    std::fs::create_dir_all(dir)?;
    Ok(dir.join(format!("{stem}.svg")))
}

/// Groups table rows by the distinct values of `column`, or one group keyed `None` without a
/// column.
pub(crate) fn split_values(
    summary: &crate::table::SummaryTable,
    column: Option<&str>,
) -> Result<Vec<Option<TagValue>>, VgError> {
    match column {
        Some(column) => Ok(summary.distinct(column)?.into_iter().map(Some).collect()),
        None => Ok(vec![None]),
    }
}

/// The smallest and largest finite values, or `None` when there are none.
pub(crate) fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}
