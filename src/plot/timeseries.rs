use super::{file_stem, finite_range, line_color, split_values, svg_path, year_label, DAYS_PER_YEAR};
use crate::analyze::STD_SUFFIX;
use crate::error::VgError;
use crate::log::{debug, info};
use crate::sweep::TagValue;
use crate::table::SummaryTable;
use plotters::prelude::*;
use std::path::PathBuf;

/// Options of [`plot_timeseries`].
#[derive(Debug, Clone)]
pub struct TimeSeriesPlot {
    pub channels: Vec<String>,
    pub time_column: String,
    /// One figure per distinct value of this column.
    pub split_by: Option<String>,
    /// One line per distinct value of this column, per channel.
    pub line_by: Option<String>,
    /// Days shown, from day 0.
    pub max_days: Option<f64>,
    /// Labels the year ticks with calendar years from this year.
    pub start_year: Option<i32>,
    pub y_range: Option<(f64, f64)>,
    pub y_label: Option<String>,
    pub output_dir: PathBuf,
    /// File name prefix of the figures.
    pub prefix: String,
}

impl Default for TimeSeriesPlot {
    fn default() -> Self {
        TimeSeriesPlot {
            channels: Vec::new(),
            time_column: "Time".to_string(),
            split_by: None,
            line_by: None,
            max_days: None,
            start_year: None,
            y_range: None,
            y_label: None,
            output_dir: PathBuf::from("."),
            prefix: "timeseries".to_string(),
        }
    }
}

/// One line of a figure: points in (years, value) with the std band, if any.
struct Line {
    label: String,
    points: Vec<(f64, f64)>,
    std: Option<Vec<f64>>,
}

impl Line {
    /// Reads `channel` (and `<channel>_std` when present) against time, sorted by time.
    fn read(
        table: &SummaryTable,
        time_column: &str,
        channel: &str,
        label: String,
        max_days: Option<f64>,
    ) -> Result<Line, VgError> {
        let times = table.numbers(time_column)?;
        let values = table.numbers(channel)?;
        let std_column = format!("{channel}{STD_SUFFIX}");
        let stds = if table.has_column(&std_column) {
            Some(table.numbers(&std_column)?)
        } else {
            None
        };

        let mut rows: Vec<(f64, f64, f64)> = times
            .iter()
            .zip(&values)
            .enumerate()
            .filter(|(_, (t, _))| max_days.map_or(true, |max| **t <= max))
            .map(|(i, (t, v))| (*t, *v, stds.as_ref().map_or(0.0, |s| s[i])))
            .collect();
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Line {
            label,
            points: rows.iter().map(|(t, v, _)| (t / DAYS_PER_YEAR, *v)).collect(),
            std: stds.map(|_| rows.iter().map(|(_, _, s)| *s).collect()),
        })
    }

    fn band(&self) -> Option<Vec<(f64, f64)>> {
        let std = self.std.as_ref()?;
        let upper = self.points.iter().zip(std).map(|((x, y), s)| (*x, y + s));
        let lower = self.points.iter().zip(std).rev().map(|((x, y), s)| (*x, y - s));
        Some(upper.chain(lower).collect())
    }

    fn extent(&self) -> impl Iterator<Item = f64> + '_ {
        let std = self.std.clone().unwrap_or_else(|| vec![0.0; self.points.len()]);
        self.points
            .iter()
            .zip(std)
            .flat_map(|((_, y), s)| [y - s, y + s])
    }
}

fn draw_lines(
    path: &std::path::Path,
    title: &str,
    y_label: &str,
    lines: &[Line],
    y_range: Option<(f64, f64)>,
    start_year: Option<i32>,
) -> Result<(), VgError> {
    let root = SVGBackend::new(path, (1000, 680)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = lines
        .iter()
        .flat_map(|line| line.points.iter().map(|(x, _)| *x))
        .fold(0.0, f64::max)
        .max(1.0);
    let (y_min, y_max) = y_range
        .or_else(|| finite_range(lines.iter().flat_map(Line::extent)))
        .unwrap_or((0.0, 1.0));
    let y_max = if y_max > y_min { y_max } else { y_min + 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let year_ticks = x_max.ceil() as usize + 1;
    chart
        .configure_mesh()
        .x_desc("Years")
        .y_desc(y_label)
        .x_labels(year_ticks)
        .x_label_formatter(&|x| year_label(*x, start_year))
        .draw()?;

    for (i, line) in lines.iter().enumerate() {
        let color = line_color(i);
        if let Some(band) = line.band() {
            chart.draw_series(std::iter::once(Polygon::new(band, color.mix(0.3).filled())))?;
        }
        chart
            .draw_series(LineSeries::new(
                line.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(line.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn describe(column: Option<&str>, value: Option<&TagValue>) -> String {
    match (column, value) {
        (Some(column), Some(value)) => format!("{column}={value}"),
        _ => String::new(),
    }
}

fn subset(
    table: &SummaryTable,
    column: Option<&str>,
    value: Option<&TagValue>,
) -> Result<SummaryTable, VgError> {
    match (column, value) {
        (Some(column), Some(value)) => table.filter(column, value),
        _ => Ok(table.clone()),
    }
}

/// Draws each channel of `summary` against time with a band of one standard deviation.
///
/// Produces one figure per distinct value of `split_by`, or a single figure.
pub fn plot_timeseries(
    summary: &SummaryTable,
    options: &TimeSeriesPlot,
) -> Result<Vec<PathBuf>, VgError> {
    let split_by = options.split_by.as_deref();
    let line_by = options.line_by.as_deref();
    let mut written = Vec::new();

    for split in split_values(summary, split_by)? {
        let figure_table = subset(summary, split_by, split.as_ref())?;
        let mut lines = Vec::new();
        for line_value in split_values(&figure_table, line_by)? {
            let line_table = subset(&figure_table, line_by, line_value.as_ref())?;
            for channel in &options.channels {
                let label = match &line_value {
                    Some(value) => format!("{channel}, {value}"),
                    None => channel.clone(),
                };
                lines.push(Line::read(
                    &line_table,
                    &options.time_column,
                    channel,
                    label,
                    options.max_days,
                )?);
            }
        }

        let title = describe(split_by, split.as_ref());
        let path = svg_path(
            &options.output_dir,
            &file_stem(&[options.prefix.as_str(), title.as_str()]),
        )?;
        let y_label = options
            .y_label
            .clone()
            .unwrap_or_else(|| options.channels.join(", "));
        draw_lines(
            &path,
            &title,
            &y_label,
            &lines,
            options.y_range,
            options.start_year,
        )?;
        debug!("wrote {}", path.display());
        written.push(path);
    }
    info!("wrote {} time series figures", written.len());
    Ok(written)
}

/// Options of [`plot_insecticide_resistance`].
#[derive(Debug, Clone)]
pub struct InsecticidePlot {
    /// The channel drawn; the legend always reports EIR and cases.
    pub channel: String,
    pub group_by: String,
    pub label_column: String,
    /// Days shown and summed over.
    pub max_days: usize,
    pub output_dir: PathBuf,
}

impl Default for InsecticidePlot {
    fn default() -> Self {
        InsecticidePlot {
            channel: "Annual EIR".to_string(),
            group_by: "Mutation_Rate2".to_string(),
            label_column: "Label".to_string(),
            max_days: 6 * 365,
            output_dir: PathBuf::from("."),
        }
    }
}

/// The legend entry of one insecticide resistance arm: the arm's label, its EIR over the last
/// year shown and its total clinical cases, both truncated to integers.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn insecticide_legend(label: &str, eir: &[f64], cases: &[f64]) -> String {
    let last_year = &eir[eir.len().saturating_sub(365)..];
    let eir: f64 = last_year.iter().sum();
    let cases: f64 = cases.iter().sum();
    format!("{label}, EIR={}, Cases={}", eir as i64, cases as i64)
}

/// Inset chart summaries of the insecticide resistance experiment: one figure per value of
/// `group_by` with one line per arm label.
pub fn plot_insecticide_resistance(
    inset_summary: &SummaryTable,
    options: &InsecticidePlot,
) -> Result<Vec<PathBuf>, VgError> {
    let y_range = if options.channel.contains("Prevalence") {
        (0.0, 0.5)
    } else {
        (0.0, 2.5)
    };
    #[allow(clippy::cast_precision_loss)]
    let max_days = options.max_days as f64;
    let mut written = Vec::new();

    for group in inset_summary.distinct(&options.group_by)? {
        let group_table = inset_summary.filter(&options.group_by, &group)?;
        let mut lines = Vec::new();
        for label in group_table.distinct(&options.label_column)? {
            let arm = group_table.filter(&options.label_column, &label)?;
            let mut line = Line::read(
                &arm,
                "Time",
                &options.channel,
                String::new(),
                Some(max_days - 1.0),
            )?;
            let shown = line.points.len();
            let eir = Line::read(&arm, "Time", "Annual EIR", String::new(), Some(max_days - 1.0))?;
            let cases = Line::read(&arm, "Time", "Clinical Cases", String::new(), Some(max_days - 1.0))?;
            let values = |l: &Line| l.points.iter().map(|(_, y)| *y).collect::<Vec<_>>();
            line.label = insecticide_legend(
                &label.to_string(),
                &values(&eir)[..shown.min(eir.points.len())],
                &values(&cases),
            );
            lines.push(line);
        }

        let title = describe(Some(&options.group_by), Some(&group));
        let path = svg_path(
            &options.output_dir,
            &file_stem(&[options.channel.as_str(), title.as_str()]),
        )?;
        draw_lines(&path, &title, &options.channel, &lines, Some(y_range), None)?;
        debug!("wrote {}", path.display());
        written.push(path);
    }
    info!("wrote {} insecticide resistance figures", written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const INSET: &str = "\
Label,Mutation_Rate2,Time,Annual EIR,Clinical Cases,Annual EIR_std,Clinical Cases_std
No_resistance,0.0,0,1.5,2.0,0.1,0.0
No_resistance,0.0,1,2.5,3.0,0.1,0.0
Resistance,0.0,0,4.0,1.0,0.2,0.0
Resistance,0.0,1,4.5,1.0,0.2,0.0
No_resistance,0.001,0,1.0,1.0,0.0,0.0
No_resistance,0.001,1,1.0,1.0,0.0,0.0
";

    fn table() -> SummaryTable {
        SummaryTable::from_reader(INSET.as_bytes()).unwrap()
    }

    #[test]
    fn legend_sums_last_year_and_all_cases() {
        let eir: Vec<f64> = (0..400).map(|_| 0.01).collect();
        assert_eq!(
            insecticide_legend("No_nets", &eir, &[1.6, 2.7]),
            "No_nets, EIR=3, Cases=4"
        );
    }

    #[test]
    fn lines_are_sorted_and_truncated() {
        let table = SummaryTable::from_reader(
            "Time,EIR,EIR_std\n2,3.0,0.5\n0,1.0,0.5\n1,2.0,0.5\n".as_bytes(),
        )
        .unwrap();
        let line = Line::read(&table, "Time", "EIR", "EIR".to_string(), Some(1.0)).unwrap();
        assert_eq!(line.points, [(0.0, 1.0), (1.0 / 365.0, 2.0)]);
        assert_eq!(line.band().unwrap().len(), 4);
    }

    #[test]
    fn one_figure_per_split_value() {
        let temp_dir = tempdir().unwrap();
        let options = TimeSeriesPlot {
            channels: vec!["Annual EIR".to_string()],
            split_by: Some("Mutation_Rate2".to_string()),
            line_by: Some("Label".to_string()),
            output_dir: temp_dir.path().to_path_buf(),
            prefix: "inset".to_string(),
            ..TimeSeriesPlot::default()
        };
        let written = plot_timeseries(&table(), &options).unwrap();
        assert_eq!(
            written,
            [
                temp_dir.path().join("inset_Mutation_Rate2_0.0.svg"),
                temp_dir.path().join("inset_Mutation_Rate2_0.001.svg")
            ]
        );
        let svg = fs::read_to_string(&written[0]).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Annual EIR, Resistance"));
    }

    #[test]
    fn insecticide_figures_per_mutation_rate() {
        let temp_dir = tempdir().unwrap();
        let options = InsecticidePlot {
            output_dir: temp_dir.path().to_path_buf(),
            ..InsecticidePlot::default()
        };
        let written = plot_insecticide_resistance(&table(), &options).unwrap();
        assert_eq!(written.len(), 2);
        let svg = fs::read_to_string(&written[0]).unwrap();
        assert!(svg.contains("No_resistance, EIR=4, Cases=5"));
        assert!(svg.contains("Resistance, EIR=8, Cases=2"));
    }

    #[test]
    fn missing_channel_column() {
        let options = TimeSeriesPlot {
            channels: vec!["Prevalence".to_string()],
            output_dir: tempdir().unwrap().path().to_path_buf(),
            ..TimeSeriesPlot::default()
        };
        assert!(matches!(
            plot_timeseries(&table(), &options),
            Err(VgError::MissingColumn(_))
        ));
    }
}
