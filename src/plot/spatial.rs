use super::{file_stem, finite_range, plasma, split_values, svg_path};
use crate::demographics::Demographics;
use crate::error::VgError;
use crate::log::{info, warn};
use crate::sweep::TagValue;
use crate::table::SummaryTable;
use plotters::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

/// Options of [`plot_spatial`].
#[derive(Debug, Clone)]
pub struct SpatialPlot {
    pub channel: String,
    /// The days to draw, one figure each.
    pub times: Vec<i64>,
    pub time_column: String,
    pub node_column: String,
    /// One panel per distinct value of this column, side by side.
    pub panel_by: Option<String>,
    /// Outlines this many of the most populous nodes, where releases happen.
    pub highlight_largest: usize,
    pub output_dir: PathBuf,
}

impl Default for SpatialPlot {
    fn default() -> Self {
        SpatialPlot {
            channel: "Prevalence".to_string(),
            times: vec![180, 1094, 2189],
            time_column: "time".to_string(),
            node_column: "node".to_string(),
            panel_by: None,
            highlight_largest: 6,
            output_dir: PathBuf::from("."),
        }
    }
}

/// A node's position and value: `(longitude, latitude, value)`.
type NodePoint = (f64, f64, f64);

fn node_points(
    table: &SummaryTable,
    demographics: &Demographics,
    options: &SpatialPlot,
) -> Result<Vec<NodePoint>, VgError> {
    let nodes = table.tags(&options.node_column)?;
    let values = table.numbers(&options.channel)?;
    let mut points = Vec::with_capacity(nodes.len());
    let mut unknown = 0usize;
    for (node, value) in nodes.iter().zip(values) {
        let attributes = match node {
            TagValue::Int(id) => u32::try_from(*id).ok(),
            _ => None,
        }
        .and_then(|id| demographics.node(id))
        .map(|n| &n.attributes);
        match attributes {
            Some(a) => points.push((a.longitude, a.latitude, value)),
            None => unknown += 1,
        }
    }
    if unknown > 0 {
        warn!("{unknown} rows refer to nodes missing from the demographics");
    }
    Ok(points)
}

/// Maps of `channel` over the nodes of `demographics`, one figure per requested time.
///
/// Node squares are colored on a plasma ramp over `[0, 1]`; values are fractions such as
/// prevalence or genome frequency. The most populous nodes are outlined.
pub fn plot_spatial(
    summary: &SummaryTable,
    demographics: &Demographics,
    options: &SpatialPlot,
) -> Result<Vec<PathBuf>, VgError> {
    let (lon_min, lon_max) = finite_range(demographics.nodes.iter().map(|n| n.attributes.longitude))
        .ok_or_else(|| VgError::PlotError("demographics have no nodes".to_string()))?;
    let (lat_min, lat_max) = finite_range(demographics.nodes.iter().map(|n| n.attributes.latitude))
        .ok_or_else(|| VgError::PlotError("demographics have no nodes".to_string()))?;
    let lon_range = (lon_min - 0.02)..(lon_max + 0.02);
    let lat_range = (lat_min - 0.04)..(lat_max + 0.02);

    let largest: HashSet<u32> = demographics
        .find_n_largest(options.highlight_largest)
        .into_iter()
        .collect();
    let release_points: Vec<(f64, f64)> = demographics
        .nodes
        .iter()
        .filter(|n| largest.contains(&n.node_id))
        .map(|n| (n.attributes.longitude, n.attributes.latitude))
        .collect();

    let panels = split_values(summary, options.panel_by.as_deref())?;
    let mut written = Vec::new();
    for &time in &options.times {
        let at_time = summary.filter(&options.time_column, &TagValue::Int(time))?;
        if at_time.is_empty() {
            warn!("no {} rows at time {time}", options.channel);
        }

        let time_label = time.to_string();
        let path = svg_path(
            &options.output_dir,
            &file_stem(&["spatial", options.channel.as_str(), time_label.as_str()]),
        )?;
        let width = u32::try_from(panels.len()).unwrap_or(1).max(1) * 500;
        {
            let root = SVGBackend::new(&path, (width, 560)).into_drawing_area();
            root.fill(&WHITE)?;
            let root = root.titled(&format!("{} at day {time}", options.channel), ("sans-serif", 22))?;
            let areas = root.split_evenly((1, panels.len().max(1)));

            for (area, panel) in areas.iter().zip(&panels) {
                let table = match (options.panel_by.as_deref(), panel) {
                    (Some(column), Some(value)) => at_time.filter(column, value)?,
                    _ => at_time.clone(),
                };
                let caption = panel.as_ref().map(ToString::to_string).unwrap_or_default();
                let mut chart = ChartBuilder::on(area)
                    .caption(caption, ("sans-serif", 18))
                    .margin(15)
                    .build_cartesian_2d(lon_range.clone(), lat_range.clone())?;

                chart.draw_series(node_points(&table, demographics, options)?.into_iter().map(
                    |(lon, lat, value)| {
                        EmptyElement::at((lon, lat))
                            + Rectangle::new([(-5, -5), (5, 5)], plasma(value).filled())
                            + Rectangle::new([(-5, -5), (5, 5)], RGBColor(192, 192, 192).stroke_width(1))
                    },
                ))?;
                chart.draw_series(release_points.iter().map(|&(lon, lat)| {
                    EmptyElement::at((lon, lat))
                        + Rectangle::new([(-6, -6), (6, 6)], BLACK.stroke_width(2))
                }))?;
            }
            root.present()?;
        }
        written.push(path);
    }
    info!("wrote {} spatial figures", written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const DEMOGRAPHICS: &str = r#"{"Nodes": [
        {"NodeID": 1, "NodeAttributes": {"InitialPopulation": 100, "Latitude": 12.0, "Longitude": -1.5}},
        {"NodeID": 2, "NodeAttributes": {"InitialPopulation": 900, "Latitude": 12.1, "Longitude": -1.4}},
        {"NodeID": 3, "NodeAttributes": {"InitialPopulation": 300, "Latitude": 12.2, "Longitude": -1.6}}
    ]}"#;

    const SUMMARY: &str = "\
Label,time,node,Prevalence,Prevalence_std
GM_only,180,1,0.2,0.0
GM_only,180,2,0.9,0.0
VC_and_GM,180,1,0.1,0.0
VC_and_GM,180,9,0.5,0.0
GM_only,365,1,0.3,0.0
";

    fn summary() -> SummaryTable {
        SummaryTable::from_reader(SUMMARY.as_bytes()).unwrap()
    }

    #[test]
    fn points_join_demographics() {
        let demographics = Demographics::parse(DEMOGRAPHICS.as_bytes()).unwrap();
        let table = summary().filter("Label", &TagValue::from("VC_and_GM")).unwrap();
        let points = node_points(&table, &demographics, &SpatialPlot::default()).unwrap();
        assert_eq!(points, [(-1.5, 12.0, 0.1)]);
    }

    #[test]
    fn one_figure_per_time() {
        let temp_dir = tempdir().unwrap();
        let demographics = Demographics::parse(DEMOGRAPHICS.as_bytes()).unwrap();
        let options = SpatialPlot {
            times: vec![180, 365],
            panel_by: Some("Label".to_string()),
            highlight_largest: 1,
            output_dir: temp_dir.path().to_path_buf(),
            ..SpatialPlot::default()
        };
        let written = plot_spatial(&summary(), &demographics, &options).unwrap();
        assert_eq!(
            written,
            [
                temp_dir.path().join("spatial_Prevalence_180.svg"),
                temp_dir.path().join("spatial_Prevalence_365.svg")
            ]
        );
        let svg = fs::read_to_string(&written[0]).unwrap();
        assert!(svg.contains("VC_and_GM"));
    }

    #[test]
    fn empty_demographics() {
        let demographics = Demographics::parse(br#"{"Nodes": []}"#).unwrap();
        let options = SpatialPlot {
            output_dir: tempdir().unwrap().path().to_path_buf(),
            ..SpatialPlot::default()
        };
        assert!(matches!(
            plot_spatial(&summary(), &demographics, &options),
            Err(VgError::PlotError(_))
        ));
    }
}
