use anyhow::Result;
use std::path::PathBuf;

use super::main::PlotCommand;
use crate::demographics::Demographics;
use crate::plot::{
    plot_insecticide_resistance, plot_spatial, plot_timeseries, InsecticidePlot, SpatialPlot,
    TimeSeriesPlot,
};
use crate::table::SummaryTable;

pub fn plot(command: &PlotCommand) -> Result<()> {
    let written: Vec<PathBuf> = match command {
        PlotCommand::Timeseries(args) => {
            let summary = SummaryTable::read_csv(&args.summary)?;
            let options = TimeSeriesPlot {
                channels: args.channels.clone(),
                time_column: args.time_column.clone(),
                split_by: args.split_by.clone(),
                line_by: args.line_by.clone(),
                max_days: args.max_days,
                start_year: args.start_year,
                output_dir: args.output_dir.clone(),
                prefix: args.prefix.clone(),
                ..TimeSeriesPlot::default()
            };
            plot_timeseries(&summary, &options)?
        }
        PlotCommand::Insecticide(args) => {
            let summary = SummaryTable::read_csv(&args.summary)?;
            let options = InsecticidePlot {
                channel: args.channel.clone(),
                max_days: args.max_days,
                output_dir: args.output_dir.clone(),
                ..InsecticidePlot::default()
            };
            plot_insecticide_resistance(&summary, &options)?
        }
        PlotCommand::Spatial(args) => {
            let summary = SummaryTable::read_csv(&args.summary)?;
            let demographics = Demographics::load(&args.demographics)?;
            let options = SpatialPlot {
                channel: args.channel.clone(),
                times: args.times.clone(),
                panel_by: args.panel_by.clone(),
                highlight_largest: args.highlight,
                output_dir: args.output_dir.clone(),
                ..SpatialPlot::default()
            };
            plot_spatial(&summary, &demographics, &options)?
        }
    };
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
