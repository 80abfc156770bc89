//! Cross-dataset join: expression, mutations and coverage for one gene pair

mod builder;
mod plot;

pub use builder::{JoinParams, PlotDataBuilder, PlotRequest, PlotSources};
pub use plot::{join_plot_data, mutation_status, MutationOverlay, MutationStatus, PlotDatum};
