//! Input/Output operations for co-expression analysis

mod csv;
mod results;

pub use self::csv::{
    read_coexpression_rows, read_coverage, read_expression_table, read_mutations, read_study_profiles,
};
pub use results::{write_plot_data, write_ranked_rows, PlotDocument};
