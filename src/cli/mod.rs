//! Command-line interface for rust_coexpression

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rust_coexpression")]
#[command(version)]
#[command(about = "Gene co-expression ranking with Benjamini-Hochberg q-values")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of worker threads (0 = all cores)
    #[arg(long, global = true, default_value = "0")]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank an existing table of co-expression rows
    #[command(
        long_about = "Rank an existing table of co-expression rows\n\n\
            Sorts rows by p-value (stable for ties), attaches Benjamini-Hochberg\n\
            q-values, and writes the rows admitted by --mode.",
        after_long_help = "\
Examples:
  rust_coexpression rank -i tp53_coexpression.tsv -o ranked.tsv
  rust_coexpression rank -i tp53_coexpression.tsv --mode negative --step-up"
    )]
    Rank {
        /// Co-expression rows (entrez_gene_id, hugo_gene_symbol, [cytoband], spearman_correlation, p_value)
        #[arg(short, long)]
        input: String,

        /// Output file path
        #[arg(short, long, default_value = "coexpression_ranked.tsv")]
        output: String,

        /// Rows to write: all, positive or negative
        #[arg(long, default_value = "all")]
        mode: String,

        /// Significance threshold for the summary
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,

        /// Apply the step-up monotonicity pass to q-values
        #[arg(long)]
        step_up: bool,
    },

    /// Correlate a reference gene against every other gene and rank
    #[command(after_long_help = "\
Examples:
  rust_coexpression compute -e expression.tsv -r TP53 -p brca_mrna -o ranked.tsv
  rust_coexpression compute -e expression.tsv -r 7157 -p brca_mrna --all-data")]
    Compute {
        /// Long-format expression table
        #[arg(short, long)]
        expression: String,

        /// Reference gene (Hugo symbol or Entrez id)
        #[arg(short, long)]
        reference: String,

        /// Molecular profile id
        #[arg(short, long)]
        profile: String,

        /// Report every gene instead of only those passing --threshold
        #[arg(long)]
        all_data: bool,

        /// Minimum |rho| reported without --all-data
        #[arg(long, default_value = "0.3")]
        threshold: f64,

        /// Minimum number of paired samples per gene
        #[arg(long, default_value = "3")]
        min_samples: usize,

        /// Output file path
        #[arg(short, long, default_value = "coexpression_ranked.tsv")]
        output: String,

        /// Rows to write: all, positive or negative
        #[arg(long, default_value = "all")]
        mode: String,

        /// Significance threshold for the summary
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,

        /// Apply the step-up monotonicity pass to q-values
        #[arg(long)]
        step_up: bool,
    },

    /// Join expression, mutations and coverage for a gene pair
    #[command(
        long_about = "Join expression, mutations and coverage for a gene pair\n\n\
            Without --comparison the most significant co-expressed gene is used.\n\
            Mutation status is only reported when --mutations is given.",
        after_long_help = "\
Examples:
  rust_coexpression plot -e expression.tsv -r TP53 -c MDM2 -p brca_mrna \\
    --mutations mutations.tsv --coverage coverage.tsv --study-profiles profiles.tsv"
    )]
    Plot {
        /// Long-format expression table
        #[arg(short, long)]
        expression: String,

        /// Reference gene (Hugo symbol or Entrez id)
        #[arg(short, long)]
        reference: String,

        /// Comparison gene (Hugo symbol or Entrez id)
        #[arg(short, long)]
        comparison: Option<String>,

        /// Molecular profile id
        #[arg(short, long)]
        profile: String,

        /// Mutation calls; enables the mutation overlay
        #[arg(long)]
        mutations: Option<String>,

        /// Sample coverage (study_id, sample_id, molecular_profile_id, [entrez_gene_id])
        #[arg(long)]
        coverage: Option<String>,

        /// Study to mutation profile map (study_id, molecular_profile_id)
        #[arg(long)]
        study_profiles: Option<String>,

        /// Output JSON path
        #[arg(short, long, default_value = "coexpression_plot.json")]
        output: String,
    },
}
