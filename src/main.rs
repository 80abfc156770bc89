//! rust_coexpression command-line interface

use clap::Parser;
use log::{info, warn, LevelFilter};
use std::rc::Rc;

use rust_coexpression::cli::{Cli, Commands};
use rust_coexpression::prelude::*;
use rust_coexpression::CoExpressionSession;

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    let result = match cli.command {
        Commands::Rank {
            input,
            output,
            mode,
            alpha,
            step_up,
        } => run_rank(&input, &output, &mode, alpha, step_up),
        Commands::Compute {
            expression,
            reference,
            profile,
            all_data,
            threshold,
            min_samples,
            output,
            mode,
            alpha,
            step_up,
        } => run_compute(
            &expression,
            &reference,
            &profile,
            all_data,
            CorrelationParams {
                min_samples,
                threshold,
            },
            &output,
            &mode,
            alpha,
            step_up,
        ),
        Commands::Plot {
            expression,
            reference,
            comparison,
            profile,
            mutations,
            coverage,
            study_profiles,
            output,
        } => run_plot(
            &expression,
            &reference,
            comparison.as_deref(),
            &profile,
            mutations.as_deref(),
            coverage.as_deref(),
            study_profiles.as_deref(),
            &output,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn ranking_params(step_up: bool) -> RankingParams {
    RankingParams {
        fdr_method: if step_up { FdrMethod::StepUp } else { FdrMethod::Positional },
        ..RankingParams::default()
    }
}

/// Filter by display mode, write, and print the summary
fn write_filtered(rows: &[RankedRow], mode: &str, output_path: &str, alpha: f64) -> Result<()> {
    let mode: DisplayMode = mode.parse()?;
    let visible: Vec<RankedRow> = rows.iter().filter(|r| mode.admits(&r.row)).cloned().collect();

    info!("Writing {} of {} rows ({:?}) to: {}", visible.len(), rows.len(), mode, output_path);
    write_ranked_rows(output_path, &visible)?;

    println!("{}", RankingSummary::from_rows(rows, alpha));
    Ok(())
}

fn run_rank(input_path: &str, output_path: &str, mode: &str, alpha: f64, step_up: bool) -> Result<()> {
    info!("Loading co-expression rows from: {}", input_path);
    let raw = read_coexpression_rows(input_path)?;
    info!("  {} rows", raw.len());

    let ranked = rank(&raw, &ranking_params(step_up));
    write_filtered(&ranked, mode, output_path, alpha)?;

    info!("Done!");
    Ok(())
}

fn load_table(expression_path: &str) -> Result<Rc<ExpressionTable>> {
    info!("Loading expression table from: {}", expression_path);
    let table = read_expression_table(expression_path)?;
    info!("  {} values", table.n_records());
    Ok(Rc::new(table))
}

fn resolve(table: &ExpressionTable, name: &str) -> Result<Gene> {
    table
        .resolve_gene(name)
        .ok_or_else(|| CoexprError::GeneNotFound { gene: name.to_string() })
}

#[allow(clippy::too_many_arguments)]
fn run_compute(
    expression_path: &str,
    reference: &str,
    profile: &str,
    all_data: bool,
    correlation: CorrelationParams,
    output_path: &str,
    mode: &str,
    alpha: f64,
    step_up: bool,
) -> Result<()> {
    let table = load_table(expression_path)?;
    let reference = resolve(&table, reference)?;

    info!(
        "Correlating {} against {} genes in {}...",
        reference.hugo_gene_symbol,
        table.genes_in_profile(profile).len(),
        profile
    );
    let pipeline = RankingPipeline::from_source(CorrelationSource::new(table, correlation), ranking_params(step_up));
    let query = CoExpressionQuery::new(reference.entrez_gene_id, profile, GeneScope::from_all_data(all_data));

    let ranked = match pipeline.ranked(&query).into_result()? {
        Some(ranked) => ranked,
        None => {
            return Err(CoexprError::EmptyData {
                reason: "Co-expression data did not load".to_string(),
            })
        }
    };
    write_filtered(&ranked, mode, output_path, alpha)?;

    info!("Done!");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_plot(
    expression_path: &str,
    reference: &str,
    comparison: Option<&str>,
    profile: &str,
    mutations_path: Option<&str>,
    coverage_path: Option<&str>,
    study_profiles_path: Option<&str>,
    output_path: &str,
) -> Result<()> {
    let table = load_table(expression_path)?;
    let reference = resolve(&table, reference)?;
    let comparison = comparison.map(|name| resolve(&table, name)).transpose()?;

    let mutations = mutations_path.map(read_mutations).transpose()?;
    if mutations.is_some() && (coverage_path.is_none() || study_profiles_path.is_none()) {
        warn!("Mutation overlay without --coverage and --study-profiles: unmutated samples will be NOT_PROFILED");
    }
    let coverage = coverage_path.map(read_coverage).transpose()?.unwrap_or_default();
    let study_profiles = study_profiles_path.map(read_study_profiles).transpose()?.unwrap_or_default();

    let session = CoExpressionSession::from_tables(
        table,
        mutations,
        coverage,
        study_profiles,
        CorrelationParams::default(),
        RankingParams::default(),
    );

    let _subscription = match &comparison {
        Some(gene) => {
            let row = CoExpressionRow::new(gene.clone(), f64::NAN, f64::NAN);
            session.store.set_highlighted(Some(RankedRow { row, q_value: f64::NAN }));
            None
        }
        None => {
            let query = CoExpressionQuery::new(reference.entrez_gene_id, profile, GeneScope::All);
            let subscription = session.store.watch(&session.pipeline, query);
            Some(subscription)
        }
    };

    let highlighted = session.store.highlighted().ok_or_else(|| CoexprError::EmptyData {
        reason: format!("No gene is co-expressed with {}", reference.hugo_gene_symbol),
    })?;
    info!(
        "Joining {} vs {} on {}",
        reference.hugo_gene_symbol,
        highlighted.gene().hugo_gene_symbol,
        profile
    );

    let data = match session.plot_for_highlighted(&reference, profile).into_result()? {
        Some(data) => data,
        None => {
            return Err(CoexprError::EmptyData {
                reason: "Plot data did not load".to_string(),
            })
        }
    };
    info!("  {} samples", data.len());

    info!("Writing plot data to: {}", output_path);
    write_plot_data(
        output_path,
        &PlotDocument {
            molecular_profile_id: profile,
            reference_gene: &reference,
            comparison_gene: highlighted.gene(),
            data: &data,
        },
    )?;

    info!("Done!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn expression_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "study_id\tsample_id\tmolecular_profile_id\tentrez_gene_id\thugo_gene_symbol\tvalue").unwrap();
        let profiles: [(i64, &str, [f64; 5]); 3] = [
            (7157, "TP53", [1.0, 2.0, 3.0, 4.0, 5.0]),
            (4193, "MDM2", [1.5, 2.5, 3.1, 4.8, 5.2]),
            (1029, "CDKN2A", [5.0, 3.0, 4.0, 1.0, 2.0]),
        ];
        for (id, symbol, values) in profiles {
            for (i, value) in values.iter().enumerate() {
                writeln!(file, "brca\tS{}\tbrca_mrna\t{}\t{}\t{}", i + 1, id, symbol, value).unwrap();
            }
        }
        file
    }

    #[test]
    fn test_plot_defaults_to_top_gene() {
        let expression = expression_file();
        let output = NamedTempFile::new().unwrap();
        let output_path = output.path().to_str().unwrap();
        let expression_path = expression.path().to_str().unwrap();

        run_plot(expression_path, "TP53", None, "brca_mrna", None, None, None, output_path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output.path()).unwrap()).unwrap();
        assert_eq!(value["comparison_gene"]["hugo_gene_symbol"], "MDM2");
        assert_eq!(value["data"].as_array().unwrap().len(), 5);
        assert!(value["data"][0]["x_mutation_status"].is_null());
    }

    #[test]
    fn test_compute_writes_visible_rows() {
        let expression = expression_file();
        let output = NamedTempFile::new().unwrap();

        run_compute(
            expression.path().to_str().unwrap(),
            "7157",
            "brca_mrna",
            true,
            CorrelationParams::default(),
            output.path().to_str().unwrap(),
            "negative",
            0.05,
            false,
        )
        .unwrap();

        let content = std::fs::read_to_string(output.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1029\tCDKN2A"));
    }
}
