//! Writers for ranked co-expression rows and plot data

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data::{Gene, RankedRow};
use crate::error::Result;
use crate::join::PlotDatum;

/// Write ranked rows as TSV, in the given order
pub fn write_ranked_rows<P: AsRef<Path>>(path: P, rows: &[RankedRow]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(
        file,
        "entrez_gene_id\thugo_gene_symbol\tcytoband\tspearman_correlation\tp_value\tq_value"
    )?;

    for r in rows {
        let gene = r.gene();
        writeln!(
            file,
            "{}\t{}\t{}\t{:.6}\t{:.6e}\t{:.6e}",
            gene.entrez_gene_id,
            gene.hugo_gene_symbol,
            gene.cytoband.as_deref().unwrap_or(""),
            r.spearman_correlation(),
            r.p_value(),
            r.q_value,
        )?;
    }

    file.flush()?;
    Ok(())
}

/// Plot data together with the gene pair it was built for
#[derive(Debug, Serialize)]
pub struct PlotDocument<'a> {
    pub molecular_profile_id: &'a str,
    pub reference_gene: &'a Gene,
    pub comparison_gene: &'a Gene,
    pub data: &'a [PlotDatum],
}

/// Write plot data as pretty-printed JSON
pub fn write_plot_data<P: AsRef<Path>>(path: P, document: &PlotDocument<'_>) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, document)?;
    Ok(())
}
