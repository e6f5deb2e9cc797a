use std::fs::{self, File};
use std::io::BufWriter;

use tracing::info;

use crate::comparison::{
    cross_reference, export_csv, log_distribution, print_table, rank_order, top_k, write_report,
    ComparisonReport, ComparisonRow,
};
use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::plots::{render_comparison, render_distribution, COMPARISON_FILE, DISTRIBUTION_FILE};
use crate::rank_data::{read_id_urls, read_rank_table, write_rank_table, RankRecord};

/// Everything that gets plotted, computed before any output is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub ranked: Vec<RankRecord>,
    pub distribution: Vec<(usize, f64)>,
    pub comparison: Vec<ComparisonRow>,
}

impl Analysis {
    fn log_range(&self) -> (f64, f64) {
        self.distribution
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            })
    }
}

pub fn prepare(config: &Config) -> Result<Analysis> {
    let new_ranks = read_rank_table(&config.new_ranks)?;
    let old_ranks = read_rank_table(&config.old_ranks)?;
    let urls = read_id_urls(&config.id_urls)?;

    if new_ranks.is_empty() {
        return Err(AnalysisError::EmptyTable {
            path: config.new_ranks.clone(),
        });
    }

    let ranked = rank_order(&new_ranks);
    let distribution = log_distribution(&ranked)?;

    let top = top_k(&new_ranks, config.top);
    let comparison = cross_reference(&top, &old_ranks, &urls)?;
    info!(top = comparison.len(), "cross-referenced top pages");

    Ok(Analysis {
        ranked,
        distribution,
        comparison,
    })
}

/// Writes the plots and any requested reports.
pub fn render(config: &Config, analysis: &Analysis) -> Result<()> {
    fs::create_dir_all(&config.out_dir).map_err(|e| AnalysisError::io(&config.out_dir, e))?;

    render_distribution(&config.out_dir.join(DISTRIBUTION_FILE), &analysis.distribution)?;
    render_comparison(
        &config.out_dir.join(COMPARISON_FILE),
        &analysis.comparison,
        &config.new_label,
        &config.old_label,
    )?;

    if let Some(path) = &config.export_ranked {
        let file = File::create(path).map_err(|e| AnalysisError::io(path, e))?;
        write_rank_table(BufWriter::new(file), &analysis.ranked)?;
        info!(path = %path.display(), rows = analysis.ranked.len(), "exported ranked table");
    }

    if let Some(path) = &config.export_csv {
        export_csv(path, &analysis.comparison)?;
        info!(path = %path.display(), "exported comparison csv");
    }

    if let Some(path) = &config.report {
        let (min_log_score, max_log_score) = analysis.log_range();
        let report = ComparisonReport {
            new_label: &config.new_label,
            old_label: &config.old_label,
            ranked_pages: analysis.ranked.len(),
            min_log_score,
            max_log_score,
            top: &analysis.comparison,
        };
        write_report(path, &report)?;
        info!(path = %path.display(), "wrote json report");
    }

    Ok(())
}

pub fn run(config: &Config) -> Result<Analysis> {
    let analysis = prepare(config)?;
    render(config, &analysis)?;
    print_table(&analysis.comparison, &config.new_label, &config.old_label);
    Ok(analysis)
}
