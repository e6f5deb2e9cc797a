use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;

use crate::comparison::DEFAULT_TOP_K;

/// Plots PageRank results computed after two different iteration counts.
///
/// Every option defaults to the file names the PageRank run writes, so the
/// tool can be started without arguments next to its output.
#[derive(Parser, Debug, Clone)]
#[command(name = "pages_analysis", version)]
pub struct Config {
    /// Rank file computed with more iterations
    #[arg(long, default_value = "output_15_linkgraph.txt")]
    pub new_ranks: PathBuf,

    /// Rank file computed with fewer iterations
    #[arg(long, default_value = "output_5_linkgraph.txt")]
    pub old_ranks: PathBuf,

    /// Identifier to url mapping
    #[arg(long, default_value = "id-url.txt")]
    pub id_urls: PathBuf,

    /// Number of top pages to compare
    #[arg(long, default_value_t = DEFAULT_TOP_K, value_parser = clap::value_parser!(u64).range(1..).map(|k| k as usize))]
    pub top: usize,

    /// Legend label for the new rank file
    #[arg(long, default_value = "15 iterations")]
    pub new_label: String,

    /// Legend label for the old rank file
    #[arg(long, default_value = "5 iterations")]
    pub old_label: String,

    /// Directory the plots are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Also write the top pages comparison as CSV
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Also write the new rank file sorted by descending score
    #[arg(long)]
    pub export_ranked: Option<PathBuf>,

    /// Also write a JSON summary of the run
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["pages_analysis"]).unwrap();
        assert_eq!(config.new_ranks, PathBuf::from("output_15_linkgraph.txt"));
        assert_eq!(config.old_ranks, PathBuf::from("output_5_linkgraph.txt"));
        assert_eq!(config.id_urls, PathBuf::from("id-url.txt"));
        assert_eq!(config.top, 20);
        assert_eq!(config.out_dir, PathBuf::from("."));
        assert!(config.export_csv.is_none());
        assert!(config.report.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "pages_analysis",
            "--top",
            "5",
            "--new-ranks",
            "a.txt",
            "--report",
            "out.json",
        ])
        .unwrap();
        assert_eq!(config.top, 5);
        assert_eq!(config.new_ranks, PathBuf::from("a.txt"));
        assert_eq!(config.report, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_zero_top_rejected() {
        assert!(Config::try_parse_from(["pages_analysis", "--top", "0"]).is_err());
    }
}
