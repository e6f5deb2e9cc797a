use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::rank_data::{score_index, IdUrlMap, PageId, RankRecord};

pub const DEFAULT_TOP_K: usize = 20;

/// One page of the top-K list with its score under both iteration counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub position: usize,
    pub id: PageId,
    pub url: String,
    pub label: String,
    pub new_score: f64,
    pub old_score: f64,
}

#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub new_label: &'a str,
    pub old_label: &'a str,
    pub ranked_pages: usize,
    pub min_log_score: f64,
    pub max_log_score: f64,
    pub top: &'a [ComparisonRow],
}

/// Orders records by descending score.
///
/// Sorts ascending (stable) and reverses, so among equal scores the row that
/// came later in the file ranks higher.
pub fn rank_order(records: &[RankRecord]) -> Vec<RankRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked.reverse();
    ranked
}

/// The `k` highest-scoring records, or all of them if there are fewer.
pub fn top_k(records: &[RankRecord], k: usize) -> Vec<RankRecord> {
    let mut ranked = rank_order(records);
    ranked.truncate(k);
    ranked
}

/// `(rank, log10(score))` for every record of an already ranked table.
pub fn log_distribution(ranked: &[RankRecord]) -> Result<Vec<(usize, f64)>> {
    let degenerate: Vec<(usize, &RankRecord)> = ranked
        .iter()
        .enumerate()
        .filter(|(_, r)| !(r.score.is_finite() && r.score > 0.0))
        .collect();

    if let Some(&(position, first)) = degenerate.first() {
        warn!(
            count = degenerate.len(),
            position,
            id = first.id,
            score = first.score,
            "non-positive scores cannot be plotted on a log scale"
        );
        return Err(AnalysisError::DegenerateScore {
            position,
            id: first.id,
            score: first.score,
            count: degenerate.len(),
        });
    }

    Ok(ranked
        .iter()
        .enumerate()
        .map(|(i, r)| (i, r.score.log10()))
        .collect())
}

/// Drops the scheme, e.g. `http://b.com` becomes `b.com`.
pub fn axis_label(url: &str) -> &str {
    match url.split_once("//") {
        Some((_, rest)) => rest,
        None => url,
    }
}

/// Looks every top page up in the old rank table and the url mapping.
pub fn cross_reference(
    top: &[RankRecord],
    old: &[RankRecord],
    urls: &IdUrlMap,
) -> Result<Vec<ComparisonRow>> {
    let old_scores = score_index(old);

    top.iter()
        .enumerate()
        .map(|(position, record)| {
            let old_score = *old_scores
                .get(&record.id)
                .ok_or(AnalysisError::MissingScore { id: record.id })?;
            let url = urls
                .get(&record.id)
                .ok_or(AnalysisError::MissingUrl { id: record.id })?;
            debug!(id = record.id, url = %url, old_score, "resolved top page");

            Ok(ComparisonRow {
                position,
                id: record.id,
                url: url.clone(),
                label: axis_label(url).to_string(),
                new_score: record.score,
                old_score,
            })
        })
        .collect()
}

pub fn print_table(rows: &[ComparisonRow], new_label: &str, old_label: &str) {
    println!(
        "{:>4}  {:<48} {:>14} {:>14}",
        "#", "page", new_label, old_label
    );
    for row in rows {
        println!(
            "{:>4}  {:<48} {:>14.6e} {:>14.6e}",
            row.position + 1,
            row.label,
            row.new_score,
            row.old_score
        );
    }
}

pub fn export_csv(path: &Path, rows: &[ComparisonRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}

pub fn write_report(path: &Path, report: &ComparisonReport) -> Result<()> {
    let file = File::create(path).map_err(|e| AnalysisError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush().map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[(PageId, f64)]) -> Vec<RankRecord> {
        rows.iter()
            .map(|&(id, score)| RankRecord { id, score })
            .collect()
    }

    #[test]
    fn test_top_k() {
        let table = records(&[(1, 0.5), (2, 0.9), (3, 0.1)]);
        assert_eq!(top_k(&table, 2), records(&[(2, 0.9), (1, 0.5)]));
    }

    #[test]
    fn test_top_k_short_table() {
        let table = records(&[(1, 0.5), (2, 0.9), (3, 0.1)]);
        let top = top_k(&table, DEFAULT_TOP_K);
        assert_eq!(top.len(), 3);
        assert_eq!(top, records(&[(2, 0.9), (1, 0.5), (3, 0.1)]));
    }

    #[test]
    fn test_top_k_sorted_descending() {
        let table: Vec<RankRecord> = (0..50)
            .map(|i| RankRecord {
                id: i,
                score: ((i * 37) % 23) as f64 / 100.0,
            })
            .collect();
        let top = top_k(&table, 20);
        assert_eq!(top.len(), 20);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_favour_later_rows() {
        let table = records(&[(7, 0.3), (8, 0.3), (9, 0.3), (1, 0.1)]);
        let ids: Vec<PageId> = rank_order(&table).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 8, 7, 1]);
    }

    #[test]
    fn test_log_distribution() {
        let ranked = rank_order(&records(&[(1, 0.01), (2, 1.0), (3, 0.1)]));
        let points = log_distribution(&ranked).unwrap();
        assert_eq!(points.len(), 3);
        for (i, (x, y)) in points.iter().enumerate() {
            assert_eq!(*x, i);
            assert_eq!(*y, ranked[i].score.log10());
        }
        assert_eq!(points[0].1, 0.0);
    }

    #[test]
    fn test_log_distribution_rejects_non_positive() {
        let ranked = rank_order(&records(&[(1, 0.2), (2, 0.0), (3, -0.1)]));
        match log_distribution(&ranked).unwrap_err() {
            AnalysisError::DegenerateScore {
                position,
                id,
                count,
                ..
            } => {
                assert_eq!(position, 1);
                assert_eq!(id, 2);
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_axis_label() {
        let mut urls = IdUrlMap::new();
        urls.insert(1, "http://a.com".to_string());
        urls.insert(2, "http://b.com".to_string());
        assert_eq!(axis_label(&urls[&2]), "b.com");
        assert_eq!(axis_label("https://x.org/a//b"), "x.org/a//b");
        assert_eq!(axis_label("plain-name"), "plain-name");
    }

    #[test]
    fn test_cross_reference() {
        let top = records(&[(2, 0.9), (1, 0.5)]);
        let old = records(&[(1, 0.4), (2, 0.6), (3, 0.2)]);
        let mut urls = IdUrlMap::new();
        urls.insert(1, "http://a.com".to_string());
        urls.insert(2, "http://b.com".to_string());

        let rows = cross_reference(&top, &old, &urls).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "b.com");
        assert_eq!(rows[0].new_score, 0.9);
        assert_eq!(rows[0].old_score, 0.6);
        assert_eq!(rows[1].position, 1);
        assert_eq!(rows[1].old_score, 0.4);
    }

    #[test]
    fn test_cross_reference_missing_old_score() {
        let top = records(&[(5, 0.9)]);
        let old = records(&[(1, 0.4)]);
        let mut urls = IdUrlMap::new();
        urls.insert(5, "http://e.com".to_string());

        let err = cross_reference(&top, &old, &urls).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingScore { id: 5 }));
    }

    #[test]
    fn test_cross_reference_missing_url() {
        let top = records(&[(1, 0.9)]);
        let old = records(&[(1, 0.4)]);

        let err = cross_reference(&top, &old, &IdUrlMap::new()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingUrl { id: 1 }));
    }

    #[test]
    fn test_export_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top.csv");
        let rows = vec![ComparisonRow {
            position: 0,
            id: 2,
            url: "http://b.com".to_string(),
            label: "b.com".to_string(),
            new_score: 0.9,
            old_score: 0.6,
        }];
        export_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("position,id,url,label,new_score,old_score")
        );
        assert_eq!(lines.next(), Some("0,2,http://b.com,b.com,0.9,0.6"));
    }
}
