use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::info;

use crate::error::{AnalysisError, Result};

pub type PageId = u64;

/// One row of a rank file: a page and its PageRank score.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct RankRecord {
    pub id: PageId,
    pub score: f64,
}

pub type IdUrlMap = HashMap<PageId, String>;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    Ok(BufReader::new(file))
}

/// Yields `(line_number, fields)` for every row that carries data.
fn data_rows<'a, R: BufRead + 'a>(
    reader: R,
    path: &'a Path,
) -> impl Iterator<Item = Result<(usize, Vec<String>)>> + 'a {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(AnalysisError::io(path, e))),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            let fields = trimmed.split_whitespace().map(str::to_string).collect();
            Some(Ok((i + 1, fields)))
        })
}

fn parse_id(field: &str, path: &Path, line: usize) -> Result<PageId> {
    field.parse::<PageId>().map_err(|e| AnalysisError::MalformedRow {
        path: path.to_path_buf(),
        line,
        reason: format!("bad identifier {:?}: {}", field, e),
    })
}

/// Parses `<identifier> <score>` rows, keeping file order.
pub fn parse_rank_table<R: BufRead>(reader: R, path: &Path) -> Result<Vec<RankRecord>> {
    let mut records = Vec::new();

    for row in data_rows(reader, path) {
        let (line, fields) = row?;
        if fields.len() != 2 {
            return Err(AnalysisError::MalformedRow {
                path: path.to_path_buf(),
                line,
                reason: format!("expected 2 columns, found {}", fields.len()),
            });
        }

        let id = parse_id(&fields[0], path, line)?;
        let score = fields[1]
            .parse::<f64>()
            .map_err(|e| AnalysisError::MalformedRow {
                path: path.to_path_buf(),
                line,
                reason: format!("bad score {:?}: {}", fields[1], e),
            })?;

        records.push(RankRecord { id, score });
    }

    Ok(records)
}

pub fn read_rank_table(path: &Path) -> Result<Vec<RankRecord>> {
    let records = parse_rank_table(open(path)?, path)?;
    info!(path = %path.display(), rows = records.len(), "loaded rank table");
    Ok(records)
}

/// Parses `<identifier> <url>` rows. Trailing columns are ignored and a
/// repeated identifier keeps its last url.
pub fn parse_id_urls<R: BufRead>(reader: R, path: &Path) -> Result<IdUrlMap> {
    let mut urls = IdUrlMap::new();

    for row in data_rows(reader, path) {
        let (line, mut fields) = row?;
        if fields.len() < 2 {
            return Err(AnalysisError::MalformedRow {
                path: path.to_path_buf(),
                line,
                reason: "expected an identifier and a url".to_string(),
            });
        }

        let id = parse_id(&fields[0], path, line)?;
        urls.insert(id, fields.swap_remove(1));
    }

    Ok(urls)
}

pub fn read_id_urls(path: &Path) -> Result<IdUrlMap> {
    let urls = parse_id_urls(open(path)?, path)?;
    info!(path = %path.display(), pages = urls.len(), "loaded id-url mapping");
    Ok(urls)
}

/// Writes records as headerless `<identifier>\t<score>` rows.
pub fn write_rank_table<W: Write>(writer: W, records: &[RankRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

/// Score lookup by page. The first row wins when a page repeats.
pub fn score_index(records: &[RankRecord]) -> HashMap<PageId, f64> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        index.entry(record.id).or_insert(record.score);
    }
    index
}
