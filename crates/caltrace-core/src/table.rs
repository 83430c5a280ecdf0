use std::collections::{BTreeMap, HashSet};

use crate::error::{CaltraceError, Result};

/// Fixed column order — the binding wire contract between export and
/// import. Any reordering or renaming must fail import rather than
/// silently misalign data.
pub const COLUMNS: [&str; 4] = ["cell_id", "frame", "intensity", "normalized_intensity"];

/// One (cell, frame) observation.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRow {
    pub cell_id: u32,
    pub frame: usize,
    pub intensity: f64,
    pub normalized_intensity: f64,
}

/// The canonical tabular extraction result.
///
/// Rows are keyed by unique (cell_id, frame) pairs and held in stable
/// order: cell_id ascending, then frame ascending. Tables are immutable
/// once built; a new analysis replaces the table wholesale.
#[derive(Clone, Debug, Default)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
    cell_ids: Vec<u32>,
}

/// Per-cell summary statistics over the raw intensity series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub count: usize,
    /// True when the cell's series contains NaN samples (zero-area cell
    /// or degenerate normalization baseline).
    pub flagged: bool,
}

impl ResultTable {
    /// Build a table from rows, restoring the canonical sort order.
    pub fn new(mut rows: Vec<ResultRow>) -> Self {
        rows.sort_by(|a, b| (a.cell_id, a.frame).cmp(&(b.cell_id, b.frame)));
        let mut cell_ids: Vec<u32> = rows.iter().map(|r| r.cell_id).collect();
        cell_ids.dedup();
        Self { rows, cell_ids }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Sorted distinct cell ids present in the table.
    pub fn cell_ids(&self) -> &[u32] {
        &self.cell_ids
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Range slice for paginated display; out-of-range offsets clamp to
    /// an empty slice rather than erroring.
    pub fn get_rows(&self, offset: usize, limit: Option<usize>) -> &[ResultRow] {
        let start = offset.min(self.rows.len());
        let end = match limit {
            Some(limit) => start.saturating_add(limit).min(self.rows.len()),
            None => self.rows.len(),
        };
        &self.rows[start..end]
    }

    /// Filter to the requested cells, preserving the table's global sort
    /// order. The result's cell ids are requested ∩ present, in table
    /// order (not input order).
    pub fn select(&self, cell_ids: &[u32]) -> ResultTable {
        let wanted: HashSet<u32> = cell_ids.iter().copied().collect();
        let rows = self
            .rows
            .iter()
            .filter(|r| wanted.contains(&r.cell_id))
            .cloned()
            .collect();
        Self::new(rows)
    }

    /// Per-cell statistics over the raw intensity column. NaN samples are
    /// excluded from the moments and flag the cell instead.
    pub fn summary(&self) -> BTreeMap<u32, CellSummary> {
        let mut out = BTreeMap::new();
        let mut start = 0;
        while start < self.rows.len() {
            let cell_id = self.rows[start].cell_id;
            let mut end = start;
            while end < self.rows.len() && self.rows[end].cell_id == cell_id {
                end += 1;
            }
            out.insert(cell_id, summarize(&self.rows[start..end]));
            start = end;
        }
        out
    }

    /// Rows as strings with the fixed header first; see [`COLUMNS`].
    pub fn to_tabular(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(COLUMNS.iter().map(|c| (*c).to_string()).collect());
        for row in &self.rows {
            out.push(vec![
                row.cell_id.to_string(),
                row.frame.to_string(),
                format_float(row.intensity),
                format_float(row.normalized_intensity),
            ]);
        }
        out
    }

    /// Rebuild a table from tabular rows, validating the header exactly
    /// against [`COLUMNS`]. On any mismatch the error carries a Schema
    /// variant and no table is produced — an existing table held by the
    /// caller stays untouched.
    pub fn from_tabular(rows: &[Vec<String>]) -> Result<ResultTable> {
        let header = rows
            .first()
            .ok_or_else(|| CaltraceError::Schema("missing header row".into()))?;
        if header.len() != COLUMNS.len()
            || header.iter().zip(COLUMNS.iter()).any(|(got, want)| got != want)
        {
            return Err(CaltraceError::Schema(format!(
                "header [{}] does not match required columns [{}]",
                header.join(", "),
                COLUMNS.join(", ")
            )));
        }

        let mut parsed = Vec::with_capacity(rows.len().saturating_sub(1));
        let mut seen = HashSet::new();
        for (line, row) in rows[1..].iter().enumerate() {
            if row.len() != COLUMNS.len() {
                return Err(CaltraceError::Schema(format!(
                    "row {} has {} fields, expected {}",
                    line + 1,
                    row.len(),
                    COLUMNS.len()
                )));
            }
            let cell_id = parse_field::<u32>(&row[0], line, COLUMNS[0])?;
            let frame = parse_field::<usize>(&row[1], line, COLUMNS[1])?;
            if !seen.insert((cell_id, frame)) {
                return Err(CaltraceError::Schema(format!(
                    "duplicate (cell_id, frame) pair ({cell_id}, {frame})"
                )));
            }
            parsed.push(ResultRow {
                cell_id,
                frame,
                intensity: parse_field::<f64>(&row[2], line, COLUMNS[2])?,
                normalized_intensity: parse_field::<f64>(&row[3], line, COLUMNS[3])?,
            });
        }
        Ok(ResultTable::new(parsed))
    }

    /// Serialize to CSV bytes under the fixed-header contract.
    pub fn to_csv(&self) -> Vec<u8> {
        let mut out = String::new();
        for row in self.to_tabular() {
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out.into_bytes()
    }

    /// Parse CSV bytes under the fixed-header contract.
    pub fn from_csv(bytes: &[u8]) -> Result<ResultTable> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CaltraceError::Schema(format!("CSV is not valid UTF-8: {e}")))?;
        let rows: Vec<Vec<String>> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split(',').map(|f| f.trim().to_string()).collect())
            .collect();
        Self::from_tabular(&rows)
    }
}

/// Export a table (optionally a cell subset) as CSV bytes.
pub fn export_csv(table: &ResultTable, cell_ids: Option<&[u32]>) -> Vec<u8> {
    match cell_ids {
        Some(ids) => table.select(ids).to_csv(),
        None => table.to_csv(),
    }
}

/// Import CSV bytes into a new table, validating the export contract.
pub fn import_csv(bytes: &[u8]) -> Result<ResultTable> {
    ResultTable::from_csv(bytes)
}

fn summarize(rows: &[ResultRow]) -> CellSummary {
    let finite: Vec<f64> = rows
        .iter()
        .map(|r| r.intensity)
        .filter(|v| v.is_finite())
        .collect();
    let flagged = rows
        .iter()
        .any(|r| r.intensity.is_nan() || r.normalized_intensity.is_nan());

    if finite.is_empty() {
        return CellSummary {
            mean: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            std: f64::NAN,
            count: rows.len(),
            flagged,
        };
    }

    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    CellSummary {
        mean,
        min,
        max,
        std: var.sqrt(),
        count: rows.len(),
        flagged,
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v}")
    }
}

fn parse_field<T: std::str::FromStr>(raw: &str, line: usize, column: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        CaltraceError::Schema(format!(
            "row {}: cannot parse {column} value {raw:?}",
            line + 1
        ))
    })
}
