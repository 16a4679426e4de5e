//! Case tables: the physical view of the network the OPF runs on.
//!
//! Tables use internal indexing: `gen[:, GEN_BUS]` holds a row index into
//! the bus table, not an external bus number.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{OpfxError, OpfxResult};

/// Which case table a [`Table`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Bus,
    Gen,
    Branch,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Bus => "bus",
            TableKind::Gen => "gen",
            TableKind::Branch => "branch",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major numeric table with MATPOWER column layout.
///
/// Rows may have different lengths: solvers append multiplier columns to the
/// rows they touch. Writes past the end of a row pad it with zeros; reads
/// past the end are errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    kind: TableKind,
    rows: Vec<Vec<f64>>,
}

impl Table {
    pub fn new(kind: TableKind, rows: Vec<Vec<f64>>) -> Self {
        Self { kind, rows }
    }

    pub fn empty(kind: TableKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> OpfxResult<f64> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .ok_or(OpfxError::CellOutOfRange {
                table: self.kind.as_str(),
                row,
                col,
            })
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> OpfxResult<()> {
        let kind = self.kind;
        let r = self.rows.get_mut(row).ok_or(OpfxError::CellOutOfRange {
            table: kind.as_str(),
            row,
            col,
        })?;
        if r.len() <= col {
            r.resize(col + 1, 0.0);
        }
        r[col] = value;
        Ok(())
    }

    /// Read one column, treating missing trailing cells as zero.
    ///
    /// Multiplier columns are often absent before a solver has filled them.
    pub fn column_or_zero(&self, col: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.get(col).copied().unwrap_or(0.0))
            .collect()
    }

    pub fn set_column(&mut self, col: usize, values: &[f64]) -> OpfxResult<()> {
        if values.len() != self.nrows() {
            return Err(OpfxError::Dimension {
                what: format!("{} column {}", self.kind, col),
                expected: self.nrows(),
                actual: values.len(),
            });
        }
        for (row, &v) in values.iter().enumerate() {
            self.set(row, col, v)?;
        }
        Ok(())
    }
}

/// The network case an OPF model was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseData {
    /// System MVA base used for per-unit conversion
    pub base_mva: f64,
    pub bus: Table,
    pub gen: Table,
    pub branch: Table,
}

impl CaseData {
    pub fn new(base_mva: f64, bus: Vec<Vec<f64>>, gen: Vec<Vec<f64>>, branch: Vec<Vec<f64>>) -> Self {
        Self {
            base_mva,
            bus: Table::new(TableKind::Bus, bus),
            gen: Table::new(TableKind::Gen, gen),
            branch: Table::new(TableKind::Branch, branch),
        }
    }
}

impl Default for CaseData {
    fn default() -> Self {
        Self {
            base_mva: 100.0,
            bus: Table::empty(TableKind::Bus),
            gen: Table::empty(TableKind::Gen),
            branch: Table::empty(TableKind::Branch),
        }
    }
}
