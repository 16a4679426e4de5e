//! Block index registry.
//!
//! An OPF model packs every variable and constraint into flat vectors. Each
//! named group (`Va`, `Pg`, `PQh`, ...) owns a contiguous `[first, last)`
//! range in one of four independent spaces. The registry is append-only:
//! blocks are laid out in declaration order with no gaps, so ranges inside a
//! space are disjoint and contiguous by construction.
//!
//! ```
//! use opfx_core::index::{BlockSpace, SpaceIndex};
//!
//! let mut var = SpaceIndex::new(BlockSpace::Variables);
//! var.add("Va", 3).unwrap();
//! var.add("Pg", 2).unwrap();
//!
//! let pg = var.range("Pg").unwrap();
//! assert_eq!((pg.first, pg.last), (3, 5));
//! assert_eq!(var.total(), 5);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::error::{OpfxError, OpfxResult};

/// The four independent index spaces of an OPF model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSpace {
    /// Primal variables
    Variables,
    /// Linear constraints `l <= A x <= u`
    LinearConstraints,
    /// Nonlinear constraints `g(x) = 0`, `h(x) <= 0`
    NonlinearConstraints,
    /// User-defined cost terms
    CostTerms,
}

impl BlockSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockSpace::Variables => "var",
            BlockSpace::LinearConstraints => "lin",
            BlockSpace::NonlinearConstraints => "nln",
            BlockSpace::CostTerms => "cost",
        }
    }
}

impl fmt::Display for BlockSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open `[first, last)` range of a block in its flat vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    pub first: usize,
    pub last: usize,
}

impl BlockRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        self.last - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.last == self.first
    }

    pub fn as_range(&self) -> Range<usize> {
        self.first..self.last
    }

    /// Borrow this block's slice of `values`.
    ///
    /// `what` names the vector in the error when it is too short.
    pub fn slice<'a>(&self, values: &'a [f64], what: &str) -> OpfxResult<&'a [f64]> {
        values.get(self.as_range()).ok_or_else(|| OpfxError::Dimension {
            what: what.to_string(),
            expected: self.last,
            actual: values.len(),
        })
    }
}

/// Ordered name → range mapping for one index space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceIndex {
    space: BlockSpace,
    order: Vec<String>,
    ranges: HashMap<String, BlockRange>,
    total: usize,
}

impl SpaceIndex {
    pub fn new(space: BlockSpace) -> Self {
        Self {
            space,
            order: Vec::new(),
            ranges: HashMap::new(),
            total: 0,
        }
    }

    pub fn space(&self) -> BlockSpace {
        self.space
    }

    /// Append a block of width `n` directly after the last one.
    pub fn add(&mut self, name: impl Into<String>, n: usize) -> OpfxResult<BlockRange> {
        let name = name.into();
        if self.ranges.contains_key(&name) {
            return Err(OpfxError::DuplicateBlock {
                space: self.space,
                name,
            });
        }
        let range = BlockRange::new(self.total, self.total + n);
        self.total = range.last;
        self.ranges.insert(name.clone(), range);
        self.order.push(name);
        Ok(range)
    }

    /// Declared names in order, including zero-width ones
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn range(&self, name: &str) -> Option<BlockRange> {
        self.ranges.get(name).copied()
    }

    /// Like [`range`](Self::range), but a missing block is an error.
    pub fn require(&self, name: &str) -> OpfxResult<BlockRange> {
        self.range(name).ok_or_else(|| OpfxError::UnknownBlock {
            space: self.space,
            name: name.to_string(),
        })
    }

    /// Width of a block; undeclared names have width zero.
    pub fn width(&self, name: &str) -> usize {
        self.range(name).map(|r| r.len()).unwrap_or(0)
    }

    /// Total width of the space
    pub fn total(&self) -> usize {
        self.total
    }

    /// Blocks in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, BlockRange)> + '_ {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.ranges[name]))
    }
}

/// The registries for all four spaces of one OPF model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockIndex {
    pub var: SpaceIndex,
    pub lin: SpaceIndex,
    pub nln: SpaceIndex,
    pub cost: SpaceIndex,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self {
            var: SpaceIndex::new(BlockSpace::Variables),
            lin: SpaceIndex::new(BlockSpace::LinearConstraints),
            nln: SpaceIndex::new(BlockSpace::NonlinearConstraints),
            cost: SpaceIndex::new(BlockSpace::CostTerms),
        }
    }

    pub fn space(&self, space: BlockSpace) -> &SpaceIndex {
        match space {
            BlockSpace::Variables => &self.var,
            BlockSpace::LinearConstraints => &self.lin,
            BlockSpace::NonlinearConstraints => &self.nln,
            BlockSpace::CostTerms => &self.cost,
        }
    }

    pub fn space_mut(&mut self, space: BlockSpace) -> &mut SpaceIndex {
        match space {
            BlockSpace::Variables => &mut self.var,
            BlockSpace::LinearConstraints => &mut self.lin,
            BlockSpace::NonlinearConstraints => &mut self.nln,
            BlockSpace::CostTerms => &mut self.cost,
        }
    }
}

impl Default for BlockIndex {
    fn default() -> Self {
        Self::new()
    }
}
