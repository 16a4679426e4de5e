//! Generalized user-defined cost terms.
//!
//! Each cost block is described by the standard generalized cost model:
//!
//! ```text
//! r   = N x - rh
//! rr  = r + kk   where r < -kk
//!       r - kk   where r >  kk
//!       0        where r == 0 and kk == 0
//! w_i = mm_i * rr_i      (linear rows)
//!       mm_i * rr_i^2    (quadratic rows)
//!       0                (rows inside the dead zone)
//! f   = w' H w / 2 + Cw' w
//! ```

use serde::Serialize;
use sprs::{CsMat, TriMat};

use crate::OpfError;
use opfx_core::OpfxError;

/// How the shifted residual `rr` enters `w` for one cost row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostShape {
    Linear,
    Quadratic,
}

/// Parameters of one named user cost block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCost {
    /// `nw x nx` map from the full variable vector to cost rows
    pub n: CsMat<f64>,
    pub cw: Vec<f64>,
    /// `nw x nw` quadratic weight
    pub h: CsMat<f64>,
    pub shape: Vec<CostShape>,
    pub rh: Vec<f64>,
    /// Dead-zone half width per row
    pub kk: Vec<f64>,
    pub mm: Vec<f64>,
}

impl UserCost {
    /// Linear cost `Cw' (N x)` with no shift, no dead zone and unit scale.
    pub fn new(n: CsMat<f64>, cw: Vec<f64>) -> Self {
        let nw = n.rows();
        Self {
            h: CsMat::zero((nw, nw)),
            shape: vec![CostShape::Linear; nw],
            rh: vec![0.0; nw],
            kk: vec![0.0; nw],
            mm: vec![1.0; nw],
            n,
            cw,
        }
    }

    pub fn with_quadratic(mut self, h: CsMat<f64>) -> Self {
        self.h = h;
        self
    }

    pub fn with_shape(mut self, shape: Vec<CostShape>) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_offset(mut self, rh: Vec<f64>) -> Self {
        self.rh = rh;
        self
    }

    pub fn with_dead_zone(mut self, kk: Vec<f64>) -> Self {
        self.kk = kk;
        self
    }

    pub fn with_scale(mut self, mm: Vec<f64>) -> Self {
        self.mm = mm;
        self
    }

    /// Number of cost rows
    pub fn rows(&self) -> usize {
        self.n.rows()
    }

    /// Check that every parameter agrees on `nw` and that `N` spans `nx` columns.
    pub fn validate(&self, name: &str, nx: usize) -> Result<(), OpfError> {
        let nw = self.rows();
        if self.n.cols() != nx {
            return Err(OpfError::DataValidation(format!(
                "cost '{}': N has {} columns, model has {} variables",
                name,
                self.n.cols(),
                nx
            )));
        }
        let lengths = [
            ("Cw", self.cw.len()),
            ("dd", self.shape.len()),
            ("rh", self.rh.len()),
            ("kk", self.kk.len()),
            ("mm", self.mm.len()),
        ];
        for (field, len) in lengths {
            if len != nw {
                return Err(OpfError::DataValidation(format!(
                    "cost '{}': {} has {} entries, N has {} rows",
                    name, field, len, nw
                )));
            }
        }
        if self.h.shape() != (nw, nw) {
            return Err(OpfError::DataValidation(format!(
                "cost '{}': H is {:?}, expected ({}, {})",
                name,
                self.h.shape(),
                nw,
                nw
            )));
        }
        Ok(())
    }

    /// Evaluate the cost at `x`.
    pub fn evaluate(&self, x: &[f64]) -> Result<f64, OpfError> {
        let nx = self.n.cols();
        if x.len() < nx {
            return Err(OpfxError::Dimension {
                what: "x".into(),
                expected: nx,
                actual: x.len(),
            }
            .into());
        }

        let r: Vec<f64> = mat_vec(&self.n, &x[..nx])
            .iter()
            .zip(&self.rh)
            .map(|(nx_i, rh_i)| nx_i - rh_i)
            .collect();

        let w: Vec<f64> = (0..self.rows())
            .map(|i| {
                let (ri, ki) = (r[i], self.kk[i]);
                let rr = if ri < -ki {
                    ri + ki
                } else if ri > ki {
                    ri - ki
                } else if ri == 0.0 && ki == 0.0 {
                    0.0
                } else {
                    // dead zone
                    return 0.0;
                };
                match self.shape[i] {
                    CostShape::Linear => self.mm[i] * rr,
                    CostShape::Quadratic => self.mm[i] * rr * rr,
                }
            })
            .collect();

        let hw = mat_vec(&self.h, &w);
        Ok(dot(&w, &hw) / 2.0 + dot(&self.cw, &w))
    }
}

/// All user cost blocks stacked in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostParams {
    pub n: CsMat<f64>,
    pub cw: Vec<f64>,
    /// Block diagonal of the per-block `H`
    pub h: CsMat<f64>,
    pub shape: Vec<CostShape>,
    pub rh: Vec<f64>,
    pub kk: Vec<f64>,
    pub mm: Vec<f64>,
}

impl CostParams {
    /// Stack already-validated blocks over an `nx`-wide variable vector.
    pub fn stack<'a>(blocks: impl IntoIterator<Item = &'a UserCost>, nx: usize) -> Self {
        let blocks: Vec<&UserCost> = blocks.into_iter().collect();
        let nw: usize = blocks.iter().map(|b| b.rows()).sum();

        let mut n = TriMat::new((nw, nx));
        let mut h = TriMat::new((nw, nw));
        let mut params = Self {
            n: CsMat::zero((nw, nx)),
            cw: Vec::with_capacity(nw),
            h: CsMat::zero((nw, nw)),
            shape: Vec::with_capacity(nw),
            rh: Vec::with_capacity(nw),
            kk: Vec::with_capacity(nw),
            mm: Vec::with_capacity(nw),
        };

        let mut offset = 0;
        for block in blocks {
            for (&v, (row, col)) in block.n.iter() {
                n.add_triplet(offset + row, col, v);
            }
            for (&v, (row, col)) in block.h.iter() {
                h.add_triplet(offset + row, offset + col, v);
            }
            params.cw.extend_from_slice(&block.cw);
            params.shape.extend_from_slice(&block.shape);
            params.rh.extend_from_slice(&block.rh);
            params.kk.extend_from_slice(&block.kk);
            params.mm.extend_from_slice(&block.mm);
            offset += block.rows();
        }

        params.n = n.to_csr();
        params.h = h.to_csr();
        params
    }

    pub fn rows(&self) -> usize {
        self.n.rows()
    }
}

/// `m * v` for any sparse storage order.
pub(crate) fn mat_vec(m: &CsMat<f64>, v: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; m.rows()];
    for (&val, (row, col)) in m.iter() {
        out[row] += val * v[col];
    }
    out
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 x 3 selector picking x[col]
    fn selector(col: usize, nx: usize) -> CsMat<f64> {
        let mut t = TriMat::new((1, nx));
        t.add_triplet(0, col, 1.0);
        t.to_csr()
    }

    fn diag(values: &[f64]) -> CsMat<f64> {
        let n = values.len();
        let mut t = TriMat::new((n, n));
        for (i, &v) in values.iter().enumerate() {
            t.add_triplet(i, i, v);
        }
        t.to_csr()
    }

    #[test]
    fn test_linear_cost() {
        let cost = UserCost::new(selector(1, 3), vec![4.0]);
        let f = cost.evaluate(&[10.0, 2.5, -1.0]).unwrap();
        assert!((f - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_weight() {
        // f = w' H w / 2 with w = x[0] - 1, H = 2 => (x0 - 1)^2
        let cost = UserCost::new(selector(0, 2), vec![0.0])
            .with_quadratic(diag(&[2.0]))
            .with_offset(vec![1.0]);
        let f = cost.evaluate(&[4.0, 0.0]).unwrap();
        assert!((f - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_shape_and_scale() {
        // w = mm * rr^2 = 0.5 * 3^2
        let cost = UserCost::new(selector(0, 1), vec![1.0])
            .with_shape(vec![CostShape::Quadratic])
            .with_scale(vec![0.5]);
        let f = cost.evaluate(&[3.0]).unwrap();
        assert!((f - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_dead_zone() {
        let cost = UserCost::new(selector(0, 1), vec![1.0]).with_dead_zone(vec![2.0]);
        assert_eq!(cost.evaluate(&[1.5]).unwrap(), 0.0);
        assert_eq!(cost.evaluate(&[-2.0]).unwrap(), 0.0);
        assert!((cost.evaluate(&[5.0]).unwrap() - 3.0).abs() < 1e-12);
        assert!((cost.evaluate(&[-5.0]).unwrap() + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_x_is_dimension_error() {
        let cost = UserCost::new(selector(2, 3), vec![1.0]);
        let err = cost.evaluate(&[1.0]).unwrap_err();
        assert!(matches!(err, OpfError::Model(OpfxError::Dimension { .. })));
    }

    #[test]
    fn test_validate_rejects_mismatched_lengths() {
        let cost = UserCost::new(selector(0, 2), vec![1.0, 2.0]);
        assert!(cost.validate("usr", 2).is_err());

        let cost = UserCost::new(selector(0, 2), vec![1.0]);
        assert!(cost.validate("usr", 3).is_err());
        assert!(cost.validate("usr", 2).is_ok());
    }

    #[test]
    fn test_stack_offsets_rows() {
        let a = UserCost::new(selector(0, 2), vec![1.0]).with_quadratic(diag(&[2.0]));
        let b = UserCost::new(selector(1, 2), vec![3.0]).with_quadratic(diag(&[5.0]));
        let params = CostParams::stack([&a, &b], 2);

        assert_eq!(params.rows(), 2);
        assert_eq!(params.n.get(1, 1), Some(&1.0));
        assert_eq!(params.h.get(1, 1), Some(&5.0));
        assert_eq!(params.h.get(0, 1), None);
        assert_eq!(params.cw, vec![1.0, 3.0]);
    }
}
