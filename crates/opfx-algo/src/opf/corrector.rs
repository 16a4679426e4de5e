//! Post-solve corrections applied to backend results.
//!
//! After a successful AC solve the generator table is brought back in line
//! with the solved bus voltages, capability-curve multipliers are folded into
//! the generator P/Q multipliers, and raw derivatives are produced on request.
//! Angle-difference multipliers are converted to per-degree prices for DC and
//! AC alike.

use sprs::CsMat;

use opfx_core::idx::{branch, bus, gen};
use opfx_core::units::PerRadian;
use opfx_core::{OpfxError, Table};

use super::model::{CapabilityCurveData, OpfModel};
use super::options::OpfOptions;
use super::traits::DerivativeEvaluator;
use super::types::{DerivativeBundle, OpfResults};
use crate::OpfError;

pub struct PostSolveCorrector<'a> {
    model: &'a OpfModel,
    options: &'a OpfOptions,
    evaluator: &'a dyn DerivativeEvaluator,
}

impl<'a> PostSolveCorrector<'a> {
    pub fn new(
        model: &'a OpfModel,
        options: &'a OpfOptions,
        evaluator: &'a dyn DerivativeEvaluator,
    ) -> Self {
        Self {
            model,
            options,
            evaluator,
        }
    }

    /// Correct `results` in place and return the derivative bundle, if any.
    ///
    /// Legacy constraint derivatives left on the results by the backend are
    /// always removed, whatever the outcome.
    pub fn correct(
        &self,
        results: Option<&mut OpfResults>,
        success: bool,
    ) -> Result<Option<DerivativeBundle>, OpfError> {
        let ac = !self.options.dc;
        let results = match results {
            Some(results) if success => results,
            other => {
                if let Some(results) = other {
                    results.solver_jacobian = None;
                }
                let empty = (ac && self.options.return_raw_der).then(DerivativeBundle::empty);
                return Ok(empty);
            }
        };

        let mut derivatives = None;
        if ac {
            copy_voltages(results)?;
            self.combine_capability_multipliers(results)?;
            if self.options.return_raw_der {
                derivatives = Some(self.derivatives(results)?);
            }
        }
        results.solver_jacobian = None;

        self.angle_multipliers(results)?;
        Ok(derivatives)
    }

    fn combine_capability_multipliers(&self, results: &mut OpfResults) -> Result<(), OpfError> {
        let lin = &self.model.index().lin;
        if lin.width("PQh") == 0 && lin.width("PQl") == 0 {
            return Ok(());
        }

        let data = self.model.userdata().apq.as_ref().ok_or_else(|| {
            OpfError::DataValidation(
                "capability curve constraints present without curve data".to_string(),
            )
        })?;

        let mu_pqh = net_multipliers(results, "PQh", lin.range("PQh"))?;
        let mu_pql = net_multipliers(results, "PQl", lin.range("PQl"))?;
        update_mupq(results.base_mva, &mut results.gen, &mu_pqh, &mu_pql, data)
    }

    fn derivatives(&self, results: &mut OpfResults) -> Result<DerivativeBundle, OpfError> {
        let (g, dg) = match results.solver_jacobian.take() {
            Some(legacy) => {
                tracing::debug!("using constraint derivatives reported by the backend");
                (legacy.g, legacy.dg)
            }
            None => {
                let admittance = self.evaluator.admittance(self.model.case())?;
                let eval =
                    self.evaluator
                        .constraints(&results.x, self.model, &admittance, self.options)?;

                let mut g = eval.eq;
                g.extend_from_slice(&eval.ineq);
                (g, stack_jacobian(&eval.d_eq, &eval.d_ineq)?)
            }
        };

        let cost = self.evaluator.cost(&results.x, self.model)?;
        Ok(DerivativeBundle {
            g,
            dg,
            df: cost.df,
            d2f: cost.d2f,
        })
    }

    fn angle_multipliers(&self, results: &mut OpfResults) -> Result<(), OpfError> {
        let Some(range) = self.model.index().lin.range("ang").filter(|r| !r.is_empty()) else {
            return Ok(());
        };
        let iang = &self.model.userdata().iang;
        if iang.len() != range.len() {
            return Err(OpfxError::Dimension {
                what: "angle constraint branch list".to_string(),
                expected: range.len(),
                actual: iang.len(),
            }
            .into());
        }

        let lower = range.slice(&results.mu.lin.l, "lin.l")?;
        let upper = range.slice(&results.mu.lin.u, "lin.u")?;
        for (k, &row) in iang.iter().enumerate() {
            let mu_min = PerRadian(lower[k]).to_per_degree().value();
            let mu_max = PerRadian(upper[k]).to_per_degree().value();
            results.branch.set(row, branch::MU_ANGMIN, mu_min)?;
            results.branch.set(row, branch::MU_ANGMAX, mu_max)?;
        }
        Ok(())
    }
}

/// Set each generator's voltage setpoint to the solved magnitude at its bus.
pub fn copy_voltages(results: &mut OpfResults) -> Result<(), OpfError> {
    for i in 0..results.gen.nrows() {
        let raw = results.gen.get(i, gen::GEN_BUS)?;
        if raw < 0.0 || raw.fract() != 0.0 || raw as usize >= results.bus.nrows() {
            return Err(OpfError::DataValidation(format!(
                "generator {} refers to bus index {} outside 0..{}",
                i,
                raw,
                results.bus.nrows()
            )));
        }
        let vm = results.bus.get(raw as usize, bus::VM)?;
        results.gen.set(i, gen::VG, vm)?;
    }
    Ok(())
}

/// `lin.l - lin.u` over one block, empty when the block is absent.
fn net_multipliers(
    results: &OpfResults,
    name: &str,
    range: Option<opfx_core::BlockRange>,
) -> Result<Vec<f64>, OpfError> {
    let Some(range) = range else {
        return Ok(Vec::new());
    };
    let l = range.slice(&results.mu.lin.l, &format!("lin.l[{name}]"))?;
    let u = range.slice(&results.mu.lin.u, &format!("lin.u[{name}]"))?;
    Ok(l.iter().zip(u).map(|(l, u)| l - u).collect())
}

/// Fold capability-curve multipliers into the generator P/Q limit multipliers.
///
/// The net multiplier on each limit is adjusted by the curve rows attached
/// to that generator, then split back into non-negative upper and lower parts.
pub fn update_mupq(
    base_mva: f64,
    gen_table: &mut Table,
    mu_pqh: &[f64],
    mu_pql: &[f64],
    data: &CapabilityCurveData,
) -> Result<(), OpfError> {
    check_curve_len("PQh", mu_pqh.len(), data.ipqh.len(), data.h.len())?;
    check_curve_len("PQl", mu_pql.len(), data.ipql.len(), data.l.len())?;

    let pmax = gen_table.column_or_zero(gen::MU_PMAX);
    let pmin = gen_table.column_or_zero(gen::MU_PMIN);
    let qmax = gen_table.column_or_zero(gen::MU_QMAX);
    let qmin = gen_table.column_or_zero(gen::MU_QMIN);

    let mut mu_p: Vec<f64> = pmax.iter().zip(&pmin).map(|(a, b)| a - b).collect();
    let mut mu_q: Vec<f64> = qmax.iter().zip(&qmin).map(|(a, b)| a - b).collect();

    let curves = [
        (&data.ipqh, &data.h, mu_pqh),
        (&data.ipql, &data.l, mu_pql),
    ];
    for (gens, slopes, mu) in curves {
        for ((&g, slope), &m) in gens.iter().zip(slopes).zip(mu) {
            if g >= mu_p.len() {
                return Err(OpfError::DataValidation(format!(
                    "capability curve refers to generator {} of {}",
                    g,
                    mu_p.len()
                )));
            }
            mu_p[g] -= m * slope.p / base_mva;
            mu_q[g] -= m * slope.q / base_mva;
        }
    }

    let pos = |v: &[f64]| v.iter().map(|x| x.max(0.0)).collect::<Vec<_>>();
    let neg = |v: &[f64]| v.iter().map(|x| (-x).max(0.0)).collect::<Vec<_>>();
    gen_table.set_column(gen::MU_PMAX, &pos(&mu_p))?;
    gen_table.set_column(gen::MU_PMIN, &neg(&mu_p))?;
    gen_table.set_column(gen::MU_QMAX, &pos(&mu_q))?;
    gen_table.set_column(gen::MU_QMIN, &neg(&mu_q))?;
    Ok(())
}

fn check_curve_len(name: &str, mu: usize, gens: usize, slopes: usize) -> Result<(), OpfError> {
    if mu != gens || mu != slopes {
        return Err(OpfError::DataValidation(format!(
            "{name}: {mu} multipliers for {gens} generators and {slopes} curve rows"
        )));
    }
    Ok(())
}

/// Stack `nx x n` gradient matrices into one constraint-by-variable Jacobian,
/// equality rows first.
fn stack_jacobian(d_eq: &CsMat<f64>, d_ineq: &CsMat<f64>) -> Result<CsMat<f64>, OpfError> {
    if d_eq.rows() != d_ineq.rows() {
        return Err(OpfError::Evaluation(format!(
            "constraint gradients disagree on variable count: {} vs {}",
            d_eq.rows(),
            d_ineq.rows()
        )));
    }
    let eq = d_eq.transpose_view().to_csr();
    let ineq = d_ineq.transpose_view().to_csr();
    Ok(sprs::vstack(&[eq.view(), ineq.view()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opf::model::CurveSlope;
    use crate::opf::traits::{Admittance, ConstraintEval, CostEval};
    use crate::opf::types::{BoundDuals, ConstraintJacobian};
    use opfx_core::{CaseData, TableKind};
    use sprs::TriMat;
    use std::f64::consts::PI;

    struct FixedEvaluator;

    impl DerivativeEvaluator for FixedEvaluator {
        fn admittance(&self, _case: &CaseData) -> Result<Admittance, OpfError> {
            Ok(Admittance {
                ybus: CsMat::zero((0, 0)),
                yf: CsMat::zero((0, 0)),
                yt: CsMat::zero((0, 0)),
            })
        }

        fn constraints(
            &self,
            x: &[f64],
            _model: &OpfModel,
            _admittance: &Admittance,
            _options: &OpfOptions,
        ) -> Result<ConstraintEval, OpfError> {
            // one equality touching x0, two inequalities touching x1
            let nx = x.len();
            let mut deq = TriMat::new((nx, 1));
            deq.add_triplet(0, 0, 1.0);
            let mut dineq = TriMat::new((nx, 2));
            dineq.add_triplet(1, 0, 2.0);
            dineq.add_triplet(1, 1, 3.0);
            Ok(ConstraintEval {
                ineq: vec![10.0, 20.0],
                eq: vec![5.0],
                d_ineq: dineq.to_csr(),
                d_eq: deq.to_csr(),
            })
        }

        fn cost(&self, x: &[f64], _model: &OpfModel) -> Result<CostEval, OpfError> {
            Ok(CostEval {
                f: 1.0,
                df: vec![1.0; x.len()],
                d2f: CsMat::eye(x.len()),
            })
        }
    }

    fn two_gen_case() -> CaseData {
        let mut bus_rows = vec![vec![0.0; 13]; 3];
        bus_rows[0][bus::VM] = 1.02;
        bus_rows[2][bus::VM] = 0.98;
        let mut gen_rows = vec![vec![0.0; 25]; 2];
        gen_rows[0][gen::GEN_BUS] = 2.0;
        gen_rows[1][gen::GEN_BUS] = 0.0;
        CaseData::new(100.0, bus_rows, gen_rows, vec![vec![0.0; 21]; 3])
    }

    fn results_for(model: &OpfModel) -> OpfResults {
        let mut results = OpfResults::from_case(model.case());
        results.x = vec![0.5, 0.25];
        let nlin = model.index().lin.total();
        results.mu.lin = BoundDuals::zeros(nlin);
        results
    }

    #[test]
    fn test_copy_voltages_from_bus() {
        let model = OpfModel::builder(two_gen_case()).build().unwrap();
        let mut results = results_for(&model);
        copy_voltages(&mut results).unwrap();
        assert_eq!(results.gen.get(0, gen::VG).unwrap(), 0.98);
        assert_eq!(results.gen.get(1, gen::VG).unwrap(), 1.02);
    }

    #[test]
    fn test_copy_voltages_rejects_bad_bus_index() {
        let mut case = two_gen_case();
        case.gen.set(0, gen::GEN_BUS, 7.0).unwrap();
        let mut results = OpfResults::from_case(&case);
        let err = copy_voltages(&mut results).unwrap_err();
        assert!(matches!(err, OpfError::DataValidation(_)));
    }

    #[test]
    fn test_update_mupq_splits_net_multiplier() {
        let mut table = Table::new(TableKind::Gen, vec![vec![0.0; 25]; 2]);
        table.set(0, gen::MU_PMAX, 1.0).unwrap();
        table.set(1, gen::MU_QMIN, 0.5).unwrap();

        let data = CapabilityCurveData {
            ipqh: vec![0],
            ipql: vec![1],
            h: vec![CurveSlope { p: 100.0, q: -200.0 }],
            l: vec![CurveSlope { p: 0.0, q: 100.0 }],
        };
        update_mupq(100.0, &mut table, &[3.0], &[-1.0], &data).unwrap();

        // gen 0: muP = 1 - 3*1 = -2, muQ = 0 + 3*2 = 6
        assert_eq!(table.get(0, gen::MU_PMAX).unwrap(), 0.0);
        assert_eq!(table.get(0, gen::MU_PMIN).unwrap(), 2.0);
        assert_eq!(table.get(0, gen::MU_QMAX).unwrap(), 6.0);
        assert_eq!(table.get(0, gen::MU_QMIN).unwrap(), 0.0);
        // gen 1: muQ = -0.5 + 1*1 = 0.5
        assert_eq!(table.get(1, gen::MU_QMAX).unwrap(), 0.5);
        assert_eq!(table.get(1, gen::MU_QMIN).unwrap(), 0.0);
    }

    #[test]
    fn test_update_mupq_length_mismatch() {
        let mut table = Table::new(TableKind::Gen, vec![vec![0.0; 25]]);
        let data = CapabilityCurveData {
            ipqh: vec![0],
            h: vec![CurveSlope { p: 1.0, q: 1.0 }],
            ..Default::default()
        };
        assert!(update_mupq(100.0, &mut table, &[], &[], &data).is_err());
    }

    #[test]
    fn test_missing_curve_data_is_error() {
        let model = OpfModel::builder(two_gen_case())
            .add_lin_constraints("PQh", 1)
            .build()
            .unwrap();
        let options = OpfOptions::new();
        let corrector = PostSolveCorrector::new(&model, &options, &FixedEvaluator);
        let mut results = results_for(&model);
        let err = corrector.correct(Some(&mut results), true).unwrap_err();
        assert!(matches!(err, OpfError::DataValidation(_)));
    }

    #[test]
    fn test_angle_multipliers_scaled_per_degree() {
        let model = OpfModel::builder(two_gen_case())
            .add_lin_constraints("ang", 2)
            .with_angle_rows(vec![2, 0])
            .build()
            .unwrap();
        let options = OpfOptions::new().with_dc(true);
        let corrector = PostSolveCorrector::new(&model, &options, &FixedEvaluator);

        let mut results = results_for(&model);
        results.mu.lin = BoundDuals::new(vec![180.0, 90.0], vec![360.0, 0.0]);
        let der = corrector.correct(Some(&mut results), true).unwrap();

        assert!(der.is_none());
        let b = &results.branch;
        assert!((b.get(2, branch::MU_ANGMIN).unwrap() - PI).abs() < 1e-12);
        assert!((b.get(2, branch::MU_ANGMAX).unwrap() - 2.0 * PI).abs() < 1e-12);
        assert!((b.get(0, branch::MU_ANGMIN).unwrap() - PI / 2.0).abs() < 1e-12);
        assert_eq!(b.get(0, branch::MU_ANGMAX).unwrap(), 0.0);
        // DC leaves the generator setpoints alone
        assert_eq!(results.gen.get(0, gen::VG).unwrap(), 0.0);
    }

    #[test]
    fn test_evaluated_jacobian_is_constraint_by_variable() {
        let model = OpfModel::builder(two_gen_case())
            .add_vars("Va", 2)
            .build()
            .unwrap();
        let options = OpfOptions::new().with_return_raw_der(true);
        let corrector = PostSolveCorrector::new(&model, &options, &FixedEvaluator);

        let mut results = results_for(&model);
        let der = corrector.correct(Some(&mut results), true).unwrap().unwrap();

        assert_eq!(der.g, vec![5.0, 10.0, 20.0]);
        assert_eq!(der.dg.shape(), (3, 2));
        assert_eq!(der.dg.get(0, 0), Some(&1.0));
        assert_eq!(der.dg.get(1, 1), Some(&2.0));
        assert_eq!(der.dg.get(2, 1), Some(&3.0));
        assert_eq!(der.df, vec![1.0, 1.0]);
        assert_eq!(der.d2f.shape(), (2, 2));
    }

    #[test]
    fn test_legacy_jacobian_is_moved_not_recomputed() {
        let model = OpfModel::builder(two_gen_case()).build().unwrap();
        let options = OpfOptions::new().with_return_raw_der(true);
        let corrector = PostSolveCorrector::new(&model, &options, &FixedEvaluator);

        let mut results = results_for(&model);
        results.solver_jacobian = Some(ConstraintJacobian {
            g: vec![42.0],
            dg: CsMat::eye(1),
        });
        let der = corrector.correct(Some(&mut results), true).unwrap().unwrap();

        assert_eq!(der.g, vec![42.0]);
        assert!(results.solver_jacobian.is_none());
    }

    #[test]
    fn test_legacy_jacobian_stripped_without_raw_derivatives() {
        let model = OpfModel::builder(two_gen_case()).build().unwrap();
        for options in [OpfOptions::new(), OpfOptions::new().with_dc(true)] {
            let corrector = PostSolveCorrector::new(&model, &options, &FixedEvaluator);
            let mut results = results_for(&model);
            results.solver_jacobian = Some(ConstraintJacobian {
                g: vec![1.0],
                dg: CsMat::eye(1),
            });
            assert!(corrector.correct(Some(&mut results), true).unwrap().is_none());
            assert!(results.solver_jacobian.is_none());
        }
    }

    #[test]
    fn test_failure_gives_empty_bundle_for_ac_only() {
        let model = OpfModel::builder(two_gen_case()).build().unwrap();

        let ac = OpfOptions::new().with_return_raw_der(true);
        let der = PostSolveCorrector::new(&model, &ac, &FixedEvaluator)
            .correct(None, false)
            .unwrap();
        assert_eq!(der, Some(DerivativeBundle::empty()));

        let dc = OpfOptions::new().with_dc(true).with_return_raw_der(true);
        let der = PostSolveCorrector::new(&model, &dc, &FixedEvaluator)
            .correct(None, false)
            .unwrap();
        assert!(der.is_none());
    }

    #[test]
    fn test_failed_solve_leaves_tables_alone() {
        let model = OpfModel::builder(two_gen_case()).build().unwrap();
        let options = OpfOptions::new();
        let mut results = results_for(&model);
        PostSolveCorrector::new(&model, &options, &FixedEvaluator)
            .correct(Some(&mut results), false)
            .unwrap();
        assert_eq!(results.gen.get(0, gen::VG).unwrap(), 0.0);
    }
}
