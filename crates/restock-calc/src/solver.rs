//! 脊迴歸求解（正規方程 + Cholesky 分解）

use nalgebra::{DMatrix, DVector};

use crate::model::{FitBudget, ModelFitError};

/// 求解 (XᵀX + diag(λ)) β = Xᵀy
///
/// `design` 每列為一筆觀測的特徵，`penalties` 為各欄的 λ。
pub fn solve_ridge(
    design: &[Vec<f64>],
    targets: &[f64],
    penalties: &[f64],
    budget: &FitBudget,
) -> Result<Vec<f64>, ModelFitError> {
    let p = penalties.len();
    let mut values = Vec::with_capacity(design.len() * p);
    for row in design {
        budget.check()?;
        if row.len() != p {
            return Err(ModelFitError::ShapeMismatch {
                expected: p,
                found: row.len(),
            });
        }
        values.extend_from_slice(row);
    }

    let x = DMatrix::from_row_slice(design.len(), p, &values);
    let y = DVector::from_column_slice(targets);

    let gram = x.tr_mul(&x) + DMatrix::from_diagonal(&DVector::from_column_slice(penalties));
    let rhs = x.tr_mul(&y);
    budget.check()?;

    let solution = gram
        .cholesky()
        .ok_or(ModelFitError::NotPositiveDefinite)?
        .solve(&rhs);

    if solution.iter().any(|v| !v.is_finite()) {
        return Err(ModelFitError::NonFinite("迴歸係數".to_string()));
    }
    Ok(solution.iter().copied().collect())
}
