//! Linear model implementations

use super::models::{check_feature_count, check_training_shapes, Regressor};
use crate::error::{MonitorError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Ridge added when the normal equations are singular
const SINGULAR_RIDGE: f64 = 1e-6;

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Returns `None` when the matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // Cholesky decomposition: A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Gauss-Jordan solve with partial pivoting (fallback)
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // Augmented matrix [A | b]
    let mut aug = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..=n {
                aug.swap([col, j], [max_row, j]);
            }
        }
        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..=n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..=n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.column(n).to_owned())
}

fn solve_normal_equations(gram: &Array2<f64>, rhs: &Array1<f64>) -> Option<Array1<f64>> {
    cholesky_solve(gram, rhs).or_else(|| gauss_jordan_solve(gram, rhs))
}

/// Least-squares linear regression with an optional L2 penalty.
///
/// `alpha = 0` is ordinary least squares, `alpha > 0` is ridge regression.
/// The intercept is never penalised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
    /// Regularization strength (L2)
    pub alpha: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Create an ordinary least squares model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha: 0.0,
        }
    }

    /// Create a ridge model
    pub fn ridge(alpha: f64) -> Self {
        Self::new().with_alpha(alpha)
    }

    /// Set regularization strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.max(0.0);
        self
    }

    fn fit_centered(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_shapes(x, y)?;
        let n_features = x.ncols();

        let x_mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(n_features));
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = x - &x_mean.view().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let mut gram = x_centered.t().dot(&x_centered);
        for i in 0..n_features {
            gram[[i, i]] += self.alpha;
        }
        let rhs = x_centered.t().dot(&y_centered);

        let coefficients = match solve_normal_equations(&gram, &rhs) {
            Some(c) => c,
            None => {
                for i in 0..n_features {
                    gram[[i, i]] += SINGULAR_RIDGE;
                }
                solve_normal_equations(&gram, &rhs).ok_or_else(|| {
                    MonitorError::ComputationError(
                        "normal equations are singular".to_string(),
                    )
                })?
            }
        };

        self.intercept = Some(y_mean - x_mean.dot(&coefficients));
        self.coefficients = Some(coefficients);
        Ok(())
    }
}

impl Regressor for LinearRegression {
    fn name(&self) -> &'static str {
        if self.alpha > 0.0 {
            "ridge_regression"
        } else {
            "linear_regression"
        }
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.fit_centered(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (coefficients, intercept) = match (&self.coefficients, self.intercept) {
            (Some(c), Some(b)) => (c, b),
            _ => return Err(MonitorError::ModelNotFitted),
        };
        check_feature_count(x, coefficients.len())?;
        Ok(x.dot(coefficients) + intercept)
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}
