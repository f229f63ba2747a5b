/*
    Helix Track, Kalman filter reconstruction of charged particle tracks
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::linalg::Matrix2;

/// Returns whether the provided 2x2 matrix is symmetric to within the provided relative tolerance.
pub fn is_symmetric(m: &Matrix2<f64>, rel_tol: f64) -> bool {
    let scale = m.abs().max().max(f64::MIN_POSITIVE);
    (m[(0, 1)] - m[(1, 0)]).abs() <= rel_tol * scale
}

/// Returns whether the provided 2x2 matrix is symmetric and positive semi definite, i.e. all of
/// its eigenvalues are non negative, to within the provided relative tolerance.
pub fn is_positive_semidefinite(m: &Matrix2<f64>, rel_tol: f64) -> bool {
    if !m.iter().all(|v| v.is_finite()) || !is_symmetric(m, rel_tol) {
        return false;
    }
    let scale = m.abs().max();
    m.symmetric_eigenvalues()
        .iter()
        .all(|eigval| *eigval >= -rel_tol * scale)
}

/// Returns the root mean square of the provided values, or `None` if there are none.
pub fn rms(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some((values.iter().map(|v| v.powi(2)).sum::<f64>() / values.len() as f64).sqrt())
    }
}
