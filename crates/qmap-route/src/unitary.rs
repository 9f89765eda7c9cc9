//! Single-qubit unitaries for redundancy detection.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;

use qmap_ir::StandardGate;

/// Tolerance for matrix comparisons.
const EPSILON: f64 = 1e-10;

/// A 2x2 matrix in row-major order: `[[a, b], [c, d]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order.
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a matrix from its elements.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// The identity.
    pub fn identity() -> Self {
        Self::diagonal(Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0))
    }

    fn diagonal(a: Complex64, d: Complex64) -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self::new(a, zero, zero, d)
    }

    fn real(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self::new(
            Complex64::new(a, 0.0),
            Complex64::new(b, 0.0),
            Complex64::new(c, 0.0),
            Complex64::new(d, 0.0),
        )
    }

    /// Matrix of a single-qubit standard gate; `None` for wider gates.
    pub fn from_gate(gate: &StandardGate) -> Option<Self> {
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let m = match *gate {
            StandardGate::I => Self::identity(),
            StandardGate::X => Self::real(0.0, 1.0, 1.0, 0.0),
            StandardGate::Y => Self::new(Complex64::new(0.0, 0.0), -i, i, Complex64::new(0.0, 0.0)),
            StandardGate::Z => Self::real(1.0, 0.0, 0.0, -1.0),
            StandardGate::H => Self::real(FRAC_1_SQRT_2, FRAC_1_SQRT_2, FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            StandardGate::S => Self::diagonal(one, i),
            StandardGate::Sdg => Self::diagonal(one, -i),
            StandardGate::T => Self::diagonal(one, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)),
            StandardGate::Tdg => {
                Self::diagonal(one, Complex64::from_polar(1.0, -std::f64::consts::FRAC_PI_4))
            }
            StandardGate::SX => {
                let (p, q) = (Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5));
                Self::new(p, q, q, p)
            }
            StandardGate::SXdg => {
                let (p, q) = (Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5));
                Self::new(p, q, q, p)
            }
            StandardGate::Rx(theta) => {
                let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
                let off = Complex64::new(0.0, -s);
                Self::new(Complex64::new(c, 0.0), off, off, Complex64::new(c, 0.0))
            }
            StandardGate::Ry(theta) => {
                let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
                Self::real(c, -s, s, c)
            }
            StandardGate::Rz(theta) => Self::diagonal(
                Complex64::from_polar(1.0, -theta / 2.0),
                Complex64::from_polar(1.0, theta / 2.0),
            ),
            StandardGate::P(lambda) => Self::diagonal(one, Complex64::from_polar(1.0, lambda)),
            StandardGate::U(theta, phi, lambda) => {
                let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
                Self::new(
                    Complex64::new(c, 0.0),
                    -Complex64::from_polar(s, lambda),
                    Complex64::from_polar(s, phi),
                    Complex64::from_polar(c, phi + lambda),
                )
            }
            _ => return None,
        };
        Some(m)
    }

    /// Matrix product `self * other`.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// If this is `e^{i phi} I`, the phase `phi`.
    pub fn identity_phase(&self) -> Option<f64> {
        let [a, b, c, d] = self.data;
        let diagonal = b.norm() < EPSILON && c.norm() < EPSILON && (a - d).norm() < EPSILON;
        (diagonal && (a.norm() - 1.0).abs() < EPSILON).then(|| a.arg())
    }

    /// Whether this is the identity up to a global phase.
    pub fn is_identity(&self) -> bool {
        self.identity_phase().is_some()
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn gate(g: StandardGate) -> Unitary2x2 {
        Unitary2x2::from_gate(&g).unwrap()
    }

    #[test]
    fn test_self_inverse_gates() {
        for g in [StandardGate::X, StandardGate::Y, StandardGate::Z, StandardGate::H] {
            assert!((gate(g.clone()) * gate(g)).is_identity());
        }
    }

    #[test]
    fn test_adjoint_pairs() {
        assert!((gate(StandardGate::S) * gate(StandardGate::Sdg)).is_identity());
        assert!((gate(StandardGate::T) * gate(StandardGate::Tdg)).is_identity());
        assert!((gate(StandardGate::SX) * gate(StandardGate::SXdg)).is_identity());
        let u = StandardGate::U(0.3, 1.1, -0.4);
        let inverse = u.inverse().unwrap();
        assert!((gate(u) * gate(inverse)).is_identity());
    }

    #[test]
    fn test_phase_of_rotation_product() {
        // Rx(pi) = -iX, so Rx(pi) X = -i I.
        let product = gate(StandardGate::Rx(PI)) * gate(StandardGate::X);
        let phase = product.identity_phase().unwrap();
        assert!((phase + PI / 2.0).abs() < 1e-9);
        assert!(!(gate(StandardGate::S) * gate(StandardGate::S)).is_identity());
    }

    #[test]
    fn test_two_qubit_gates_have_no_matrix() {
        assert!(Unitary2x2::from_gate(&StandardGate::CX).is_none());
    }
}
