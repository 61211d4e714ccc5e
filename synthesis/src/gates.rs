// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::f64::consts::FRAC_1_SQRT_2;
use ndarray::{array, Array2};
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::{fmt, str::FromStr};

use crate::error::SynthesisError;

/// Single-qubit gates that can serve as the base operation of a multi-controlled gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StandardGate {
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    SX,
    SXdg,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    Phase(f64),
}

impl StandardGate {
    /// Returns the unitary matrix of the gate.
    #[must_use]
    pub fn matrix(self) -> Array2<Complex64> {
        let zero = Complex64::zero();
        let one = Complex64::one();
        let i = Complex64::i();
        match self {
            StandardGate::X => array![[zero, one], [one, zero]],
            StandardGate::Y => array![[zero, -i], [i, zero]],
            StandardGate::Z => array![[one, zero], [zero, -one]],
            StandardGate::H => array![[one, one], [one, -one]] * FRAC_1_SQRT_2,
            StandardGate::S => array![[one, zero], [zero, i]],
            StandardGate::Sdg => array![[one, zero], [zero, -i]],
            StandardGate::T => array![
                [one, zero],
                [zero, Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]
            ],
            StandardGate::Tdg => array![
                [one, zero],
                [zero, Complex64::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2)]
            ],
            StandardGate::SX => array![[one + i, one - i], [one - i, one + i]] * 0.5,
            StandardGate::SXdg => array![[one - i, one + i], [one + i, one - i]] * 0.5,
            StandardGate::Rx(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![
                    [Complex64::new(cos, 0.0), Complex64::new(0.0, -sin)],
                    [Complex64::new(0.0, -sin), Complex64::new(cos, 0.0)]
                ]
            }
            StandardGate::Ry(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![
                    [Complex64::new(cos, 0.0), Complex64::new(-sin, 0.0)],
                    [Complex64::new(sin, 0.0), Complex64::new(cos, 0.0)]
                ]
            }
            StandardGate::Rz(theta) => array![
                [Complex64::from_polar(1.0, -theta / 2.0), zero],
                [zero, Complex64::from_polar(1.0, theta / 2.0)]
            ],
            StandardGate::Phase(theta) => {
                array![[one, zero], [zero, Complex64::from_polar(1.0, theta)]]
            }
        }
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandardGate::X => write!(f, "x"),
            StandardGate::Y => write!(f, "y"),
            StandardGate::Z => write!(f, "z"),
            StandardGate::H => write!(f, "h"),
            StandardGate::S => write!(f, "s"),
            StandardGate::Sdg => write!(f, "sdg"),
            StandardGate::T => write!(f, "t"),
            StandardGate::Tdg => write!(f, "tdg"),
            StandardGate::SX => write!(f, "sx"),
            StandardGate::SXdg => write!(f, "sxdg"),
            StandardGate::Rx(theta) => write!(f, "rx({theta})"),
            StandardGate::Ry(theta) => write!(f, "ry({theta})"),
            StandardGate::Rz(theta) => write!(f, "rz({theta})"),
            StandardGate::Phase(theta) => write!(f, "p({theta})"),
        }
    }
}

/// Parses an angle given either as a float or as a multiple or fraction of `pi`, such as
/// `pi`, `-pi/4` or `3*pi/2`.
fn parse_angle(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }
    let (sign, text) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest.trim()),
        None => (1.0, text),
    };
    let (numerator, denominator) = match text.split_once('/') {
        Some((numerator, denominator)) => (numerator.trim(), denominator.trim().parse().ok()?),
        None => (text, 1.0),
    };
    let factor = match numerator.split_once('*') {
        Some((factor, "pi")) => factor.trim().parse::<f64>().ok()?,
        None if numerator == "pi" => 1.0,
        _ => return None,
    };
    Some(sign * factor * core::f64::consts::PI / denominator)
}

impl FromStr for StandardGate {
    type Err = SynthesisError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let name = text.trim().to_ascii_lowercase();
        let gate = match name.as_str() {
            "x" => Some(StandardGate::X),
            "y" => Some(StandardGate::Y),
            "z" => Some(StandardGate::Z),
            "h" => Some(StandardGate::H),
            "s" => Some(StandardGate::S),
            "sdg" => Some(StandardGate::Sdg),
            "t" => Some(StandardGate::T),
            "tdg" => Some(StandardGate::Tdg),
            "sx" => Some(StandardGate::SX),
            "sxdg" => Some(StandardGate::SXdg),
            _ => name
                .strip_suffix(')')
                .and_then(|rest| rest.split_once('('))
                .and_then(|(kind, angle)| {
                    let theta = parse_angle(angle)?;
                    match kind.trim() {
                        "rx" => Some(StandardGate::Rx(theta)),
                        "ry" => Some(StandardGate::Ry(theta)),
                        "rz" => Some(StandardGate::Rz(theta)),
                        "p" | "phase" => Some(StandardGate::Phase(theta)),
                        _ => None,
                    }
                }),
        };
        gate.ok_or_else(|| SynthesisError::InvalidInput(format!("Unknown gate '{text}'.")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{adjoint, is_unitary, max_abs_diff};
    use core::f64::consts::PI;

    fn are_equal_to_precision(actual: &Array2<Complex64>, expected: &Array2<Complex64>) -> bool {
        max_abs_diff(actual, expected) <= 1e-10
    }

    fn is_self_adjoint(gate: StandardGate) -> bool {
        let matrix = gate.matrix();
        matrix == adjoint(&matrix)
    }

    #[test]
    fn paulis_and_h_are_self_adjoint() {
        for gate in [StandardGate::X, StandardGate::Y, StandardGate::Z, StandardGate::H] {
            assert!(is_self_adjoint(gate), "{gate} should be self adjoint");
        }
    }

    #[test]
    fn every_gate_is_unitary() {
        for gate in [
            StandardGate::X,
            StandardGate::Y,
            StandardGate::Z,
            StandardGate::H,
            StandardGate::S,
            StandardGate::Sdg,
            StandardGate::T,
            StandardGate::Tdg,
            StandardGate::SX,
            StandardGate::SXdg,
            StandardGate::Rx(PI / 7.0),
            StandardGate::Ry(PI / 7.0),
            StandardGate::Rz(PI / 7.0),
            StandardGate::Phase(PI / 7.0),
        ] {
            assert!(is_unitary(&gate.matrix(), 1e-12), "{gate} should be unitary");
        }
    }

    #[test]
    fn s_squares_to_z() {
        let s = StandardGate::S.matrix();
        assert_eq!(s.dot(&s), StandardGate::Z.matrix());
    }

    #[test]
    fn t_squares_to_s() {
        let t = StandardGate::T.matrix();
        assert!(are_equal_to_precision(&t.dot(&t), &StandardGate::S.matrix()));
    }

    #[test]
    fn sx_squares_to_x() {
        let sx = StandardGate::SX.matrix();
        assert!(are_equal_to_precision(&sx.dot(&sx), &StandardGate::X.matrix()));
        assert_eq!(adjoint(&sx), StandardGate::SXdg.matrix());
    }

    #[test]
    fn rotations_by_pi_are_paulis() {
        let i = Complex64::i();
        assert!(are_equal_to_precision(
            &(StandardGate::Rx(PI).matrix() * i),
            &StandardGate::X.matrix()
        ));
        assert!(are_equal_to_precision(
            &(StandardGate::Ry(PI).matrix() * i),
            &StandardGate::Y.matrix()
        ));
        assert!(are_equal_to_precision(
            &(StandardGate::Rz(PI).matrix() * i),
            &StandardGate::Z.matrix()
        ));
        assert!(are_equal_to_precision(
            &StandardGate::Phase(PI).matrix(),
            &StandardGate::Z.matrix()
        ));
    }

    #[test]
    fn parses_gate_names() {
        assert_eq!("x".parse::<StandardGate>(), Ok(StandardGate::X));
        assert_eq!(" SDG ".parse::<StandardGate>(), Ok(StandardGate::Sdg));
        assert_eq!("rx(0.5)".parse::<StandardGate>(), Ok(StandardGate::Rx(0.5)));
        assert_eq!("p(pi)".parse::<StandardGate>(), Ok(StandardGate::Phase(PI)));
        assert_eq!(
            "rz(-pi/4)".parse::<StandardGate>(),
            Ok(StandardGate::Rz(-PI / 4.0))
        );
        assert_eq!(
            "ry(3*pi/2)".parse::<StandardGate>(),
            Ok(StandardGate::Ry(3.0 * PI / 2.0))
        );
    }

    #[test]
    fn rejects_unknown_gates() {
        assert_eq!(
            "cx".parse::<StandardGate>(),
            Err(SynthesisError::InvalidInput("Unknown gate 'cx'.".to_owned()))
        );
        assert!("rx(tau)".parse::<StandardGate>().is_err());
        assert!("rq(0.1)".parse::<StandardGate>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for gate in [StandardGate::Tdg, StandardGate::Rx(0.25), StandardGate::Phase(-1.5)] {
            assert_eq!(gate.to_string().parse::<StandardGate>(), Ok(gate));
        }
    }
}
