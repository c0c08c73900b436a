//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use evbomb_ir::StandardGate;

/// Amplitudes below this squared norm are treated as zero when collapsing.
const COLLAPSE_EPSILON: f64 = 1e-15;

/// A statevector over `num_qubits` qubits.
///
/// Basis index bit `k` holds the value of qubit `k`.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Amplitude of a basis state.
    pub fn amplitude(&self, basis: usize) -> Complex64 {
        self.amplitudes[basis]
    }

    /// Sum of squared amplitude magnitudes; 1 for a valid state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Probability that measuring `qubit` yields 1.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Apply a gate. `qubits` must match the gate's arity.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) {
        match *gate {
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::Ry(theta) => self.apply_ry(qubits[0], theta),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
        }
    }

    /// Projectively measure one qubit in the Z basis.
    ///
    /// The state collapses onto the observed outcome and is renormalised,
    /// so later gates act on the post-measurement state.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> bool {
        let p_one = self.probability_one(qubit);
        let outcome = rng.r#gen::<f64>() < p_one;
        self.collapse(qubit, outcome, if outcome { p_one } else { 1.0 - p_one });
        outcome
    }

    fn collapse(&mut self, qubit: usize, outcome: bool, probability: f64) {
        let mask = 1 << qubit;
        let scale = if probability > COLLAPSE_EPSILON {
            1.0 / probability.sqrt()
        } else {
            0.0
        };
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
    }

    /// Reset a qubit to |0⟩ by measuring it and flipping a 1.
    pub fn reset<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) {
        if self.measure(qubit, rng) {
            self.apply_x(qubit);
        }
    }

    /// Sample a full basis state without disturbing the statevector.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();
        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }
        self.amplitudes.len() - 1
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-10;

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert_eq!(sv.num_qubits(), 2);
        assert!((sv.amplitude(0).re - 1.0).abs() < TOL);
        assert!((sv.norm_sqr() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_ry_pi_flips_qubit() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::Ry(PI), &[0]);
        assert!((sv.probability_one(0) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_ry_small_angle_probability() {
        let theta = PI / 10.0;
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::Ry(theta), &[0]);
        let expected = (theta / 2.0).sin().powi(2);
        assert!((sv.probability_one(0) - expected).abs() < TOL);
    }

    #[test]
    fn test_cx_entangles() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]);
        sv.apply_gate(&StandardGate::CX, &[0, 1]);
        let inv = 1.0 / 2.0_f64.sqrt();
        assert!((sv.amplitude(0b00).re - inv).abs() < TOL);
        assert!((sv.amplitude(0b11).re - inv).abs() < TOL);
        assert!(sv.amplitude(0b01).norm() < TOL);
    }

    #[test]
    fn test_measure_collapses_entangled_pair() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let mut sv = Statevector::new(2);
            sv.apply_gate(&StandardGate::H, &[0]);
            sv.apply_gate(&StandardGate::CX, &[0, 1]);

            let target = sv.measure(1, &mut rng);
            assert!((sv.norm_sqr() - 1.0).abs() < TOL);
            // The partner qubit is now certain.
            let p = sv.probability_one(0);
            assert!((p - if target { 1.0 } else { 0.0 }).abs() < TOL);
            assert_eq!(sv.measure(0, &mut rng), target);
        }
    }

    #[test]
    fn test_measure_certain_outcomes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new(1);
        assert!(!sv.measure(0, &mut rng));
        sv.apply_gate(&StandardGate::X, &[0]);
        assert!(sv.measure(0, &mut rng));
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, &[0]);
        sv.reset(0, &mut rng);
        assert!(sv.probability_one(0) < TOL);
    }

    #[test]
    fn test_cx_acts_only_on_set_control() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::CX, &[0, 1]);
        assert!((sv.amplitude(0b00).re - 1.0).abs() < TOL);

        sv.apply_gate(&StandardGate::X, &[0]);
        sv.apply_gate(&StandardGate::CX, &[0, 1]);
        assert!((sv.amplitude(0b11).re - 1.0).abs() < TOL);
    }

    #[test]
    fn test_hadamard_twice_is_identity() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, &[0]);
        assert!((sv.probability_one(0) - 0.5).abs() < TOL);
        sv.apply_gate(&StandardGate::H, &[0]);
        assert!((sv.amplitude(0).re - 1.0).abs() < TOL);
    }

    #[test]
    fn test_sample_basis_state() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut sv = Statevector::new(3);
        sv.apply_gate(&StandardGate::X, &[2]);
        assert_eq!(sv.sample(&mut rng), 0b100);
    }
}
