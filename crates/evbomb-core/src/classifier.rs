//! Outcome classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::register::MeasurementRegister;

/// What a tester run concluded about a bomb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The control completed its rotation: nothing absorbed the target.
    Dud,
    /// The control stayed put without an explosion: a live bomb found
    /// without being set off.
    Live,
    /// A target reading fired the bomb.
    Detonated,
}

impl Outcome {
    /// Every outcome, in display order.
    pub const ALL: [Outcome; 3] = [Outcome::Dud, Outcome::Live, Outcome::Detonated];

    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Dud => "dud",
            Outcome::Live => "live",
            Outcome::Detonated => "detonated",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one register.
///
/// Checked in order: any intermediate bit set means `Detonated`; otherwise
/// a set final bit means `Dud`; otherwise `Live`. A one-bit register is
/// judged on its final bit alone and an empty register is `Live`.
pub fn classify(register: &MeasurementRegister) -> Outcome {
    classify_bits(register.bits())
}

/// [`classify`] over raw construction-order bits.
pub fn classify_bits(bits: &[bool]) -> Outcome {
    let Some((&last, intermediate)) = bits.split_last() else {
        return Outcome::Live;
    };
    if intermediate.iter().any(|&b| b) {
        Outcome::Detonated
    } else if last {
        Outcome::Dud
    } else {
        Outcome::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reg(s: &str) -> MeasurementRegister {
        MeasurementRegister::from_bit_str(s).unwrap()
    }

    #[test]
    fn test_single_step_registers() {
        assert_eq!(classify(&reg("01")), Outcome::Dud);
        assert_eq!(classify(&reg("10")), Outcome::Detonated);
        assert_eq!(classify(&reg("11")), Outcome::Detonated);
        assert_eq!(classify(&reg("00")), Outcome::Live);
    }

    #[test]
    fn test_detonation_in_any_step() {
        assert_eq!(classify(&reg("00101")), Outcome::Detonated);
        assert_eq!(classify(&reg("00010")), Outcome::Detonated);
        assert_eq!(classify(&reg("00001")), Outcome::Dud);
    }

    #[test]
    fn test_short_registers() {
        assert_eq!(classify(&reg("1")), Outcome::Dud);
        assert_eq!(classify(&reg("0")), Outcome::Live);
        assert_eq!(classify(&reg("")), Outcome::Live);
    }

    #[test]
    fn test_outcome_names() {
        let names: Vec<_> = Outcome::ALL.iter().map(Outcome::to_string).collect();
        assert_eq!(names, ["dud", "live", "detonated"]);
        assert_eq!(
            serde_json::to_string(&Outcome::Detonated).unwrap(),
            "\"detonated\""
        );
    }

    proptest! {
        #[test]
        fn prop_intermediate_one_always_detonates(
            mut bits in prop::collection::vec(any::<bool>(), 2..32),
            pos in any::<prop::sample::Index>(),
            last in any::<bool>(),
        ) {
            let n = bits.len();
            bits[pos.index(n - 1)] = true;
            bits[n - 1] = last;
            prop_assert_eq!(classify_bits(&bits), Outcome::Detonated);
        }

        #[test]
        fn prop_quiet_target_reads_final_bit(steps in 0usize..32, last in any::<bool>()) {
            let mut bits = vec![false; steps];
            bits.push(last);
            let expected = if last { Outcome::Dud } else { Outcome::Live };
            prop_assert_eq!(classify_bits(&bits), expected);
        }

        #[test]
        fn prop_depends_only_on_bits(bits in prop::collection::vec(any::<bool>(), 0..32)) {
            let register = MeasurementRegister::new(bits.clone());
            prop_assert_eq!(classify(&register), classify_bits(&bits));
            prop_assert!(Outcome::ALL.contains(&classify_bits(&bits)));
        }
    }
}
