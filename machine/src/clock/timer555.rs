use crate::error::{self, Result};

/// A 555 timer wired as an astable oscillator: f = 1.44 / ((R1 + 2 * R2) * C).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Astable555 {
    pub r1_ohms: f64,
    pub r2_ohms: f64,
    pub c_farads: f64,
}

const K: f64 = 1.44;

impl Astable555 {
    pub fn new(r1_ohms: f64, r2_ohms: f64, c_farads: f64) -> Result<Astable555> {
        for &(name, value) in &[("R1", r1_ohms), ("R2", r2_ohms), ("C", c_farads)] {
            if !value.is_finite() || value <= 0. {
                return Err(error::Type::InvalidComponent(format!("{} = {}", name, value)));
            }
        }
        Ok(Astable555 { r1_ohms, r2_ohms, c_farads })
    }

    /// Picks R1 = R2 for `target_hz` with the given capacitor.
    pub fn design_for_frequency(target_hz: f64, c_farads: f64) -> Result<Astable555> {
        if !target_hz.is_finite() || target_hz <= 0. {
            return Err(error::Type::InvalidFrequency(target_hz));
        }
        let r = K / (3. * target_hz * c_farads);
        Astable555::new(r, r, c_farads)
    }

    pub fn frequency_hz(&self) -> f64 {
        K / ((self.r1_ohms + 2. * self.r2_ohms) * self.c_farads)
    }

    /// Fraction of the period spent high.
    pub fn duty_cycle(&self) -> f64 {
        (self.r1_ohms + self.r2_ohms) / (self.r1_ohms + 2. * self.r2_ohms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < expected * 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_frequency() {
        // 1k, 10k, 10uF: 1.44 / (21000 * 10e-6) = 6.857 Hz.
        let timer = Astable555::new(1_000., 10_000., 10e-6).unwrap();
        assert_close(timer.frequency_hz(), 1.44 / 0.21);
    }

    #[test]
    fn test_design_round_trip() {
        for &(hz, c) in &[(1., 10e-6), (0.5, 47e-6), (100., 1e-6)] {
            let timer = Astable555::design_for_frequency(hz, c).unwrap();
            assert_eq!(timer.r1_ohms, timer.r2_ohms);
            assert_close(timer.frequency_hz(), hz);
            assert_close(timer.duty_cycle(), 2. / 3.);
        }
    }

    #[test]
    fn test_rejects_bad_components() {
        assert!(Astable555::new(0., 1., 1.).is_err());
        assert!(Astable555::new(1., -1., 1.).is_err());
        assert!(Astable555::new(1., 1., f64::NAN).is_err());
        assert!(Astable555::design_for_frequency(0., 10e-6).is_err());
        assert!(Astable555::design_for_frequency(1., 0.).is_err());
    }
}
