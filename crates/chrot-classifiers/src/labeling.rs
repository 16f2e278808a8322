//! Rule-based rotation labels with injected noise.
//!
//! When a dataset arrives without `OptimalCHRotation`, a label is derived
//! from energy, traffic and packet thresholds and then flipped with a small
//! probability to simulate label uncertainty.
use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::io::CsvTable;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LabelRule {
    pub residual_energy_below: f64,
    pub traffic_load_above: f64,
    pub packets_received_below: f64,
    pub flip_probability: f64,
}

impl Default for LabelRule {
    fn default() -> Self {
        Self {
            residual_energy_below: 40.0,
            traffic_load_above: 3000.0,
            packets_received_below: 1000.0,
            flip_probability: 0.07,
        }
    }
}

impl LabelRule {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.flip_probability) {
            bail!(
                "flip_probability must be within [0, 1], got {}",
                self.flip_probability
            );
        }
        Ok(())
    }

    /// Noise-free label: 1 when energy is low, traffic is high or too few
    /// packets arrive.
    pub fn base_label(&self, traffic_load: f64, packet_received: f64, residual_energy: f64) -> usize {
        let rotate = residual_energy < self.residual_energy_below
            || traffic_load > self.traffic_load_above
            || packet_received < self.packets_received_below;
        usize::from(rotate)
    }

    pub fn noisy_label<R: Rng + ?Sized>(
        &self,
        traffic_load: f64,
        packet_received: f64,
        residual_energy: f64,
        rng: &mut R,
    ) -> usize {
        let base = self.base_label(traffic_load, packet_received, residual_energy);
        flip_with_probability(base, self.flip_probability, rng)
    }
}

/// Rotation label with the default thresholds and no noise.
pub fn base_rotation_label(traffic_load: f64, packet_received: f64, residual_energy: f64) -> usize {
    LabelRule::default().base_label(traffic_load, packet_received, residual_energy)
}

/// Invert a binary label with probability `p`.
pub fn flip_with_probability<R: Rng + ?Sized>(label: usize, p: f64, rng: &mut R) -> usize {
    if rng.gen::<f64>() < p {
        1 - label
    } else {
        label
    }
}

/// One noisy label per table row.
pub fn synthesize_labels<R: Rng + ?Sized>(
    table: &CsvTable,
    rule: &LabelRule,
    rng: &mut R,
) -> Result<Vec<usize>> {
    rule.validate()?;
    let traffic = table.numeric_column("TrafficLoad")?;
    let packets = table.numeric_column("PacketReceived")?;
    let energy = table.numeric_column("ResidualEnergy")?;

    Ok(traffic
        .iter()
        .zip(&packets)
        .zip(&energy)
        .map(|((&t, &p), &e)| rule.noisy_label(t, p, e, rng))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn low_energy_triggers_rotation() {
        assert_eq!(base_rotation_label(500.0, 2000.0, 20.0), 1);
    }

    #[test]
    fn each_condition_alone_triggers_rotation() {
        assert_eq!(base_rotation_label(3500.0, 2000.0, 80.0), 1);
        assert_eq!(base_rotation_label(500.0, 900.0, 80.0), 1);
        assert_eq!(base_rotation_label(500.0, 2000.0, 80.0), 0);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(base_rotation_label(3000.0, 1000.0, 40.0), 0);
    }

    #[test]
    fn values_just_past_a_threshold_rotate() {
        let table = CsvTable::from_parts(
            vec![
                "TrafficLoad".into(),
                "PacketReceived".into(),
                "ResidualEnergy".into(),
            ],
            vec![
                vec!["3000.0001".into(), "2000".into(), "80".into()],
                vec!["500".into(), "2000".into(), "39.999999".into()],
                vec!["500".into(), "999.99999".into(), "80".into()],
            ],
        )
        .unwrap();
        let rule = LabelRule {
            flip_probability: 0.0,
            ..LabelRule::default()
        };
        let labels = synthesize_labels(&table, &rule, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(labels, vec![1, 1, 1]);
    }

    #[test]
    fn zero_noise_keeps_rule() {
        let rule = LabelRule {
            flip_probability: 0.0,
            ..LabelRule::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        for energy in [10.0, 39.9, 40.0, 90.0] {
            assert_eq!(
                rule.noisy_label(100.0, 5000.0, energy, &mut rng),
                rule.base_label(100.0, 5000.0, energy)
            );
        }
    }

    #[test]
    fn certain_noise_always_flips() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(flip_with_probability(0, 1.0, &mut rng), 1);
        assert_eq!(flip_with_probability(1, 1.0, &mut rng), 0);
    }

    #[test]
    fn flip_rate_is_close_to_seven_percent() {
        let rule = LabelRule::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 100_000;
        let flipped = (0..n)
            .filter(|_| rule.noisy_label(500.0, 2000.0, 80.0, &mut rng) == 1)
            .count();
        let rate = flipped as f64 / n as f64;
        assert!((rate - 0.07).abs() < 0.005, "flip rate {}", rate);
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let rule = LabelRule {
            flip_probability: 1.5,
            ..LabelRule::default()
        };
        assert!(rule.validate().is_err());
    }
}
