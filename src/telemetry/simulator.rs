use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::model::SeatId;

/// Stand-in sensor feed producing random readings for every known seat.
pub struct OccupancySimulator {
    rng: StdRng,
    occupancy_probability: f64,
}

impl OccupancySimulator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            occupancy_probability: 0.5,
        }
    }

    /// Clamped to `0.0..=1.0`; NaN or infinite values keep the even default.
    pub fn with_occupancy_probability(mut self, probability: f64) -> Self {
        self.occupancy_probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.5
        };
        self
    }

    /// Build a payload in the wire shape the telemetry channel accepts.
    pub fn next_payload(&mut self, seat_ids: &[SeatId]) -> String {
        let seats: Vec<_> = seat_ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "isOccupied": self.rng.gen_bool(self.occupancy_probability),
                    "signalStrength": self.rng.gen_range(0.0..=100.0_f64).round(),
                    "batteryLevel": self.rng.gen_range(0.0..=100.0_f64).round(),
                })
            })
            .collect();
        json!({ "seats": seats }).to_string()
    }
}

impl Default for OccupancySimulator {
    fn default() -> Self {
        Self::new()
    }
}
