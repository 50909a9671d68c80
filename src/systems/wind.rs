use rand::Rng;

use crate::config::WindStrategy;
use crate::models::dispersal::Wind;
use crate::rng::{RngManager, WIND_STREAM};

/// Draws the wind for the year `rng` is currently set to. One sample serves
/// every tree of that year.
pub fn resolve_wind(strategy: &WindStrategy, rng: &RngManager) -> Wind {
    match *strategy {
        WindStrategy::Fixed {
            direction_deg,
            strength,
        } => Wind {
            direction_deg,
            strength,
        },
        WindStrategy::Random {
            min_strength,
            max_strength,
        } => {
            let mut stream = rng.stream(WIND_STREAM);
            let direction_deg = stream.gen_range(0.0..360.0);
            let strength = stream.gen_range(min_strength..=max_strength);
            Wind {
                direction_deg,
                strength: f64::from(strength),
            }
        }
    }
}
