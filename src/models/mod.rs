//! Per-tree biological models: growth, mortality and seed dispersal.

pub mod dispersal;
pub mod growth;
pub mod mortality;

pub use dispersal::{disperse, DispersalParams, RadialSampling, SeedCandidate, Wind};
pub use growth::GrowthModel;
pub use mortality::MortalityModel;

/// Chapman–Richards curve `asymptote * (1 - growth_range * e^(-rate * t))^(1 / (1 - slope))`.
pub(crate) fn chapman_richards(
    t: f64,
    asymptote: f64,
    growth_range: f64,
    rate: f64,
    slope: f64,
) -> f64 {
    let base = (1.0 - growth_range * (-rate * t).exp()).max(0.0);
    asymptote * base.powf(1.0 / (1.0 - slope))
}

/// Shared parameter checks for the curve. `slope` must stay below 1 for the
/// curve to be monotone.
pub(crate) fn validate_curve(
    model: &'static str,
    growth_range: f64,
    rate: f64,
    slope: f64,
) -> Result<(), crate::error::ConfigError> {
    use crate::error::ConfigError;

    if !(growth_range > 0.0 && growth_range <= 1.0) {
        return Err(ConfigError::invalid(
            model,
            format!("growth_range must lie in (0, 1], got {growth_range}"),
        ));
    }
    if !(rate.is_finite() && rate > 0.0) {
        return Err(ConfigError::invalid(
            model,
            format!("rate must be positive, got {rate}"),
        ));
    }
    if !(slope.is_finite() && slope < 1.0) {
        return Err(ConfigError::invalid(
            model,
            format!("slope must be below 1, got {slope}"),
        ));
    }
    Ok(())
}
