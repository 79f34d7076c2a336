//! Gas limit policy

/// Scale a gas estimate by `permille / 1000`, saturating at `u64::MAX`.
pub fn apply_gas_multiplier(estimate: u64, permille: u64) -> u64 {
    let scaled = u128::from(estimate) * u128::from(permille) / 1000;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
