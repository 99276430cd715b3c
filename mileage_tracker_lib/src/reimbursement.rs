pub const DEFAULT_RATE_PER_MILE: f64 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid reimbursement rate {0}, expected a finite non-negative number")]
pub struct InvalidRate(pub f64);

/// Dollars paid per mile. Applied to totals when they are read, never stored with a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReimbursementRate(f64);

impl ReimbursementRate {
    pub fn new(dollars_per_mile: f64) -> Result<Self, InvalidRate> {
        if !dollars_per_mile.is_finite() || dollars_per_mile < 0. {
            return Err(InvalidRate(dollars_per_mile));
        }
        Ok(Self(dollars_per_mile))
    }

    pub fn per_mile(self) -> f64 {
        self.0
    }

    /// `miles * rate`, rounded to cents.
    pub fn reimbursement_for(self, miles: f64) -> f64 {
        round_cents(miles * self.0)
    }
}

impl Default for ReimbursementRate {
    fn default() -> Self {
        Self(DEFAULT_RATE_PER_MILE)
    }
}

/// Rounds a non-negative dollar amount to two decimals, half-up.
pub fn round_cents(amount: f64) -> f64 {
    // Snap to 1e-6 cents first so binary noise (1.005 -> 100.49999...) can't flip the rounding.
    let cents = (amount * 100. * 1e6).round() / 1e6;
    (cents + 0.5).floor() / 100.
}
