//! Monthly validity aggregate.

/// Share of consultations in one month whose patient reference is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyProportion {
    /// Month label in `YYYY-MM` form.
    pub month: String,
    /// Consultations in the month with a known patient.
    pub valid: usize,
    /// All dated consultations in the month. Never zero.
    pub total: usize,
}

impl MonthlyProportion {
    pub fn new(month: impl Into<String>, valid: usize, total: usize) -> Self {
        debug_assert!(total > 0 && valid <= total);
        Self {
            month: month.into(),
            valid,
            total,
        }
    }

    /// Fraction in `[0, 1]`.
    #[must_use]
    pub fn proportion(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.valid as f64 / self.total as f64
    }
}
