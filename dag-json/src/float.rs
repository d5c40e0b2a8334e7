//! Float-rendering policy for dag-json's `float_format` encoder option (spec §4.3, §6).

/// How the encoder renders a finite `f64` (NaN/±∞ are rejected before this runs).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FloatFormat {
    /// Always `%e` form, e.g. `1e0`, `3.141592653589793e0`.
    Scientific,
    /// Always decimal form, appending `.0` when the value is integral (e.g. `10.0`).
    Decimal,
    /// Decimal when the value's base-10 exponent falls in `[min_exp10, max_exp10]`
    /// (either bound optional/unbounded), scientific otherwise.
    DecimalInRange {
        /// Inclusive lower bound on `floor(log10(|v|))`, or unbounded if `None`.
        min_exp10: Option<i32>,
        /// Inclusive upper bound on `floor(log10(|v|))`, or unbounded if `None`.
        max_exp10: Option<i32>,
    },
}

impl Default for FloatFormat {
    fn default() -> Self {
        FloatFormat::Decimal
    }
}

impl FloatFormat {
    /// Renders a finite `f64` as dag-json requires: negative zero always as
    /// `-0.0`, everything else per this format's policy.
    pub fn render(&self, value: f64) -> String {
        if value == 0.0 && value.is_sign_negative() {
            return "-0.0".to_string();
        }
        match self {
            FloatFormat::Scientific => render_scientific(value),
            FloatFormat::Decimal => render_decimal(value),
            FloatFormat::DecimalInRange {
                min_exp10,
                max_exp10,
            } => {
                let exp = if value == 0.0 {
                    0
                } else {
                    value.abs().log10().floor() as i32
                };
                let in_range = min_exp10.map_or(true, |min| exp >= min)
                    && max_exp10.map_or(true, |max| exp <= max);
                if in_range {
                    render_decimal(value)
                } else {
                    render_scientific(value)
                }
            }
        }
    }
}

fn render_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        let s = format!("{value}");
        if s.contains('.') || s.contains('e') {
            s
        } else {
            format!("{s}.0")
        }
    }
}

fn render_scientific(value: f64) -> String {
    format!("{value:e}")
}
