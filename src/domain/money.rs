use {
    serde::{Deserialize, Serialize},
    std::fmt,
    std::iter::Sum,
};

/// A monetary total as reported by the vendor, in major currency units.
///
/// Vendor totals arrive as JSON numbers or numeric strings; anything that
/// does not read as a finite number counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value)
        } else {
            Self::ZERO
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        let parsed = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.map(Self::new).unwrap_or(Self::ZERO)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Neumaier compensated summation: the result does not drift with the
/// order the records arrive in beyond rounding of the final value.
impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        let mut sum = 0.0_f64;
        let mut compensation = 0.0_f64;
        for Amount(x) in iter {
            let t = sum + x;
            if sum.abs() >= x.abs() {
                compensation += (sum - t) + x;
            } else {
                compensation += (x - t) + sum;
            }
            sum = t;
        }
        Amount::new(sum + compensation)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
