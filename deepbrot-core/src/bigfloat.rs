use dashu_base::{Abs, Approximation};
use dashu_float::{DBig, FBig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to build a [`BigFloat`] from a decimal string.
#[derive(Debug, Error)]
#[error("invalid decimal number {input:?}: {reason}")]
pub struct ParseError {
    pub input: String,
    pub reason: String,
}

/// Arbitrary precision floating point with explicit precision enforcement.
///
/// Wraps an `FBig` carrying the requested number of mantissa bits. Exists
/// only for the reference orbit and the viewport; per-pixel delta math
/// stays in f64.
#[derive(Clone, Debug)]
pub struct BigFloat {
    value: FBig,
    precision_bits: usize,
}

impl BigFloat {
    /// Create a BigFloat from f64 with explicit precision.
    ///
    /// NO DEFAULT - precision must always be specified.
    pub fn with_precision(val: f64, precision_bits: usize) -> Self {
        Self {
            value: fbig_from_f64(val, precision_bits),
            precision_bits,
        }
    }

    /// Create zero with explicit precision.
    pub fn zero(precision_bits: usize) -> Self {
        Self::with_precision(0.0, precision_bits)
    }

    /// Get precision in bits.
    pub fn precision_bits(&self) -> usize {
        self.precision_bits
    }

    /// Convert to f64, rounding to the nearest representable value.
    /// Lossy for values requiring more than 53 mantissa bits; underflows
    /// to 0.0 below the f64 exponent range.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().value()
    }

    /// Create a BigFloat from a decimal string with explicit precision.
    ///
    /// Allows values whose distance from a neighbour is far below f64
    /// resolution (deep-zoom coordinates). The decimal digits are converted
    /// to binary in one step at the target precision to avoid double
    /// rounding.
    pub fn from_string(val: &str, precision_bits: usize) -> Result<Self, ParseError> {
        let dbig = val.parse::<DBig>().map_err(|e| ParseError {
            input: val.to_string(),
            reason: e.to_string(),
        })?;

        let halfaway = match dbig.with_base_and_precision::<2>(precision_bits) {
            Approximation::Exact(v) => v,
            Approximation::Inexact(v, _) => v,
        };

        Ok(Self {
            value: halfaway.with_rounding::<dashu_float::round::mode::Zero>(),
            precision_bits,
        })
    }

    /// Add two BigFloats, preserving max precision.
    pub fn add(&self, other: &Self) -> Self {
        Self {
            value: &self.value + &other.value,
            precision_bits: self.precision_bits.max(other.precision_bits),
        }
    }

    /// Subtract two BigFloats, preserving max precision.
    pub fn sub(&self, other: &Self) -> Self {
        Self {
            value: &self.value - &other.value,
            precision_bits: self.precision_bits.max(other.precision_bits),
        }
    }

    /// Multiply two BigFloats, preserving max precision.
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            value: &self.value * &other.value,
            precision_bits: self.precision_bits.max(other.precision_bits),
        }
    }

    /// Multiply by an f64 scalar at this value's precision.
    pub fn mul_f64(&self, scalar: f64) -> Self {
        let rhs = fbig_from_f64(scalar, self.precision_bits);
        Self {
            value: &self.value * &rhs,
            precision_bits: self.precision_bits,
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self {
            value: self.value.clone().abs(),
            precision_bits: self.precision_bits,
        }
    }
}

fn fbig_from_f64(val: f64, precision_bits: usize) -> FBig {
    if val == 0.0 {
        // FBig::try_from cannot attach precision to zero
        FBig::ZERO.with_precision(precision_bits).unwrap()
    } else {
        FBig::try_from(val)
            .unwrap()
            .with_precision(precision_bits)
            .unwrap()
    }
}

impl PartialEq for BigFloat {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl std::fmt::Display for BigFloat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Serialize, Deserialize)]
struct BigFloatSerde {
    value: String,
    precision_bits: usize,
}

impl Serialize for BigFloat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        BigFloatSerde {
            value: self.value.to_string(),
            precision_bits: self.precision_bits,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigFloat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let serde = BigFloatSerde::deserialize(deserializer)?;

        let value = serde
            .value
            .parse::<FBig>()
            .map_err(|e| serde::de::Error::custom(format!("failed to parse FBig: {}", e)))?;

        Ok(BigFloat {
            value,
            precision_bits: serde.precision_bits,
        })
    }
}
