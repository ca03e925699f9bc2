//! Fixed-point encoding of physical quantities.
//!
//! `encode(value, scale, missing)` rounds `value * scale` half away from zero
//! and clamps it into the target width. Absent or non-finite input yields the
//! caller's missing sentinel. Nothing here ever fails.

/// Integer widths a record field may be declared with.
pub trait FixedWidth: Copy {
    const MIN: i64;
    const MAX: i64;
    fn from_clamped(v: i64) -> Self;
    fn widen(self) -> i64;
}

macro_rules! fixed_width {
    ($($t:ty),*) => {$(
        impl FixedWidth for $t {
            const MIN: i64 = <$t>::MIN as i64;
            const MAX: i64 = <$t>::MAX as i64;
            #[inline]
            fn from_clamped(v: i64) -> Self { v as $t }
            #[inline]
            fn widen(self) -> i64 { self as i64 }
        }
    )*};
}

fixed_width!(u8, i8, u16, i16, u32, i32);

/// How an encoded value came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exact,
    Missing,
    Clamped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded<T> {
    pub value: T,
    pub outcome: Outcome,
}

pub fn encode_checked<T: FixedWidth>(value: Option<f64>, scale: f64, missing: T) -> Encoded<T> {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return Encoded { value: missing, outcome: Outcome::Missing };
    };
    let scaled = (v * scale).round();
    if !scaled.is_finite() {
        return Encoded { value: missing, outcome: Outcome::Missing };
    }
    // clamp in f64 first: `as i64` would saturate anyway but the bounds are exact here
    let (lo, hi) = (T::MIN as f64, T::MAX as f64);
    if scaled < lo {
        Encoded { value: T::from_clamped(T::MIN), outcome: Outcome::Clamped }
    } else if scaled > hi {
        Encoded { value: T::from_clamped(T::MAX), outcome: Outcome::Clamped }
    } else {
        Encoded { value: T::from_clamped(scaled as i64), outcome: Outcome::Exact }
    }
}

#[inline]
pub fn encode<T: FixedWidth>(value: Option<f64>, scale: f64, missing: T) -> T {
    encode_checked(value, scale, missing).value
}

#[inline]
pub fn decode<T: FixedWidth>(encoded: T, scale: f64) -> f64 {
    encoded.widen() as f64 / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_i16() {
        assert_eq!(encode::<i16>(Some(1e9), 100.0, -1), 32767);
        assert_eq!(encode::<i16>(Some(-1e9), 100.0, -1), -32768);
        let e = encode_checked::<i16>(Some(1e9), 100.0, -1);
        assert_eq!(e.outcome, Outcome::Clamped);
    }

    #[test]
    fn unsigned_floor_is_zero() {
        assert_eq!(encode::<u16>(Some(-3.0), 1.0, 0), 0);
        assert_eq!(encode::<u8>(Some(300.0), 1.0, 0), 255);
    }

    #[test]
    fn missing_and_non_finite_use_sentinel() {
        assert_eq!(encode::<i16>(None, 100.0, -1), -1);
        assert_eq!(encode::<u16>(Some(f64::NAN), 100.0, 7), 7);
        assert_eq!(encode::<u32>(Some(f64::INFINITY), 1000.0, 0), 0);
        assert_eq!(encode_checked::<i16>(None, 1.0, -1).outcome, Outcome::Missing);
    }

    #[test]
    fn hydrogen_melting_point() {
        assert_eq!(encode::<i16>(Some(14.01), 100.0, -1), 1401);
        assert_eq!(encode::<u32>(Some(1.008), 1000.0, 0), 1008);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(encode::<i16>(Some(0.5), 1.0, 0), 1);
        assert_eq!(encode::<i16>(Some(-0.5), 1.0, 0), -1);
        assert_eq!(encode::<i16>(Some(2.5), 1.0, 0), 3);
    }

    #[test]
    fn decode_is_within_one_step() {
        for &(v, scale) in &[(14.01, 100.0), (-273.15, 100.0), (0.0899, 1000.0), (3.98, 100.0), (65.0, 1000.0)] {
            let back = decode(encode::<i32>(Some(v), scale, 0), scale);
            assert!((back - v).abs() <= 1.0 / scale, "{v} -> {back}");
        }
        let back = decode(encode::<u16>(Some(13.598), 1000.0, 0), 1000.0);
        assert!((back - 13.598).abs() <= 1e-3);
    }
}
