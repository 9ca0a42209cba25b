//! Dense-backed frequency vector with zero-safe arithmetic.
//!
//! Plays the role of the source's sparse/dense k-mer count and
//! frequency vectors. Backed by a plain `Vec<T>` rather than a real
//! sparse structure: for the k values this toolkit supports
//! (`num_states ^ k <= 2^28`, enforced in [`FreqVec::zeros`]) a dense
//! array is small enough to be simpler and faster than a hash map.

use crate::error::{DvsError, Result};
use num_traits::{NumCast, Zero};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Sub, SubAssign};

/// Entries above `2^28` would need several GB just for one vector;
/// refuse before allocating rather than let the process thrash.
const MAX_LENGTH: usize = 1 << 28;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreqVec<T> {
    length: usize,
    data: Vec<T>,
}

/// Bound satisfied by both the integer counts (`u64`) and the float
/// frequencies (`f64`) this toolkit carries around.
pub trait FreqNum:
    Copy + PartialEq + Zero + Add<Output = Self> + Sub<Output = Self> + Div<Output = Self>
{
}
impl<T> FreqNum for T where
    T: Copy + PartialEq + Zero + Add<Output = T> + Sub<Output = T> + Div<Output = T>
{
}

impl<T: FreqNum> FreqVec<T> {
    pub fn zeros(length: usize) -> Result<Self> {
        if length > MAX_LENGTH {
            return Err(DvsError::config(format!(
                "requested vector of {length} entries exceeds the {MAX_LENGTH} budget; reduce k or the alphabet size"
            )));
        }
        Ok(Self {
            length,
            data: vec![T::zero(); length],
        })
    }

    pub fn from_dense(data: Vec<T>) -> Result<Self> {
        if data.len() > MAX_LENGTH {
            return Err(DvsError::config(format!(
                "vector of {} entries exceeds the {MAX_LENGTH} budget",
                data.len()
            )));
        }
        Ok(Self {
            length: data.len(),
            data,
        })
    }

    pub fn from_sparse(entries: &[(usize, T)], length: usize) -> Result<Self> {
        let mut v = Self::zeros(length)?;
        for &(i, val) in entries {
            v.set(i, val)?;
        }
        Ok(v)
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, i: usize) -> Result<T> {
        self.data
            .get(i)
            .copied()
            .ok_or_else(|| DvsError::value(format!("index {i} out of bounds for length {}", self.length)))
    }

    pub fn set(&mut self, i: usize, v: T) -> Result<()> {
        if i >= self.length {
            return Err(DvsError::value(format!(
                "index {i} out of bounds for length {}",
                self.length
            )));
        }
        self.data[i] = v;
        Ok(())
    }

    /// In-place `self[i] += v`, for the common counting hot path.
    pub fn add_at(&mut self, i: usize, v: T) -> Result<()>
    where
        T: AddAssign,
    {
        if i >= self.length {
            return Err(DvsError::value(format!(
                "index {i} out of bounds for length {}",
                self.length
            )));
        }
        self.data[i] += v;
        Ok(())
    }

    pub fn sum(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &v| acc + v)
    }

    /// Values whose magnitude exceeds machine epsilon; entries within
    /// half a ulp of zero are treated as absent.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = T> + '_
    where
        T: NumCast,
    {
        self.data.iter().copied().filter(|&v| {
            let f: f64 = NumCast::from(v).unwrap_or(0.0);
            f.abs() > f64::EPSILON
        })
    }

    fn check_same_length(&self, other: &Self) -> Result<()> {
        if self.length != other.length {
            return Err(DvsError::value(format!(
                "vectors have mismatched lengths {} and {}",
                self.length, other.length
            )));
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.check_same_length(other)?;
        Ok(Self {
            length: self.length,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| a + b)
                .collect(),
        })
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        self.check_same_length(other)?;
        Ok(Self {
            length: self.length,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| a - b)
                .collect(),
        })
    }

    /// Elementwise division. Division by zero yields zero rather than
    /// NaN or infinity (mirrors `nan_to_num(..., nan=0.0)` in the
    /// source, applied uniformly so a zero divisor never escapes as
    /// infinity either).
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        self.check_same_length(other)?;
        Ok(Self {
            length: self.length,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| divide_or_zero(a, b))
                .collect(),
        })
    }

    pub fn add_scalar(&self, s: T) -> Self {
        Self {
            length: self.length,
            data: self.data.iter().map(|&a| a + s).collect(),
        }
    }

    pub fn sub_scalar(&self, s: T) -> Self {
        Self {
            length: self.length,
            data: self.data.iter().map(|&a| a - s).collect(),
        }
    }

    pub fn div_scalar(&self, s: T) -> Self {
        Self {
            length: self.length,
            data: self.data.iter().map(|&a| divide_or_zero(a, s)).collect(),
        }
    }
}

fn divide_or_zero<T: FreqNum>(a: T, b: T) -> T {
    if b == T::zero() {
        T::zero()
    } else {
        a / b
    }
}

impl FreqVec<f64> {
    /// Shannon entropy in bits, `-sum(p * log2(p))`. Entries that are
    /// not strictly positive beyond machine tolerance don't
    /// contribute (matches `scipy`'s handling of zero probabilities:
    /// `0 * log(0)` is taken to be `0`, not `NaN`).
    pub fn entropy(&self) -> f64 {
        const EPS: f64 = 1e-8;
        self.data
            .iter()
            .filter(|&&p| p > EPS)
            .map(|&p| -p * p.log2())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_rejects_oversized_length() {
        assert!(FreqVec::<u64>::zeros(MAX_LENGTH + 1).is_err());
        assert!(FreqVec::<u64>::zeros(16).is_ok());
    }

    #[test]
    fn add_at_accumulates_counts() {
        let mut v = FreqVec::<u64>::zeros(4).unwrap();
        v.add_at(2, 1).unwrap();
        v.add_at(2, 1).unwrap();
        v.add_at(3, 5).unwrap();
        assert_eq!(v.get(2).unwrap(), 2);
        assert_eq!(v.get(3).unwrap(), 5);
        assert_eq!(v.sum(), 7);
    }

    #[test]
    fn vector_minus_itself_is_zero() {
        let v = FreqVec::from_dense(vec![1.0, 2.0, 3.0]).unwrap();
        let zero = v.checked_sub(&v).unwrap();
        assert!(zero.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn division_by_zero_vector_is_zero_vector() {
        let v = FreqVec::from_dense(vec![1.0, 2.0, 0.0]).unwrap();
        let zeros = FreqVec::from_dense(vec![0.0, 0.0, 0.0]).unwrap();
        let out = v.checked_div(&zeros).unwrap();
        assert_eq!(out.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn scalar_integer_division_truncates() {
        let v = FreqVec::from_sparse(&[(2, 3u64), (3, 9)], 4).unwrap();
        let out = v.div_scalar(3);
        assert_eq!(out.get(2).unwrap(), 1);
        assert_eq!(out.get(3).unwrap(), 3);
    }

    #[test]
    fn division_mismatched_lengths_is_value_error() {
        let a = FreqVec::from_dense(vec![1.0, 2.0]).unwrap();
        let b = FreqVec::from_dense(vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(a.checked_div(&b), Err(DvsError::Value(_))));
    }

    #[test]
    fn iter_nonzero_skips_epsilon_entries() {
        let v = FreqVec::from_dense(vec![0.0, 0.25, 0.0, 0.75]).unwrap();
        let nz: Vec<f64> = v.iter_nonzero().collect();
        assert_eq!(nz, vec![0.25, 0.75]);
    }

    #[test]
    fn entropy_of_uniform_four_state_distribution_is_two_bits() {
        let v = FreqVec::from_dense(vec![0.25, 0.25, 0.25, 0.25]).unwrap();
        assert!((v.entropy() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_ignores_near_zero_entries() {
        let v = FreqVec::from_dense(vec![1.0, 1e-12]).unwrap();
        assert!((v.entropy() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn serde_round_trip_preserves_values() {
        let v = FreqVec::from_dense(vec![1.0, 2.0, 3.0]).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: FreqVec<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
