//! 3×3 companion matrices over Z/nZ and their powers.
//!
//! For parameter k the companion matrix is
//!
//! ```text
//! | k-1  0  k² |
//! |  1   0  0  |
//! |  0   1  0  |
//! ```
//!
//! i.e. the transition of x_{n+3} = (k-1)·x_{n+2} + k²·x_n. Its determinant
//! is k², so it is invertible mod n exactly when gcd(k, n) = 1.

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// A 3×3 matrix with entries reduced mod `modulus`.
#[derive(Debug, Clone, Eq)]
pub struct Matrix3 {
    rows: [[BigUint; 3]; 3],
    modulus: BigUint,
}

impl Matrix3 {
    /// Build from raw entries, reducing each mod `modulus`.
    pub fn from_rows(rows: [[BigUint; 3]; 3], modulus: &BigUint) -> Self {
        assert!(!modulus.is_zero(), "matrix modulus must be positive");
        let rows = rows.map(|row| row.map(|x| x % modulus));
        Matrix3 {
            rows,
            modulus: modulus.clone(),
        }
    }

    /// Identity mod `modulus`; all-zero when modulus = 1.
    pub fn identity(modulus: &BigUint) -> Self {
        let rows = std::array::from_fn(|i| {
            std::array::from_fn(|j| if i == j { BigUint::one() } else { BigUint::zero() })
        });
        Self::from_rows(rows, modulus)
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn entry(&self, i: usize, j: usize) -> &BigUint {
        &self.rows[i][j]
    }

    /// Product self · other, entries reduced mod the shared modulus.
    pub fn mul(&self, other: &Matrix3) -> Matrix3 {
        assert_eq!(
            self.modulus, other.modulus,
            "cannot multiply matrices over different moduli"
        );
        let rows = std::array::from_fn(|i| {
            std::array::from_fn(|j| {
                let sum = &self.rows[i][0] * &other.rows[0][j]
                    + &self.rows[i][1] * &other.rows[1][j]
                    + &self.rows[i][2] * &other.rows[2][j];
                sum % &self.modulus
            })
        });
        Matrix3 {
            rows,
            modulus: self.modulus.clone(),
        }
    }

    /// self^exp by square-and-multiply. exp = 0 gives the identity.
    pub fn pow(&self, exp: &BigUint) -> Matrix3 {
        let mut result = Matrix3::identity(&self.modulus);
        let mut base = self.clone();
        let bits = exp.bits();
        for i in 0..bits {
            if exp.bit(i) {
                result = result.mul(&base);
            }
            if i + 1 < bits {
                base = base.mul(&base);
            }
        }
        result
    }

    pub fn is_identity(&self) -> bool {
        *self == Matrix3::identity(&self.modulus)
    }
}

/// Equal iff all nine entries match.
impl PartialEq for Matrix3 {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl fmt::Display for Matrix3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{}, {}, {}]", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

/// Reduce a signed integer into [0, modulus).
fn reduce(x: &BigInt, modulus: &BigUint) -> BigUint {
    let m = BigInt::from(modulus.clone());
    // mod_floor of a positive modulus is never negative
    x.mod_floor(&m).magnitude().clone()
}

/// Companion matrix for `k` mod `modulus`.
pub fn companion(k: &BigInt, modulus: &BigUint) -> Matrix3 {
    assert!(!modulus.is_zero(), "matrix modulus must be positive");
    let km1 = reduce(&(k - BigInt::one()), modulus);
    let k2 = reduce(&(k * k), modulus);
    let rows = [
        [km1, BigUint::zero(), k2],
        [BigUint::one(), BigUint::zero(), BigUint::zero()],
        [BigUint::zero(), BigUint::one(), BigUint::zero()],
    ];
    Matrix3::from_rows(rows, modulus)
}

/// companion(k, modulus)^exp.
pub fn companion_pow(k: &BigInt, exp: &BigUint, modulus: &BigUint) -> Matrix3 {
    companion(k, modulus).pow(exp)
}

/// Smallest t in 1..=limit with C^t ≡ I (mod modulus), by repeated
/// multiplication.
///
/// Returns `None` when the matrix is not invertible mod `modulus` or the
/// limit is reached first.
pub fn naive_order(k: &BigInt, modulus: &BigUint, limit: u64) -> Option<BigUint> {
    if modulus.is_one() {
        return Some(BigUint::one());
    }
    let k_mod = reduce(k, modulus);
    if !k_mod.gcd(modulus).is_one() {
        return None;
    }

    let c = companion(k, modulus);
    let mut current = c.clone();
    for t in 1..=limit {
        if current.is_identity() {
            return Some(BigUint::from(t));
        }
        current = current.mul(&c);
    }
    log::warn!(
        "No period found for k={} mod {} within {} steps",
        k,
        modulus,
        limit
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_companion_entries() {
        let c = companion(&BigInt::from(5), &big(7));
        // k-1 = 4, k² = 25 ≡ 4
        assert_eq!(c.entry(0, 0), &big(4));
        assert_eq!(c.entry(0, 1), &big(0));
        assert_eq!(c.entry(0, 2), &big(4));
        assert_eq!(c.entry(1, 0), &big(1));
        assert_eq!(c.entry(2, 1), &big(1));
        assert_eq!(c.entry(1, 1), &big(0));
    }

    #[test]
    fn test_companion_negative_k() {
        // k = -1: k-1 = -2 ≡ 3 mod 5, k² = 1
        let c = companion(&BigInt::from(-1), &big(5));
        assert_eq!(c.entry(0, 0), &big(3));
        assert_eq!(c.entry(0, 2), &big(1));
    }

    #[test]
    fn test_pow_zero_and_one() {
        for k in [-3i64, 0, 1, 2, 3, 10, 97] {
            for m in [1u64, 2, 3, 4, 7, 12, 25, 1000] {
                let modulus = big(m);
                let kk = BigInt::from(k);
                let c = companion(&kk, &modulus);
                assert_eq!(
                    c.pow(&BigUint::zero()),
                    Matrix3::identity(&modulus),
                    "C^0 != I for k={} m={}",
                    k,
                    m
                );
                assert_eq!(c.pow(&BigUint::one()), c, "C^1 != C for k={} m={}", k, m);
            }
        }
    }

    #[test]
    fn test_modulus_one_collapses() {
        let c = companion(&BigInt::from(4), &BigUint::one());
        let id = Matrix3::identity(&BigUint::one());
        for i in 0..3 {
            for j in 0..3 {
                assert!(c.entry(i, j).is_zero());
                assert!(id.entry(i, j).is_zero());
            }
        }
        assert!(c.pow(&big(17)).is_identity());
    }

    #[test]
    fn test_pow_matches_repeated_mul() {
        let modulus = big(101);
        let c = companion(&BigInt::from(3), &modulus);
        let mut acc = Matrix3::identity(&modulus);
        for e in 0u64..40 {
            assert_eq!(c.pow(&big(e)), acc, "mismatch at exponent {}", e);
            acc = acc.mul(&c);
        }
    }

    #[test]
    fn test_pow_exponent_additivity() {
        let modulus = big(1_000_003);
        let c = companion(&BigInt::from(7), &modulus);
        let a = big(123_456);
        let b = big(987_654_321);
        assert_eq!(c.pow(&a).mul(&c.pow(&b)), c.pow(&(&a + &b)));
    }

    #[test]
    fn test_naive_order_is_period() {
        for p in [3u64, 5, 7, 11, 13] {
            let modulus = big(p);
            let k = BigInt::from(2);
            let order = naive_order(&k, &modulus, p * p * p).expect("invertible mod odd p");
            assert!(companion_pow(&k, &order, &modulus).is_identity());
            // minimal: no smaller power is the identity
            let order_u64 = u64::try_from(&order).unwrap();
            for t in 1..order_u64 {
                assert!(!companion_pow(&k, &big(t), &modulus).is_identity());
            }
        }
    }

    #[test]
    fn test_naive_order_non_invertible() {
        assert_eq!(naive_order(&BigInt::from(2), &big(4), 1000), None);
        assert_eq!(naive_order(&BigInt::from(0), &big(5), 1000), None);
        assert_eq!(naive_order(&BigInt::from(6), &BigUint::one(), 10), Some(BigUint::one()));
    }

    #[test]
    fn test_naive_order_limit() {
        assert_eq!(naive_order(&BigInt::from(2), &big(101), 1), None);
    }

    #[test]
    #[should_panic(expected = "modulus must be positive")]
    fn test_zero_modulus_panics() {
        companion(&BigInt::from(2), &BigUint::zero());
    }
}
