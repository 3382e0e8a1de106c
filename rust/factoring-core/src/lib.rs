//! Shared big-integer number theory for the split-lift experiments.
//!
//! Prime-power factorization by trial division, Miller-Rabin primality,
//! and gcd/lcm helpers over `BigUint`.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

/// A prime-power component p^a of a factored integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimePower {
    pub p: BigUint,
    pub a: u32,
}

impl PrimePower {
    /// The value p^a.
    pub fn value(&self) -> BigUint {
        pow_u32(&self.p, self.a)
    }
}

/// Factor `n` into prime powers, primes in increasing order.
///
/// Strips 2 exhaustively, then trial-divides by odd candidates while
/// candidate² ≤ remaining; a surviving remainder > 1 is a prime cofactor.
/// `n <= 1` yields an empty list.
///
/// Trial division is the intended ceiling here: moduli whose second-largest
/// prime factor is beyond ~10^12 will take a long time. That is a scaling
/// limit, not a correctness issue.
pub fn factorize(n: &BigUint) -> Vec<PrimePower> {
    let mut factors = Vec::new();
    let one = BigUint::one();
    if *n <= one {
        return factors;
    }
    let mut remaining = n.clone();

    let twos = remaining.trailing_zeros().unwrap_or(0);
    if twos > 0 {
        remaining >>= twos;
        factors.push(PrimePower {
            p: BigUint::from(2u32),
            a: twos as u32,
        });
    }

    let two = BigUint::from(2u32);
    let mut divisor = BigUint::from(3u32);
    while &divisor * &divisor <= remaining {
        let mut a = 0u32;
        loop {
            let (q, r) = remaining.div_rem(&divisor);
            if !r.is_zero() {
                break;
            }
            remaining = q;
            a += 1;
        }
        if a > 0 {
            factors.push(PrimePower {
                p: divisor.clone(),
                a,
            });
        }
        divisor += &two;
    }

    if remaining > one {
        factors.push(PrimePower { p: remaining, a: 1 });
    }

    factors
}

/// Reassemble a factor list into the integer it came from.
pub fn product(factors: &[PrimePower]) -> BigUint {
    factors
        .iter()
        .fold(BigUint::one(), |acc, f| acc * f.value())
}

/// base^exp for a small exponent.
pub fn pow_u32(base: &BigUint, exp: u32) -> BigUint {
    num_traits::pow(base.clone(), exp as usize)
}

/// Greatest common divisor.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// Least common multiple; zero if either argument is zero.
pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    if a.is_zero() || b.is_zero() {
        return BigUint::zero();
    }
    a / gcd(a, b) * b
}

/// LCM of a list by repeated pairwise reduction. The empty list gives 1.
pub fn lcm_many<'a, I>(values: I) -> BigUint
where
    I: IntoIterator<Item = &'a BigUint>,
{
    values
        .into_iter()
        .fold(BigUint::one(), |acc, v| lcm(&acc, v))
}

/// Modular exponentiation: base^exp mod modulus.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Miller-Rabin probabilistic primality test.
pub fn is_probably_prime(n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // n-1 = 2^r * d
    let n_minus_1 = n - &one;
    let r = n_minus_1.trailing_zeros().unwrap_or(0);
    let d = &n_minus_1 >> r;

    let mut rng = rand::thread_rng();
    let n_minus_3 = n - &three;

    'witness: for _ in 0..rounds {
        // a in [2, n-2]
        let a = if n_minus_3.is_zero() {
            two.clone()
        } else {
            let bytes = n.to_bytes_be();
            let mut random_bytes = vec![0u8; bytes.len()];
            rng.fill(&mut random_bytes[..]);
            BigUint::from_bytes_be(&random_bytes) % &n_minus_3 + &two
        };

        let mut x = mod_pow(&a, &d, n);
        if x == one || x == n_minus_1 {
            continue 'witness;
        }
        for _ in 1..r {
            x = mod_pow(&x, &two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// All primes up to `limit` (Sieve of Eratosthenes).
pub fn sieve_primes(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }
    let size = (limit + 1) as usize;
    let mut is_prime = vec![true; size];
    is_prime[0] = false;
    is_prime[1] = false;
    let mut i = 2usize;
    while i * i < size {
        if is_prime[i] {
            let mut j = i * i;
            while j < size {
                is_prime[j] = false;
                j += i;
            }
        }
        i += 1;
    }
    is_prime
        .iter()
        .enumerate()
        .filter(|(_, &p)| p)
        .map(|(i, _)| i as u64)
        .collect()
}
