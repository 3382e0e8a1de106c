//! Building local-order tables by direct order search.
//!
//! For p ∤ k, let n_p be the order of the companion matrix mod p. If
//! C^N ≡ I (mod p^j) with j ≥ 1 then C^(Np) ≡ I (mod p^(j+1)), so n_p · p^a
//! is a period mod p^a and c_p = n_p is a valid table entry.

use factoring_core::sieve_primes;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::Zero;
use rayon::prelude::*;

use crate::matrix::naive_order;
use crate::order_table::CpMap;

/// Search bound for the order mod p: the order of an element of GL3(F_p)
/// is at most p³ - 1.
pub fn order_search_limit(p: u64) -> u64 {
    p.saturating_mul(p).saturating_mul(p)
}

/// c_p for a single prime, or `None` when p | k.
pub fn local_order(k: &BigInt, p: u64) -> Option<BigUint> {
    if k.mod_floor(&BigInt::from(p)).is_zero() {
        return None;
    }
    naive_order(k, &BigUint::from(p), order_search_limit(p))
}

/// Table of c_p for every prime p ≤ `primes_up_to` not dividing k.
pub fn tabulate(k: &BigInt, primes_up_to: u64) -> CpMap {
    let primes = sieve_primes(primes_up_to);
    log::info!(
        "Tabulating local orders for k={} over {} primes <= {}",
        k,
        primes.len(),
        primes_up_to
    );

    let entries: Vec<(BigUint, BigUint)> = primes
        .par_iter()
        .filter_map(|&p| local_order(k, p).map(|c| (BigUint::from(p), c)))
        .collect();

    entries.into_iter().collect()
}
