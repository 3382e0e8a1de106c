//! Ground-truth checks of a claimed period by matrix exponentiation.

use num_bigint::{BigInt, BigUint};

use crate::matrix::companion_pow;
use crate::predict::{PredictionResult, PrimePrediction};

/// Reason attached to prime powers that were not resolved by the predictor.
pub const NOT_APPLICABLE: &str = "per-prime not FSLL or missing c_p";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Verified,
    Failed,
    NotApplicable,
}

/// Result of C^{t1_p} ≡ I (mod p^a) for one factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeCheck {
    pub p: BigUint,
    pub a: u32,
    pub status: CheckStatus,
}

impl PrimeCheck {
    pub fn ok(&self) -> bool {
        self.status == CheckStatus::Verified
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self.status {
            CheckStatus::NotApplicable => Some(NOT_APPLICABLE),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalCheck {
    pub ok_global: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub t1: BigUint,
    pub ok_global: bool,
    pub per_prime: Vec<PrimeCheck>,
}

impl VerificationResult {
    /// Global check and every per-prime check passed.
    pub fn is_verified(&self) -> bool {
        self.ok_global && self.per_prime.iter().all(PrimeCheck::ok)
    }
}

/// Check C^t1 ≡ I (mod m).
pub fn verify_with_t1(k: &BigInt, m: &BigUint, t1: &BigUint) -> GlobalCheck {
    let ok_global = companion_pow(k, t1, m).is_identity();
    log::info!("k={} m={} t1={}: global check {}", k, m, t1, if ok_global { "ok" } else { "FAILED" });
    GlobalCheck { ok_global }
}

/// Check C^{t1_p} ≡ I (mod p^a) for every resolved prime power.
pub fn verify_per_prime(k: &BigInt, per_prime: &[PrimePrediction]) -> Vec<PrimeCheck> {
    per_prime
        .iter()
        .map(|row| match row {
            PrimePrediction::Resolved { p, a, c_p, t1_p } => {
                let modulus = num_traits::pow(p.clone(), *a as usize);
                let ok = companion_pow(k, t1_p, &modulus).is_identity();
                if !ok {
                    log::warn!(
                        "k={}: C^{} != I mod {}^{}; c_p={} looks defective",
                        k,
                        t1_p,
                        p,
                        a,
                        c_p
                    );
                }
                PrimeCheck {
                    p: p.clone(),
                    a: *a,
                    status: if ok { CheckStatus::Verified } else { CheckStatus::Failed },
                }
            }
            PrimePrediction::Unresolved { p, a, .. } => PrimeCheck {
                p: p.clone(),
                a: *a,
                status: CheckStatus::NotApplicable,
            },
        })
        .collect()
}

/// Verify `t1` globally and, when `per_prime` is given, at each prime power.
pub fn verify(
    k: &BigInt,
    m: &BigUint,
    t1: &BigUint,
    per_prime: Option<&[PrimePrediction]>,
) -> VerificationResult {
    let GlobalCheck { ok_global } = verify_with_t1(k, m, t1);
    let per_prime = per_prime.map(|rows| verify_per_prime(k, rows)).unwrap_or_default();
    VerificationResult {
        t1: t1.clone(),
        ok_global,
        per_prime,
    }
}

/// Verify a prediction's own estimate. `None` in fallback mode.
pub fn verify_prediction(prediction: &PredictionResult, per_prime: bool) -> Option<VerificationResult> {
    let t1 = prediction.t1_est()?;
    let rows = per_prime.then_some(prediction.per_prime.as_slice());
    Some(verify(&prediction.k, &prediction.m, t1, rows))
}
