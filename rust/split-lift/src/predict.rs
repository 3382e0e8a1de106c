//! FSLL period prediction.
//!
//! m is split into prime powers p^a. At each one the local period is
//! t1_p = c_p · p^a with c_p read from the order table; the global period
//! estimate is lcm(t1_p) by CRT. A prime that divides k (the companion
//! matrix has determinant k²) or that has no table entry sends the whole
//! prediction to fallback.

use std::fmt;
use std::path::Path;

use factoring_core::{factorize, lcm_many, PrimePower};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::error::Result;
use crate::order_table::{load_cp_map, LocalOrders};

/// Scaling of the level-n period: t_n = t1 · m^(n-1).
pub const TN_RULE: &str = "t_n = t1 * m^{n-1}";

/// Why a prime power could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// p | k, so the companion matrix is singular mod p.
    NonInvertible,
    /// The order table has no c_p for this k.
    MissingLocalOrder,
}

impl UnresolvedReason {
    pub fn note(&self) -> &'static str {
        match self {
            UnresolvedReason::NonInvertible => "non-invertible: p | k",
            UnresolvedReason::MissingLocalOrder => "missing local order: p not in cp_map for this k",
        }
    }

    /// Short diagnostic used in the fallback reason.
    pub fn diagnostic(&self, p: &BigUint) -> String {
        match self {
            UnresolvedReason::NonInvertible => format!("p|k @ p={}", p),
            UnresolvedReason::MissingLocalOrder => format!("missing c_p @ p={}", p),
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.note())
    }
}

/// Outcome at one prime-power factor of m.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimePrediction {
    Resolved {
        p: BigUint,
        a: u32,
        c_p: BigUint,
        t1_p: BigUint,
    },
    Unresolved {
        p: BigUint,
        a: u32,
        reason: UnresolvedReason,
    },
}

impl PrimePrediction {
    pub fn p(&self) -> &BigUint {
        match self {
            PrimePrediction::Resolved { p, .. } | PrimePrediction::Unresolved { p, .. } => p,
        }
    }

    pub fn a(&self) -> u32 {
        match self {
            PrimePrediction::Resolved { a, .. } | PrimePrediction::Unresolved { a, .. } => *a,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, PrimePrediction::Resolved { .. })
    }

    pub fn t1_p(&self) -> Option<&BigUint> {
        match self {
            PrimePrediction::Resolved { t1_p, .. } => Some(t1_p),
            PrimePrediction::Unresolved { .. } => None,
        }
    }
}

/// Global estimate produced when every prime power resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fsll {
    pub t1_est: BigUint,
    /// t1_est / m, reduced. `None` only for the degenerate m = 0.
    pub c_m: Option<BigRational>,
}

impl Fsll {
    pub fn rule(&self) -> &'static str {
        TN_RULE
    }

    /// Period at level n (n = 0 is treated as level 1).
    pub fn period_at_level(&self, m: &BigUint, n: u32) -> BigUint {
        let exp = n.saturating_sub(1) as usize;
        &self.t1_est * num_traits::pow(m.clone(), exp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Fsll(Fsll),
    Fallback { reason: String },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Fsll(_) => "fsll",
            Mode::Fallback { .. } => "fallback",
        }
    }
}

/// Full prediction for (k, m).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub k: BigInt,
    pub m: BigUint,
    pub factors: Vec<PrimePower>,
    pub per_prime: Vec<PrimePrediction>,
    pub mode: Mode,
}

impl PredictionResult {
    pub fn t1_est(&self) -> Option<&BigUint> {
        match &self.mode {
            Mode::Fsll(fsll) => Some(&fsll.t1_est),
            Mode::Fallback { .. } => None,
        }
    }

    pub fn is_fsll(&self) -> bool {
        matches!(self.mode, Mode::Fsll(_))
    }
}

fn divides(p: &BigUint, k: &BigInt) -> bool {
    k.mod_floor(&BigInt::from(p.clone())).is_zero()
}

/// Resolve a single prime power against the table.
pub fn predict_prime(k: &BigInt, factor: &PrimePower, table: &impl LocalOrders) -> PrimePrediction {
    let PrimePower { p, a } = factor;
    if divides(p, k) {
        return PrimePrediction::Unresolved {
            p: p.clone(),
            a: *a,
            reason: UnresolvedReason::NonInvertible,
        };
    }
    match table.local_order(p) {
        Some(c_p) => PrimePrediction::Resolved {
            p: p.clone(),
            a: *a,
            c_p: c_p.clone(),
            t1_p: c_p * factor.value(),
        },
        None => PrimePrediction::Unresolved {
            p: p.clone(),
            a: *a,
            reason: UnresolvedReason::MissingLocalOrder,
        },
    }
}

/// Predict t1 for (k, m) from a local-order table for this k.
pub fn predict_fsll(k: &BigInt, m: &BigUint, table: &impl LocalOrders) -> PredictionResult {
    let factors = factorize(m);
    let per_prime: Vec<PrimePrediction> = factors
        .iter()
        .map(|f| predict_prime(k, f, table))
        .collect();

    for row in &per_prime {
        match row {
            PrimePrediction::Resolved { p, a, c_p, t1_p } => {
                log::debug!("p={}^{}: c_p={} t1_p={}", p, a, c_p, t1_p)
            }
            PrimePrediction::Unresolved { p, a, reason } => {
                log::debug!("p={}^{}: {}", p, a, reason)
            }
        }
    }

    let diagnostics: Vec<String> = per_prime
        .iter()
        .filter_map(|row| match row {
            PrimePrediction::Unresolved { p, reason, .. } => Some(reason.diagnostic(p)),
            PrimePrediction::Resolved { .. } => None,
        })
        .collect();

    let mode = if per_prime.iter().all(PrimePrediction::is_ok) {
        let t1_est = lcm_many(per_prime.iter().filter_map(PrimePrediction::t1_p));
        debug_assert!(!t1_est.is_zero());
        let c_m = if m.is_zero() {
            None
        } else {
            Some(BigRational::new(
                BigInt::from(t1_est.clone()),
                BigInt::from(m.clone()),
            ))
        };
        log::info!("k={} m={}: fsll t1_est={}", k, m, t1_est);
        Mode::Fsll(Fsll { t1_est, c_m })
    } else {
        // "unknown" is unreachable: an unresolved row always yields a diagnostic
        let reason = if diagnostics.is_empty() {
            "unknown".to_string()
        } else {
            diagnostics.join("; ")
        };
        log::info!("k={} m={}: fallback ({})", k, m, reason);
        Mode::Fallback { reason }
    };

    PredictionResult {
        k: k.clone(),
        m: m.clone(),
        factors,
        per_prime,
        mode,
    }
}

/// Load the table for k from `table_dir` and predict.
pub fn predict_from_dir(k: &BigInt, m: &BigUint, table_dir: &Path) -> Result<PredictionResult> {
    let table = load_cp_map(table_dir, k)?;
    Ok(predict_fsll(k, m, &table))
}

/// Whether c_m = t1_est / m is an integer.
pub fn c_m_is_integral(fsll: &Fsll) -> bool {
    fsll.c_m.as_ref().map_or(false, |c| c.denom().is_one())
}
