//! split-lift: fast split-lift (FSLL) period prediction for the recurrence
//! x_{n+3} = (k-1)·x_{n+2} + k²·x_n taken mod m.
//!
//! The period t1 (the order of the companion matrix mod m) is predicted by
//! factoring m, reading a local order c_p for each prime from a table, and
//! combining t1_p = c_p · p^a by lcm. The prediction is then checked by
//! direct matrix exponentiation, globally and at each prime power.

pub mod error;
pub mod matrix;
pub mod order_table;
pub mod predict;
pub mod report;
pub mod tabulate;
pub mod verify;

use num_bigint::{BigInt, BigUint};

use matrix::naive_order;
use order_table::LocalOrders;
use predict::{predict_fsll, PredictionResult};
use verify::{verify, VerificationResult};

/// How `run_pipeline` obtains the period it verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// FSLL when every prime resolves, naive search otherwise.
    Auto,
    /// FSLL only.
    Fsll,
    /// Naive order search only.
    Naive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSource {
    Fsll,
    Naive,
}

/// Outcome of predict → verify.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub prediction: Option<PredictionResult>,
    pub source: Option<PeriodSource>,
    pub verification: Option<VerificationResult>,
}

impl RunReport {
    /// 0 = verified, 1 = a check failed, 2 = no period to check.
    pub fn exit_code(&self) -> i32 {
        match &self.verification {
            Some(v) if v.is_verified() => 0,
            Some(_) => 1,
            None => 2,
        }
    }
}

/// Predict (unless `mode` is naive), then verify whatever period was found.
pub fn run_pipeline(
    k: &BigInt,
    m: &BigUint,
    mode: RunMode,
    naive_limit: u64,
    table: &impl LocalOrders,
) -> RunReport {
    let prediction = match mode {
        RunMode::Naive => None,
        RunMode::Auto | RunMode::Fsll => Some(predict_fsll(k, m, table)),
    };

    if let Some(t1) = prediction.as_ref().and_then(PredictionResult::t1_est) {
        let rows = prediction.as_ref().map(|p| p.per_prime.as_slice());
        let verification = verify(k, m, t1, rows);
        return RunReport {
            prediction,
            source: Some(PeriodSource::Fsll),
            verification: Some(verification),
        };
    }

    if mode == RunMode::Fsll {
        return RunReport {
            prediction,
            source: None,
            verification: None,
        };
    }

    log::info!("k={} m={}: searching period naively (limit {})", k, m, naive_limit);
    match naive_order(k, m, naive_limit) {
        Some(order) => RunReport {
            verification: Some(verify(k, m, &order, None)),
            prediction,
            source: Some(PeriodSource::Naive),
        },
        None => RunReport {
            prediction,
            source: None,
            verification: None,
        },
    }
}
