//! Rendering of predictions and verifications as JSON, CSV and text.
//!
//! Integers are written as JSON numbers when they fit in 64 bits and as
//! decimal strings otherwise.

use std::fmt::Write;

use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use serde::Serialize;
use serde_json::Value;

use crate::predict::{Mode, PredictionResult, PrimePrediction};
use crate::verify::VerificationResult;

pub fn big_json(n: &BigUint) -> Value {
    match n.to_u64() {
        Some(v) => Value::from(v),
        None => Value::String(n.to_string()),
    }
}

pub fn bigint_json(n: &BigInt) -> Value {
    match n.to_i64() {
        Some(v) => Value::from(v),
        None => Value::String(n.to_string()),
    }
}

#[derive(Serialize)]
struct FactorView {
    p: Value,
    a: u32,
}

#[derive(Serialize)]
struct PrimeView {
    p: Value,
    a: u32,
    c_p: Option<Value>,
    t1_p: Option<Value>,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ModeView {
    Fsll {
        t1_est: Value,
        c_m: Option<f64>,
        c_m_exact: Option<String>,
        tn_rule: &'static str,
    },
    Fallback {
        reason: String,
    },
}

#[derive(Serialize)]
struct PredictionView {
    k: Value,
    m: Value,
    factors: Vec<FactorView>,
    per_prime: Vec<PrimeView>,
    mode: &'static str,
    #[serde(flatten)]
    detail: ModeView,
}

#[derive(Serialize)]
struct PrimeCheckView {
    p: Value,
    a: u32,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

#[derive(Serialize)]
struct VerificationView {
    t1: Value,
    ok_global: bool,
    #[serde(rename = "Ct_equals_I")]
    ct_equals_i: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    per_prime: Vec<PrimeCheckView>,
    verified: bool,
}

fn prime_view(row: &PrimePrediction) -> PrimeView {
    match row {
        PrimePrediction::Resolved { p, a, c_p, t1_p } => PrimeView {
            p: big_json(p),
            a: *a,
            c_p: Some(big_json(c_p)),
            t1_p: Some(big_json(t1_p)),
            ok: true,
            note: None,
        },
        PrimePrediction::Unresolved { p, a, reason } => PrimeView {
            p: big_json(p),
            a: *a,
            c_p: None,
            t1_p: None,
            ok: false,
            note: Some(reason.note()),
        },
    }
}

fn prediction_view(result: &PredictionResult) -> PredictionView {
    let detail = match &result.mode {
        Mode::Fsll(fsll) => ModeView::Fsll {
            t1_est: big_json(&fsll.t1_est),
            c_m: fsll.c_m.as_ref().and_then(|c| {
                Some(c.numer().to_f64()? / c.denom().to_f64()?)
            }),
            c_m_exact: fsll.c_m.as_ref().map(|c| format!("{}/{}", c.numer(), c.denom())),
            tn_rule: fsll.rule(),
        },
        Mode::Fallback { reason } => ModeView::Fallback {
            reason: reason.clone(),
        },
    };
    PredictionView {
        k: bigint_json(&result.k),
        m: big_json(&result.m),
        factors: result
            .factors
            .iter()
            .map(|f| FactorView {
                p: big_json(&f.p),
                a: f.a,
            })
            .collect(),
        per_prime: result.per_prime.iter().map(prime_view).collect(),
        mode: result.mode.name(),
        detail,
    }
}

/// JSON form of a prediction.
pub fn prediction_json(result: &PredictionResult) -> Value {
    // serializing plain views with string keys cannot fail
    serde_json::to_value(prediction_view(result)).unwrap_or(Value::Null)
}

/// JSON form of a verification.
pub fn verification_json(result: &VerificationResult) -> Value {
    let view = VerificationView {
        t1: big_json(&result.t1),
        ok_global: result.ok_global,
        ct_equals_i: result.ok_global,
        per_prime: result
            .per_prime
            .iter()
            .map(|c| PrimeCheckView {
                p: big_json(&c.p),
                a: c.a,
                ok: c.ok(),
                reason: c.reason(),
            })
            .collect(),
        verified: result.is_verified(),
    };
    serde_json::to_value(view).unwrap_or(Value::Null)
}

/// One CSV row per prime factor: `p,a,c_p,t1_p,ok,note`.
pub fn prediction_csv(result: &PredictionResult) -> String {
    let mut out = String::from("k,m,p,a,c_p,t1_p,ok,note\n");
    for row in &result.per_prime {
        let (c_p, t1_p, ok, note) = match row {
            PrimePrediction::Resolved { c_p, t1_p, .. } => {
                (c_p.to_string(), t1_p.to_string(), true, String::new())
            }
            PrimePrediction::Unresolved { reason, .. } => {
                (String::new(), String::new(), false, format!("\"{}\"", reason.note()))
            }
        };
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            result.k,
            result.m,
            row.p(),
            row.a(),
            c_p,
            t1_p,
            ok,
            note
        );
    }
    out
}

/// Human-readable prediction summary. `level` adds the t_n line.
pub fn prediction_text(result: &PredictionResult, explain: bool, level: Option<u32>) -> String {
    let mut out = String::new();
    let factors: Vec<String> = result
        .factors
        .iter()
        .map(|f| if f.a == 1 { f.p.to_string() } else { format!("{}^{}", f.p, f.a) })
        .collect();
    let _ = writeln!(out, "k = {}, m = {}", result.k, result.m);
    let _ = writeln!(
        out,
        "  factors: {}",
        if factors.is_empty() { "(none)".to_string() } else { factors.join(" * ") }
    );

    if explain {
        for row in &result.per_prime {
            match row {
                PrimePrediction::Resolved { p, a, c_p, t1_p } => {
                    let _ = writeln!(out, "  p={}^{}: c_p={} -> t1_p = c_p * p^a = {}", p, a, c_p, t1_p);
                }
                PrimePrediction::Unresolved { p, a, reason } => {
                    let _ = writeln!(out, "  p={}^{}: {}", p, a, reason);
                }
            }
        }
    }

    match &result.mode {
        Mode::Fsll(fsll) => {
            let _ = writeln!(out, "  mode: fsll");
            let _ = writeln!(out, "  t1_est = {}", fsll.t1_est);
            if let Some(c_m) = &fsll.c_m {
                let _ = writeln!(out, "  c_m = t1/m = {}", c_m);
            }
            let _ = writeln!(out, "  rule: {}", fsll.rule());
            if let Some(n) = level {
                let _ = writeln!(out, "  t_{} = {}", n.max(1), fsll.period_at_level(&result.m, n));
            }
        }
        Mode::Fallback { reason } => {
            let _ = writeln!(out, "  mode: fallback");
            let _ = writeln!(out, "  reason: {}", reason);
        }
    }
    out
}

/// Human-readable verification summary.
pub fn verification_text(k: &BigInt, m: &BigUint, result: &VerificationResult) -> String {
    let mark = |ok: bool| if ok { "ok" } else { "FAIL" };
    let mut out = String::new();
    let _ = writeln!(out, "k = {}, m = {}, t1 = {}", k, m, result.t1);
    let _ = writeln!(out, "  global: C^t1 == I (mod m): {}", mark(result.ok_global));
    for check in &result.per_prime {
        match check.reason() {
            Some(reason) => {
                let _ = writeln!(out, "  p={}^{}: skipped ({})", check.p, check.a, reason);
            }
            None => {
                let _ = writeln!(out, "  p={}^{}: {}", check.p, check.a, mark(check.ok()));
            }
        }
    }
    let _ = writeln!(out, "  verified: {}", if result.is_verified() { "yes" } else { "no" });
    out
}
