//! Integration tests: tabulate → save → load → predict → verify.

use num_bigint::{BigInt, BigUint};
use split_lift::matrix::{companion, naive_order, Matrix3};
use split_lift::order_table::{load_cp_map, save_cp_map, CpMap, LocalOrders};
use split_lift::predict::{predict_fsll, predict_from_dir, Mode, PrimePrediction};
use split_lift::tabulate::tabulate;
use split_lift::verify::{verify_per_prime, verify_prediction, verify_with_t1, CheckStatus};

fn big(n: u64) -> BigUint {
    BigUint::from(n)
}

#[test]
fn test_k2_m7_scenario() {
    let k = BigInt::from(2);
    let table = tabulate(&k, 7);
    assert!(table.local_order(&big(7)).is_some());

    let prediction = predict_fsll(&k, &big(7), &table);
    assert_eq!(prediction.mode.name(), "fsll");
    let t1 = prediction.t1_est().unwrap();
    assert!(verify_with_t1(&k, &big(7), t1).ok_global);
}

#[test]
fn test_k2_m4_scenario() {
    let prediction = predict_fsll(&BigInt::from(2), &big(4), &CpMap::new());
    match &prediction.mode {
        Mode::Fallback { reason } => assert!(reason.contains("p|k @ p=2"), "{}", reason),
        other => panic!("expected fallback, got {:?}", other),
    }
}

#[test]
fn test_k3_m25_missing_entry_scenario() {
    let k = BigInt::from(3);
    let table: CpMap = tabulate(&k, 13)
        .iter()
        .filter(|(p, _)| **p != big(5))
        .map(|(p, c)| (p.clone(), c.clone()))
        .collect();
    let prediction = predict_fsll(&k, &big(25), &table);
    match &prediction.mode {
        Mode::Fallback { reason } => assert!(reason.contains("missing c_p @ p=5"), "{}", reason),
        other => panic!("expected fallback, got {:?}", other),
    }
}

#[test]
fn test_prediction_round_trip_over_moduli() {
    // Every fsll estimate must pass the global check.
    for k in [2i64, 3, 5, 7] {
        let kk = BigInt::from(k);
        let table = tabulate(&kk, 31);
        for m in 2u64..=300 {
            let prediction = predict_fsll(&kk, &big(m), &table);
            let Some(t1) = prediction.t1_est() else {
                continue;
            };
            assert!(
                verify_with_t1(&kk, &big(m), t1).ok_global,
                "k={} m={} t1={} failed global check",
                k,
                m,
                t1
            );
            let checks = verify_per_prime(&kk, &prediction.per_prime);
            assert!(checks.iter().all(|c| c.status == CheckStatus::Verified));
        }
    }
}

#[test]
fn test_fsll_estimate_is_multiple_of_true_order() {
    let k = BigInt::from(2);
    let table = tabulate(&k, 13);
    for m in [3u64, 9, 15, 21, 27, 35, 45, 63, 77, 91] {
        let prediction = predict_fsll(&k, &big(m), &table);
        let t1 = prediction.t1_est().expect("m is odd and below table bound");
        let order = naive_order(&k, &big(m), 1_000_000).unwrap();
        assert!((t1 % &order) == BigUint::from(0u32), "m={}: {} not a multiple of {}", m, t1, order);
    }
}

#[test]
fn test_fallback_reason_names_each_prime() {
    let k = BigInt::from(10);
    let table = tabulate(&k, 5);
    // 2 and 5 divide k; 13 is beyond the table
    let prediction = predict_fsll(&k, &big(2 * 3 * 5 * 13), &table);
    match &prediction.mode {
        Mode::Fallback { reason } => {
            assert_eq!(reason, "p|k @ p=2; p|k @ p=5; missing c_p @ p=13");
        }
        other => panic!("expected fallback, got {:?}", other),
    }
    assert!(matches!(prediction.per_prime[1], PrimePrediction::Resolved { .. }));
    assert!(verify_prediction(&prediction, true).is_none());
}

#[test]
fn test_tables_persist_through_directory() {
    let dir = tempfile::tempdir().unwrap();
    let k = BigInt::from(3);
    let table = tabulate(&k, 23);
    save_cp_map(dir.path(), &k, &table).unwrap();

    let loaded = load_cp_map(dir.path(), &k).unwrap();
    assert_eq!(loaded, table);

    let from_dir = predict_from_dir(&k, &big(7 * 11 * 23), dir.path()).unwrap();
    assert_eq!(from_dir, predict_fsll(&k, &big(7 * 11 * 23), &table));
    assert!(from_dir.is_fsll());

    // another k has no document yet
    let none = predict_from_dir(&BigInt::from(4), &big(7), dir.path()).unwrap();
    assert!(!none.is_fsll());
}

#[test]
fn test_large_modulus_with_big_integers() {
    // m well past u64, built from small primes so trial division stays cheap
    let k = BigInt::from(2);
    let table = tabulate(&k, 13);
    let m = num_traits::pow(big(3), 30) * num_traits::pow(big(7), 12) * big(13);
    assert!(m.bits() > 64);
    let prediction = predict_fsll(&k, &m, &table);
    let t1 = prediction.t1_est().unwrap();
    assert!(verify_with_t1(&k, &m, t1).ok_global);
}

#[test]
fn test_companion_identity_powers() {
    for m in [1u64, 2, 6, 49, 1 << 40] {
        let c = companion(&BigInt::from(11), &big(m));
        assert_eq!(c.pow(&big(0)), Matrix3::identity(&big(m)));
        assert_eq!(c.pow(&big(1)), c);
    }
}
