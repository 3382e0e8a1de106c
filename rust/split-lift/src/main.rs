//! split-lift CLI: FSLL period prediction and verification.
//!
//! Subcommands:
//!   predict  --k 2 --m 7 [--explain] [--json | --csv] [--level N]
//!   verify   --k 2 --m 7 [--t1 T] [--per-prime] [--json]
//!   run      --k 2 --m 7 [--mode auto|fsll|naive] [--limit L] [--json]
//!   tabulate --k 2 --primes-up-to 200
//!
//! Order tables are read from `--table-dir` (or SPLITLIFT_TABLE_DIR),
//! default `cp_maps/`.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use serde_json::json;

use split_lift::error::{Result, SplitLiftError};
use split_lift::order_table::{load_cp_map, save_cp_map};
use split_lift::predict::predict_fsll;
use split_lift::report;
use split_lift::tabulate::tabulate;
use split_lift::verify::verify;
use split_lift::{run_pipeline, PeriodSource, RunMode};

#[derive(Parser)]
#[command(name = "split-lift")]
#[command(version, about = "split-lift: recurrence periods mod m via FSLL")]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding k{K}.json local-order tables
    #[arg(long, global = true, env = "SPLITLIFT_TABLE_DIR", default_value = "cp_maps")]
    table_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate t1 with FSLL/LCM/CRT when possible
    Predict {
        #[arg(long, allow_hyphen_values = true)]
        k: BigInt,
        #[arg(long)]
        m: BigUint,
        /// Show per-prime resolution
        #[arg(long)]
        explain: bool,
        #[arg(long, conflicts_with = "csv")]
        json: bool,
        #[arg(long)]
        csv: bool,
        /// Also print the period at this level
        #[arg(long)]
        level: Option<u32>,
    },

    /// Check a period by matrix exponentiation (global and per prime)
    Verify {
        #[arg(long, allow_hyphen_values = true)]
        k: BigInt,
        #[arg(long)]
        m: BigUint,
        /// Period to check; defaults to the FSLL estimate
        #[arg(long)]
        t1: Option<BigUint>,
        /// Also check each prime-power factor
        #[arg(long)]
        per_prime: bool,
        #[arg(long)]
        json: bool,
    },

    /// Full pipeline: predict -> verify
    Run {
        #[arg(long, allow_hyphen_values = true)]
        k: BigInt,
        #[arg(long)]
        m: BigUint,
        #[arg(long, value_enum, default_value = "auto")]
        mode: ModeArg,
        /// Step bound for naive order search
        #[arg(long, default_value = "1000000")]
        limit: u64,
        #[arg(long)]
        json: bool,
    },

    /// Compute and store c_p for all primes up to a bound
    Tabulate {
        #[arg(long, allow_hyphen_values = true)]
        k: BigInt,
        #[arg(long, default_value = "200")]
        primes_up_to: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Auto,
    Fsll,
    Naive,
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => RunMode::Auto,
            ModeArg::Fsll => RunMode::Fsll,
            ModeArg::Naive => RunMode::Naive,
        }
    }
}

fn check_modulus(m: &BigUint) -> Result<()> {
    if m.is_zero() {
        return Err(SplitLiftError::InvalidModulus(m.to_string()));
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_predict(
    table_dir: &Path,
    k: &BigInt,
    m: &BigUint,
    explain: bool,
    json: bool,
    csv: bool,
    level: Option<u32>,
) -> Result<i32> {
    check_modulus(m)?;
    let table = load_cp_map(table_dir, k)?;
    let result = predict_fsll(k, m, &table);
    if json {
        print_json(&report::prediction_json(&result))?;
    } else if csv {
        print!("{}", report::prediction_csv(&result));
    } else {
        print!("{}", report::prediction_text(&result, explain, level));
    }
    Ok(0)
}

fn cmd_verify(
    table_dir: &Path,
    k: &BigInt,
    m: &BigUint,
    t1: Option<BigUint>,
    per_prime: bool,
    json: bool,
) -> Result<i32> {
    check_modulus(m)?;
    let table = load_cp_map(table_dir, k)?;
    let prediction = predict_fsll(k, m, &table);

    let Some(t1) = t1.or_else(|| prediction.t1_est().cloned()) else {
        if json {
            print_json(&json!({
                "verified": false,
                "reason": "no t1 given and FSLL prediction fell back",
                "prediction": report::prediction_json(&prediction),
            }))?;
        } else {
            print!("{}", report::prediction_text(&prediction, true, None));
            println!("  verify: not applicable (pass --t1 to check a period directly)");
        }
        return Ok(2);
    };

    let rows = per_prime.then_some(prediction.per_prime.as_slice());
    let result = verify(k, m, &t1, rows);
    if json {
        print_json(&report::verification_json(&result))?;
    } else {
        print!("{}", report::verification_text(k, m, &result));
    }
    Ok(if result.is_verified() { 0 } else { 1 })
}

fn cmd_run(
    table_dir: &Path,
    k: &BigInt,
    m: &BigUint,
    mode: RunMode,
    limit: u64,
    json: bool,
) -> Result<i32> {
    check_modulus(m)?;
    let table = load_cp_map(table_dir, k)?;
    let run = run_pipeline(k, m, mode, limit, &table);

    let source = match run.source {
        Some(PeriodSource::Fsll) => "fsll",
        Some(PeriodSource::Naive) => "naive",
        None => "none",
    };

    if json {
        print_json(&json!({
            "source": source,
            "prediction": run.prediction.as_ref().map(report::prediction_json),
            "verification": run.verification.as_ref().map(report::verification_json),
            "exit_code": run.exit_code(),
        }))?;
    } else {
        if let Some(prediction) = &run.prediction {
            print!("{}", report::prediction_text(prediction, true, None));
        }
        match &run.verification {
            Some(v) => {
                println!("  period source: {}", source);
                print!("{}", report::verification_text(k, m, v));
            }
            None => println!("  no period found to verify"),
        }
    }
    Ok(run.exit_code())
}

fn cmd_tabulate(table_dir: &Path, k: &BigInt, primes_up_to: u64) -> Result<i32> {
    let table = tabulate(k, primes_up_to);
    let path = save_cp_map(table_dir, k, &table)?;
    println!("Wrote {} entries to {}", table.len(), path.display());
    Ok(0)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let table_dir = cli.table_dir.as_path();

    let outcome = match cli.command {
        Commands::Predict {
            k,
            m,
            explain,
            json,
            csv,
            level,
        } => cmd_predict(table_dir, &k, &m, explain, json, csv, level),
        Commands::Verify {
            k,
            m,
            t1,
            per_prime,
            json,
        } => cmd_verify(table_dir, &k, &m, t1, per_prime, json),
        Commands::Run {
            k,
            m,
            mode,
            limit,
            json,
        } => cmd_run(table_dir, &k, &m, mode.into(), limit, json),
        Commands::Tabulate { k, primes_up_to } => cmd_tabulate(table_dir, &k, primes_up_to),
    };

    match outcome {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
