//! # Golden Path Self-Check
//!
//! Runs the [`GoldenPath`] scenarios and reports each one.
//!
//! The duel configuration comes from `$OCGBRIDGE_CONFIG` when set; its
//! `[relay] convention` picks the blocking or the suspending surface.
//! `RUST_LOG=ocgbridge_core=debug` shows every relay request.

use std::time::Instant;

use ocgbridge::golden::GoldenPath;
use ocgbridge::BridgeConfig;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║           OCGBRIDGE GOLDEN PATH                                  ║");
    println!("║           Options → Relay → Script Bridge → Engine               ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = match BridgeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            println!("❌ CONFIG REJECTED: {err}");
            std::process::exit(2);
        }
    };
    let golden = match GoldenPath::new(&config) {
        Ok(golden) => golden,
        Err(err) => {
            println!("❌ CONFIG REJECTED: {err}");
            std::process::exit(2);
        }
    };
    println!(
        "Duel config: generation {}, flags {:#x}, relay {:?}",
        config.duel.generation,
        config.duel.flags,
        golden.convention()
    );
    println!();

    let start = Instant::now();
    let mut failures = 0;
    println!("┌─ SCENARIOS ──────────────────────────────────────────────────────┐");
    for (name, result) in golden.run() {
        match result {
            Ok(()) => println!("│ ✓ {name}"),
            Err(reason) => {
                failures += 1;
                println!("│ ✗ {name}: {reason}");
            }
        }
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!("Elapsed: {:.3} ms", start.elapsed().as_secs_f64() * 1000.0);
    println!();

    if failures == 0 {
        println!("✅ GOLDEN PATH PASSED");
        std::process::exit(0);
    } else {
        println!("❌ GOLDEN PATH FAILED ({failures} scenario(s))");
        std::process::exit(1);
    }
}
