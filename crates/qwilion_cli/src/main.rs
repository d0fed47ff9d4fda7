//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `qwilion_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Tiny probe to validate core crate wiring independently from the
    // mobile host runtime.
    println!("qwilion_core ping={}", qwilion_core::ping());
    println!("qwilion_core version={}", qwilion_core::core_version());
}
