// Stealth Profile Infrastructure
//
// Anti-bot fingerprint pool: coherent browser identities handed out one
// at a time, plus per-session localStorage seeding and behavior plans.

pub mod fingerprint_pool;

pub use fingerprint_pool::{FingerprintGuard, FingerprintPool};
