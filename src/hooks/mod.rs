// src/hooks/mod.rs
// =============================================================================
// Hooks that ship with ghrecon. Library users can pass these to full_recon
// alongside their own closures.
//
// - inventory: per-repository file/byte counts
// - secrets:   regex secret scanner
// =============================================================================

mod inventory;
mod secrets;

pub use inventory::{Inventory, RepositoryTotals};
pub use secrets::{scan, Finding, SecretScanner};
