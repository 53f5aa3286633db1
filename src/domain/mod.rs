//! Domain layer for Markdown Guardian
//!
//! CDD Principle: Domain Model - Pure values describing documents and their defects
//! - Contains violations, per-document reports and the aggregate validation report
//! - Independent of file systems, terminals and configuration formats

pub mod violations;

// Re-export main domain types for convenience
pub use violations::*;
