//! Output verification and run reports

pub mod report;
pub mod verifier;

pub use report::render_summary;
pub use verifier::OutputVerifier;
