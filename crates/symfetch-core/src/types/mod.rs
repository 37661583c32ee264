//! # Types
//!
//! Plain data flowing through one fetch run. Nothing here outlives a run.

pub mod address;
pub mod build_id;
pub mod library;
pub mod sections;

// Re-export all public types
pub use address::Address;
pub use build_id::BuildId;
pub use library::LibraryMapping;
pub use sections::{Section, SectionTable};
