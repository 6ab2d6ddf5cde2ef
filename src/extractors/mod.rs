// src/extractors/mod.rs
pub mod item;
pub mod pricing;
pub mod section;
pub mod sov;

// Re-export key extraction types for convenience
pub use item::{ItemDraft, Section, SovItem};
pub use section::{
    MainStrategy,
    PassThroughStrategy,
    PcoStrategy,
    RowOutcome,
    SectionStrategy,
};
pub use sov::{Extraction, PassReport, SovExtractor};
