//! Lara service implementations.
//!
//! This module contains the service implementations for the Lara resources:
//! memories, glossaries, documents and text translation.

mod documents;
mod glossaries;
mod memories;
mod translator;

pub use documents::DocumentsService;
pub use glossaries::GlossariesService;
pub use memories::{Connected, MemoriesService};
pub use translator::TranslatorService;
