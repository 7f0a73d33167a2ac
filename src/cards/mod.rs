//! Flashcard generation
//!
//! This module provides:
//! - The `Flashcard` sum type with one variant per card kind
//! - Card assembly policies that derive cards from sentence chunks
//! - The fixed demonstration card set

pub mod assembler;
pub mod models;

pub use assembler::{demo_cards, overview_card, CardAssembler, CLOZE_BLANK};
pub use models::*;
