//! Widgets
//!
//! - [`TextBlock`]: borderless scrollable styled text
//! - [`concept_card`]: the concept card as styled lines

pub mod concept_card;
mod text_block;

pub use concept_card::card_lines;
pub use text_block::{StyledLine, TextBlock, TextBlockState};
