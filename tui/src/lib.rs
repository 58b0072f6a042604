//! Atelier TUI - Terminal studio for atelier
//!
//! This crate provides a full-screen terminal view of a concept synthesis
//! run: the staged references, the run status, and the concept card themed
//! with the active theme.
//!
//! # Architecture
//!
//! - **StudioClient**: Embeds the Conductor and relays its messages
//! - **DisplayState**: Last published record, theme and run state
//! - **View**: Pure rendering of the display state into a buffer
//! - **Widgets**: Borderless scrollable text and the concept card

pub mod app;
pub mod display;
pub mod studio_client;
pub mod theme;
pub mod view;
pub mod widgets;

pub use app::App;
pub use display::DisplayState;
pub use studio_client::StudioClient;
