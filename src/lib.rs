//! AI Mood Board server library
//!
//! Exposes the pipeline and the HTTP layer for the binary and for tests.

pub mod board;
pub mod config;
pub mod example_prompts;
pub mod imagery;
pub mod llm;
pub mod mood;
pub mod palette;
pub mod random;
pub mod server;

// Re-export commonly used types for convenience
pub use board::{BoardSettings, MoodBoard, MoodBoardService};
pub use mood::{MoodLabel, MoodResult};
pub use palette::{Color, Palette};
pub use random::RandomSource;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
