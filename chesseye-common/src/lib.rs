//! # ChessEye Common Library
//!
//! Shared code for the ChessEye client crates:
//! - FEN position analysis (king counts, empty boards, piece counts)
//! - API request/response types for the board recognition service
//! - Configuration loading
//! - Event types and the EventBus
//! - Logging setup

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod fen;
pub mod logging;

pub use error::{Error, Result};
pub use events::{ChessEyeEvent, EventBus, SubmissionState};
