// Rhythm Chart Core - onset-driven chart generation and real-time judgement
// Audio → features → peaks → chart (once), then input → judgement (per tick)

pub mod analysis;
pub mod audio;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod judgement;
pub mod telemetry;

// Re-exports for convenience
pub use analysis::AudioInput;
pub use chart::{generate_chart, GeneratedChart, Note, NoteChart, NoteId, NoteKind};
pub use config::{AppConfig, Difficulty, DifficultyProfile};
pub use engine::PlaySession;
pub use error::{ChartError, ErrorCode};
pub use judgement::{Grade, JudgementEngine, JudgementOutcome, PressOutcome, SessionStats};
