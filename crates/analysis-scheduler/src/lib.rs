//! Analysis scheduling for a live text editor
//!
//! Decides *when* to call the analysis service while the user types and which
//! results may still change the screen.
//!
//! - [`machine`]: pure debounce / max-wait / lock state machine
//! - [`session`]: [`EditorSession`], the state behind one text box
//! - [`sim`]: virtual-clock executor for deterministic runs
//! - `driver` (feature `driver`): tokio executor publishing [`shared_types::RenderState`]
//!
//! ```
//! use analysis_scheduler::{EditorSession, Effect};
//!
//! let mut session = EditorSession::default();
//! let effects = session.set_text("You should man up.");
//! assert!(effects.iter().any(|e| matches!(e, Effect::Analyze { sequence: 1, .. })));
//! ```

pub mod analyzer;
pub mod config;
#[cfg(feature = "driver")]
pub mod driver;
pub mod edits;
pub mod error;
pub mod machine;
pub mod session;
pub mod sim;

pub use analyzer::Analyzer;
pub use config::{EngineConfig, RequestConfig, SchedulerConfig};
#[cfg(feature = "driver")]
pub use driver::{spawn_session, Command, SessionDriver};
pub use error::{parse_response, AnalyzeError, ConfigError};
pub use machine::{Decision, Effect, Event, Phase, Scheduler, SchedulerState, TimerId, TimerKind};
pub use session::EditorSession;
pub use sim::{AnalyzeCall, Reply, Simulation};
