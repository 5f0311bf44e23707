pub mod config;
pub mod defaults;
pub mod document;
pub mod error;
pub mod history;
pub mod normalize;
pub mod progress;
pub mod sse;
pub mod state;
pub mod stream;
pub mod transport;
pub mod types;

pub use error::AnalysisFailure;
pub use types::*;
