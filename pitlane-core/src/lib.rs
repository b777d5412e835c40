pub mod agent_inputs;
pub mod error;
pub mod networking;
pub mod observation;
pub mod progress;
pub mod settings;
pub mod vehicle;

pub use settings::Settings;

pub type AgentID = usize;
