pub mod endpoint;
pub mod gateway;
pub mod instruction;
mod response;
pub mod session;

pub use endpoint::EndpointTransport;
pub use gateway::GatewayTransport;
pub use session::AnalysisSession;
