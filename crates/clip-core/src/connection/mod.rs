// ── Link health ──
//
// State machine, shared store and supervisor for the daemon link.

mod state;
mod store;
mod supervisor;

pub use state::{ConnectionState, ConnectionStatus, LinkSignal};
pub use store::ConnectionStore;
pub use supervisor::ConnectionSupervisor;
