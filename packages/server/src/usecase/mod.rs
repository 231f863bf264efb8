//! UseCase layer: one struct per operation family, with constructor-injected
//! dependencies on the domain ports and the engine's infrastructure state.

mod connect;
mod disconnect;
mod error;
mod join_board;
mod leave_board;
mod presence;
mod stats;
mod tasks;

pub use connect::ConnectClientUseCase;
pub use disconnect::{DisconnectClientUseCase, DisconnectOutcome};
pub use error::{ConnectError, EventError};
pub use join_board::JoinBoardUseCase;
pub use leave_board::LeaveBoardUseCase;
pub use presence::PresenceRelayUseCase;
pub use stats::{BoardStats, BoardStatsUseCase};
pub use tasks::TaskEventUseCase;
