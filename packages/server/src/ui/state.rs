//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::EventPusher,
    infrastructure::{
        broadcast::EventBroadcaster, rate_limit::SlidingWindowLimiter,
        registry::ConnectionRegistry, rooms::RoomManager,
    },
    usecase::{
        BoardStatsUseCase, ConnectClientUseCase, DisconnectClientUseCase, JoinBoardUseCase,
        LeaveBoardUseCase, PresenceRelayUseCase, TaskEventUseCase,
    },
};

/// Everything the handlers need, shared across all connections.
pub struct AppState {
    pub connect_usecase: Arc<ConnectClientUseCase>,
    pub disconnect_usecase: Arc<DisconnectClientUseCase>,
    pub join_board_usecase: Arc<JoinBoardUseCase>,
    pub leave_board_usecase: Arc<LeaveBoardUseCase>,
    pub task_events_usecase: Arc<TaskEventUseCase>,
    pub presence_usecase: Arc<PresenceRelayUseCase>,
    pub board_stats_usecase: Arc<BoardStatsUseCase>,
    pub broadcaster: Arc<EventBroadcaster>,
    pub pusher: Arc<dyn EventPusher>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub registry: Arc<ConnectionRegistry>,
    pub rooms: Arc<RoomManager>,
}
