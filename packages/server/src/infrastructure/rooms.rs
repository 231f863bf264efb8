//! Room manager: board membership for live connections.
//!
//! A connection is a member of at most one board at a time; joining a new
//! board implicitly leaves the previous one. Boards exist only while they
//! have members: they are created on first join and garbage-collected when
//! the last member leaves.
//!
//! Both sides of the membership relation (board -> member set and
//! connection -> board) live in one table behind one lock, so every
//! transition mutates them in a single critical section and concurrent
//! joiners of the same board can never observe a half-updated member list.
//! The lock is only ever held across plain map operations; fan-out to the
//! returned peer snapshots happens outside it.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::domain::{BoardId, ConnectionId};

#[derive(Default)]
struct BoardTable {
    /// Board -> member connection ids.
    boards: HashMap<BoardId, HashSet<ConnectionId>>,
    /// Connection -> the board it is currently joined to.
    joined: HashMap<ConnectionId, BoardId>,
}

/// Result of leaving a board: which board was left and who remains in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub board_id: BoardId,
    /// Remaining members, to be notified with `user_left`.
    pub peers: Vec<ConnectionId>,
}

/// Result of joining a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub board_id: BoardId,
    /// Outcome of the implicit leave of a previously joined different board.
    pub left: Option<LeaveOutcome>,
    /// Members that were already in the board, to be notified with
    /// `user_joined`. Excludes the joiner.
    pub peers: Vec<ConnectionId>,
    /// Member count after the join, including the joiner.
    pub member_count: usize,
}

/// Groups connections into named boards.
#[derive(Default)]
pub struct RoomManager {
    table: Mutex<BoardTable>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join `board_id`, implicitly leaving any different previously joined
    /// board. Rejoining the current board is a no-op on membership.
    pub async fn join(&self, connection_id: ConnectionId, board_id: BoardId) -> JoinOutcome {
        let mut table = self.table.lock().await;

        let left = match table.joined.get(&connection_id) {
            Some(previous) if *previous != board_id => {
                let previous = previous.clone();
                Some(remove_member(&mut table, &connection_id, &previous))
            }
            _ => None,
        };

        let members = table.boards.entry(board_id.clone()).or_default();
        let peers: Vec<ConnectionId> = members
            .iter()
            .filter(|id| **id != connection_id)
            .copied()
            .collect();
        members.insert(connection_id);
        let member_count = members.len();
        table.joined.insert(connection_id, board_id.clone());

        JoinOutcome {
            board_id,
            left,
            peers,
            member_count,
        }
    }

    /// Leave the currently joined board. No-op (not an error) when unjoined.
    pub async fn leave(&self, connection_id: &ConnectionId) -> Option<LeaveOutcome> {
        let mut table = self.table.lock().await;
        let board_id = table.joined.get(connection_id)?.clone();
        Some(remove_member(&mut table, connection_id, &board_id))
    }

    /// Snapshot of a board's member connection ids.
    pub async fn members_of(&self, board_id: &BoardId) -> Vec<ConnectionId> {
        let table = self.table.lock().await;
        table
            .boards
            .get(board_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// The board a connection is currently joined to, if any.
    pub async fn board_of(&self, connection_id: &ConnectionId) -> Option<BoardId> {
        let table = self.table.lock().await;
        table.joined.get(connection_id).cloned()
    }

    /// Snapshot of all live boards with their member counts.
    pub async fn boards(&self) -> Vec<(BoardId, usize)> {
        let table = self.table.lock().await;
        table
            .boards
            .iter()
            .map(|(board_id, members)| (board_id.clone(), members.len()))
            .collect()
    }
}

/// Remove `connection_id` from `board_id`, dropping the board when it
/// empties, and clear the connection's board pointer.
fn remove_member(
    table: &mut BoardTable,
    connection_id: &ConnectionId,
    board_id: &BoardId,
) -> LeaveOutcome {
    table.joined.remove(connection_id);
    let peers = match table.boards.get_mut(board_id) {
        Some(members) => {
            members.remove(connection_id);
            if members.is_empty() {
                table.boards.remove(board_id);
                Vec::new()
            } else {
                members.iter().copied().collect()
            }
        }
        None => Vec::new(),
    };
    LeaveOutcome {
        board_id: board_id.clone(),
        peers,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn board(name: &str) -> BoardId {
        BoardId::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_join_creates_board_and_counts_members() {
        // given:
        let rooms = RoomManager::new();
        let c1 = ConnectionId::generate();

        // when:
        let outcome = rooms.join(c1, board("main-board")).await;

        // then:
        assert_eq!(outcome.member_count, 1);
        assert!(outcome.peers.is_empty());
        assert!(outcome.left.is_none());
        assert_eq!(rooms.members_of(&board("main-board")).await, vec![c1]);
        assert_eq!(rooms.board_of(&c1).await, Some(board("main-board")));
    }

    #[tokio::test]
    async fn test_join_reports_existing_peers() {
        // given:
        let rooms = RoomManager::new();
        let c1 = ConnectionId::generate();
        let c2 = ConnectionId::generate();
        rooms.join(c1, board("main-board")).await;

        // when:
        let outcome = rooms.join(c2, board("main-board")).await;

        // then:
        assert_eq!(outcome.peers, vec![c1]);
        assert_eq!(outcome.member_count, 2);
    }

    #[tokio::test]
    async fn test_join_other_board_implicitly_leaves() {
        // given: c1 and c2 in board-a
        let rooms = RoomManager::new();
        let c1 = ConnectionId::generate();
        let c2 = ConnectionId::generate();
        rooms.join(c1, board("board-a")).await;
        rooms.join(c2, board("board-a")).await;

        // when: c1 switches to board-b
        let outcome = rooms.join(c1, board("board-b")).await;

        // then: c1 left board-a (c2 to be notified) and is only in board-b
        let left = outcome.left.unwrap();
        assert_eq!(left.board_id, board("board-a"));
        assert_eq!(left.peers, vec![c2]);
        assert_eq!(rooms.board_of(&c1).await, Some(board("board-b")));
        assert_eq!(rooms.members_of(&board("board-a")).await, vec![c2]);
        assert_eq!(rooms.members_of(&board("board-b")).await, vec![c1]);
    }

    #[tokio::test]
    async fn test_rejoin_same_board_keeps_membership() {
        // given:
        let rooms = RoomManager::new();
        let c1 = ConnectionId::generate();
        rooms.join(c1, board("main-board")).await;

        // when:
        let outcome = rooms.join(c1, board("main-board")).await;

        // then: no implicit leave, member set unchanged
        assert!(outcome.left.is_none());
        assert_eq!(outcome.member_count, 1);
        assert_eq!(rooms.members_of(&board("main-board")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_leave_is_noop_when_unjoined() {
        let rooms = RoomManager::new();
        assert!(rooms.leave(&ConnectionId::generate()).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_board_is_garbage_collected() {
        // given:
        let rooms = RoomManager::new();
        let c1 = ConnectionId::generate();
        rooms.join(c1, board("main-board")).await;

        // when:
        let outcome = rooms.leave(&c1).await.unwrap();

        // then:
        assert!(outcome.peers.is_empty());
        assert!(rooms.boards().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_joins_record_every_member() {
        // given: one pre-existing member
        let rooms = Arc::new(RoomManager::new());
        let existing = ConnectionId::generate();
        rooms.join(existing, board("busy-board")).await;

        // when: 32 connections join the same board concurrently
        let mut handles = Vec::new();
        for _ in 0..32 {
            let rooms = rooms.clone();
            handles.push(tokio::spawn(async move {
                rooms.join(ConnectionId::generate(), board("busy-board")).await
            }));
        }
        for handle in handles {
            // every joiner must have seen the pre-existing member
            let outcome = handle.await.unwrap();
            assert!(outcome.peers.contains(&existing));
        }

        // then: the final member set holds all 33 connections
        assert_eq!(rooms.members_of(&board("busy-board")).await.len(), 33);
    }
}
