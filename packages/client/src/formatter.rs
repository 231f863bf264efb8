//! Event formatting utilities for client display.

/// Event formatter for client display
pub struct EventFormatter;

impl EventFormatter {
    /// Format a board join acknowledgement
    pub fn format_joined(board_id: &str, users_in_room: usize) -> String {
        format!(
            "\n* Joined board '{}' ({} member{})\n",
            board_id,
            users_in_room,
            if users_in_room == 1 { "" } else { "s" }
        )
    }

    /// Format a user-joined notification
    pub fn format_user_joined(username: &str, timestamp: &str) -> String {
        format!("\n+ {} joined at {}\n", username, timestamp)
    }

    /// Format a user-left notification
    pub fn format_user_left(username: &str, timestamp: &str) -> String {
        format!("\n- {} left at {}\n", username, timestamp)
    }

    /// Format a task-created notification
    pub fn format_task_created(title: &str, task_id: &str, created_by: &str) -> String {
        format!(
            "\n\n------------------------------------------------------------\n\
             @{} created task '{}'\n\
             id: {}\n\
             ------------------------------------------------------------\n",
            created_by, title, task_id
        )
    }

    /// Format a task-updated notification
    pub fn format_task_updated(title: &str, updated_by: &str, changes: &[String]) -> String {
        format!(
            "\n~ @{} updated '{}' ({})\n",
            updated_by,
            title,
            changes.join(", ")
        )
    }

    /// Format a task-deleted notification
    pub fn format_task_deleted(task_title: &str, deleted_by: &str) -> String {
        format!("\nx @{} deleted '{}'\n", deleted_by, task_title)
    }

    /// Format a tasks-reordered notification
    pub fn format_tasks_reordered(count: usize, reordered_by: &str) -> String {
        format!("\n~ @{} reordered {} task(s)\n", reordered_by, count)
    }

    /// Format a typing indicator
    pub fn format_user_typing(username: &str, is_typing: bool) -> String {
        if is_typing {
            format!("\n… {} is typing\n", username)
        } else {
            format!("\n… {} stopped typing\n", username)
        }
    }

    /// Format a cursor position update
    pub fn format_cursor_moved(username: &str, x: f64, y: f64) -> String {
        format!("\n. {} cursor at ({:.0}, {:.0})\n", username, x, y)
    }

    /// Format a task focus/blur notification
    pub fn format_task_focus(username: &str, task_id: &str, focused: bool) -> String {
        if focused {
            format!("\no {} is viewing task {}\n", username, task_id)
        } else {
            format!("\no {} left task {}\n", username, task_id)
        }
    }

    /// Format a server-reported error
    pub fn format_error(error: &str, details: Option<&[String]>) -> String {
        match details {
            Some(details) if !details.is_empty() => {
                format!("\n! {}: {}\n", error, details.join("; "))
            }
            _ => format!("\n! {}\n", error),
        }
    }

    /// Format a pong response
    pub fn format_pong(server_time: &str) -> String {
        format!("\n* pong, server time {}\n", server_time)
    }

    /// Format a board stats response
    pub fn format_stats(board_id: &str, connected_users: usize) -> String {
        format!("\n* board '{}': {} connected\n", board_id, connected_users)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_joined_pluralizes_members() {
        // given:
        let alone = EventFormatter::format_joined("main-board", 1);
        let crowded = EventFormatter::format_joined("main-board", 3);

        // then:
        assert!(alone.contains("1 member)"));
        assert!(crowded.contains("3 members)"));
    }

    #[test]
    fn test_format_user_joined() {
        // given:
        let result = EventFormatter::format_user_joined("bob", "2026-01-01T09:00:00Z");

        // then:
        assert!(result.contains("+ bob joined at"));
        assert!(result.contains("2026-01-01"));
    }

    #[test]
    fn test_format_user_left() {
        // given:
        let result = EventFormatter::format_user_left("charlie", "2026-01-01T09:05:00Z");

        // then:
        assert!(result.contains("- charlie left at"));
    }

    #[test]
    fn test_format_task_created() {
        // given:
        let result = EventFormatter::format_task_created("Write docs", "abc-123", "alice");

        // then:
        assert!(result.contains("@alice created task 'Write docs'"));
        assert!(result.contains("id: abc-123"));
    }

    #[test]
    fn test_format_task_updated_lists_changes() {
        // given:
        let changes = vec!["title".to_string(), "status".to_string()];

        // when:
        let result = EventFormatter::format_task_updated("Write docs", "bob", &changes);

        // then:
        assert!(result.contains("@bob updated 'Write docs'"));
        assert!(result.contains("title, status"));
    }

    #[test]
    fn test_format_error_with_details() {
        // given:
        let details = vec!["Title cannot be empty".to_string()];

        // when:
        let result = EventFormatter::format_error("Validation failed", Some(&details));

        // then:
        assert!(result.contains("Validation failed: Title cannot be empty"));
    }

    #[test]
    fn test_format_error_without_details() {
        // given:
        let result = EventFormatter::format_error("Rate limit exceeded", None);

        // then:
        assert!(result.contains("! Rate limit exceeded"));
    }

    #[test]
    fn test_format_typing_states() {
        // given:
        let typing = EventFormatter::format_user_typing("alice", true);
        let stopped = EventFormatter::format_user_typing("alice", false);

        // then:
        assert!(typing.contains("alice is typing"));
        assert!(stopped.contains("alice stopped typing"));
    }

    #[test]
    fn test_format_cursor_rounds_coordinates() {
        // given:
        let result = EventFormatter::format_cursor_moved("bob", 10.7, 20.2);

        // then:
        assert!(result.contains("(11, 20)"));
    }
}
