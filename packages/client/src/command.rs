//! Slash command parsing: turns an input line into an outbound event.

use serde_json::{Value, json};

/// Help text listing every available command.
pub const HELP: &str = "\
Commands:
  /join [board]              join a board (default board when omitted)
  /leave                     leave the current board
  /create <title>            create a task
  /update <id> <title>       retitle a task
  /status <id> <status>      set a task's status (pending|active|complete)
  /delete <id>               delete a task
  /reorder <id>:<pos> ...    move tasks to new positions
  /typing <on|off> [id]      signal typing
  /cursor <x> <y>            share cursor position
  /focus <id> | /blur <id>   signal task focus
  /ping                      measure server liveness
  /stats [board]             board member count
  /help                      this text
";

/// What an input line turned into.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// An event to send, as a JSON object without `request_id`.
    Event(Value),
    /// Print the help text.
    Help,
}

/// Parse one input line. Lines must start with `/`; everything else is a
/// usage error so typos never silently mutate the board.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Err("Commands start with '/'. Try /help.".to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let args = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "help" => Ok(Command::Help),
        "join" => Ok(Command::Event(if args.is_empty() {
            json!({"type": "join_board"})
        } else {
            json!({"type": "join_board", "board_id": args})
        })),
        "leave" => Ok(Command::Event(json!({"type": "leave_board"}))),
        "create" => {
            if args.is_empty() {
                return Err("Usage: /create <title>".to_string());
            }
            Ok(Command::Event(
                json!({"type": "create_task", "title": args}),
            ))
        }
        "update" => {
            let (id, title) = split_arg(args).ok_or("Usage: /update <id> <title>")?;
            Ok(Command::Event(
                json!({"type": "update_task", "id": id, "title": title}),
            ))
        }
        "status" => {
            let (id, status) = split_arg(args).ok_or("Usage: /status <id> <status>")?;
            Ok(Command::Event(
                json!({"type": "update_task", "id": id, "status": status}),
            ))
        }
        "delete" => {
            if args.is_empty() {
                return Err("Usage: /delete <id>".to_string());
            }
            Ok(Command::Event(json!({"type": "delete_task", "id": args})))
        }
        "reorder" => {
            let mut tasks = Vec::new();
            for pair in args.split_whitespace() {
                let (id, position) = pair
                    .split_once(':')
                    .ok_or("Usage: /reorder <id>:<pos> [<id>:<pos> ...]")?;
                let position: u32 = position
                    .parse()
                    .map_err(|_| format!("Invalid position '{position}'"))?;
                tasks.push(json!({"id": id, "position": position}));
            }
            if tasks.is_empty() {
                return Err("Usage: /reorder <id>:<pos> [<id>:<pos> ...]".to_string());
            }
            Ok(Command::Event(
                json!({"type": "reorder_tasks", "tasks": tasks}),
            ))
        }
        "typing" => {
            let mut words = args.split_whitespace();
            let is_typing = match words.next() {
                Some("on") => true,
                Some("off") => false,
                _ => return Err("Usage: /typing <on|off> [task_id]".to_string()),
            };
            Ok(Command::Event(match words.next() {
                Some(task_id) => {
                    json!({"type": "user_typing", "is_typing": is_typing, "task_id": task_id})
                }
                None => json!({"type": "user_typing", "is_typing": is_typing}),
            }))
        }
        "cursor" => {
            let mut words = args.split_whitespace();
            let x: f64 = words
                .next()
                .and_then(|w| w.parse().ok())
                .ok_or("Usage: /cursor <x> <y>")?;
            let y: f64 = words
                .next()
                .and_then(|w| w.parse().ok())
                .ok_or("Usage: /cursor <x> <y>")?;
            Ok(Command::Event(
                json!({"type": "cursor_move", "x": x, "y": y}),
            ))
        }
        "focus" => {
            if args.is_empty() {
                return Err("Usage: /focus <id>".to_string());
            }
            Ok(Command::Event(
                json!({"type": "task_focus", "task_id": args}),
            ))
        }
        "blur" => {
            if args.is_empty() {
                return Err("Usage: /blur <id>".to_string());
            }
            Ok(Command::Event(json!({"type": "task_blur", "task_id": args})))
        }
        "ping" => Ok(Command::Event(json!({"type": "ping"}))),
        "stats" => Ok(Command::Event(if args.is_empty() {
            json!({"type": "get_board_stats"})
        } else {
            json!({"type": "get_board_stats", "board_id": args})
        })),
        other => Err(format!("Unknown command '/{other}'. Try /help.")),
    }
}

fn split_arg(args: &str) -> Option<(&str, &str)> {
    let (first, rest) = args.split_once(char::is_whitespace)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    Some((first, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_without_board_uses_default() {
        // given:
        let line = "/join";

        // when:
        let command = parse_command(line).unwrap();

        // then: no board_id key, so the server falls back to its default
        assert_eq!(command, Command::Event(json!({"type": "join_board"})));
    }

    #[test]
    fn test_join_with_board_name() {
        // given:
        let line = "/join sprint-42";

        // when:
        let command = parse_command(line).unwrap();

        // then:
        assert_eq!(
            command,
            Command::Event(json!({"type": "join_board", "board_id": "sprint-42"}))
        );
    }

    #[test]
    fn test_create_keeps_the_whole_title() {
        // given: a title with spaces
        let line = "/create Fix the flaky deploy";

        // when:
        let command = parse_command(line).unwrap();

        // then:
        assert_eq!(
            command,
            Command::Event(json!({"type": "create_task", "title": "Fix the flaky deploy"}))
        );
    }

    #[test]
    fn test_update_splits_id_and_title() {
        // given:
        let line = "/update abc-123 New title here";

        // when:
        let command = parse_command(line).unwrap();

        // then:
        assert_eq!(
            command,
            Command::Event(
                json!({"type": "update_task", "id": "abc-123", "title": "New title here"})
            )
        );
    }

    #[test]
    fn test_reorder_parses_id_position_pairs() {
        // given:
        let line = "/reorder a:0 b:1 c:2";

        // when:
        let command = parse_command(line).unwrap();

        // then:
        assert_eq!(
            command,
            Command::Event(json!({
                "type": "reorder_tasks",
                "tasks": [
                    {"id": "a", "position": 0},
                    {"id": "b", "position": 1},
                    {"id": "c", "position": 2},
                ]
            }))
        );
    }

    #[test]
    fn test_typing_requires_on_or_off() {
        // given:
        let bad = parse_command("/typing maybe");
        let good = parse_command("/typing on task-1").unwrap();

        // then:
        assert!(bad.is_err());
        assert_eq!(
            good,
            Command::Event(
                json!({"type": "user_typing", "is_typing": true, "task_id": "task-1"})
            )
        );
    }

    #[test]
    fn test_cursor_requires_numeric_coordinates() {
        // given:
        let bad = parse_command("/cursor here there");
        let good = parse_command("/cursor 10.5 20").unwrap();

        // then:
        assert!(bad.is_err());
        assert_eq!(
            good,
            Command::Event(json!({"type": "cursor_move", "x": 10.5, "y": 20.0}))
        );
    }

    #[test]
    fn test_plain_text_is_rejected() {
        // given: a line without the slash prefix
        let result = parse_command("hello everyone");

        // then:
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        // given:
        let result = parse_command("/frobnicate");

        // then:
        assert!(result.unwrap_err().contains("/frobnicate"));
    }

    #[test]
    fn test_help() {
        // given:
        let command = parse_command("/help").unwrap();

        // then:
        assert_eq!(command, Command::Help);
    }
}
