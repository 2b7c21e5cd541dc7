//! Module `commands`
//!
//! Defines the shell command set, its parser and the result structures
//! handlers return.

/// A shell command parsed from one input line.
///
/// Commands that take arguments carry them unparsed, except numeric ones.
#[derive(Debug, PartialEq)]
pub enum Command {
    Ls(Option<String>),
    Stat(String),
    Mkdir(String),
    Put(String, String),    // path, text
    Append(String, String), // path, text
    Cat(String),
    Rm { path: String, recursive: bool },
    Mv(String, String),
    Chmod(String, String), // octal mode, path
    Chown(String, String), // user:group, path
    Truncate(String, u64),
    Touch(String, i64), // path, mtime in milliseconds
    Cd(String),
    Pwd,
    Help,
    Quit,
    Unknown(String),
}

/// Outcome of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    /// Carries the errno-style status code.
    Failure(i32),
    Quit,
}

#[derive(Debug, PartialEq)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self {
            status: CommandStatus::Success,
            message: None,
        }
    }
}

/// Parses a raw input line into a `Command`.
///
/// A known command with missing or malformed arguments parses as `Unknown`.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
    let rest = parts.next().unwrap_or("").trim();
    let args: Vec<&str> = rest.split_whitespace().collect();
    let unknown = || Command::Unknown(trimmed.to_string());

    match (cmd.as_str(), args.as_slice()) {
        ("ls", []) => Command::Ls(None),
        ("ls", [path]) => Command::Ls(Some(path.to_string())),
        ("stat", [path]) => Command::Stat(path.to_string()),
        ("mkdir", [path]) => Command::Mkdir(path.to_string()),
        ("put" | "append", [path, ..]) => {
            let text = rest[path.len()..].trim_start().to_string();
            if cmd == "put" {
                Command::Put(path.to_string(), text)
            } else {
                Command::Append(path.to_string(), text)
            }
        }
        ("cat", [path]) => Command::Cat(path.to_string()),
        ("rm", [path]) => Command::Rm {
            path: path.to_string(),
            recursive: false,
        },
        ("rm", ["-r", path]) => Command::Rm {
            path: path.to_string(),
            recursive: true,
        },
        ("mv", [src, dst]) => Command::Mv(src.to_string(), dst.to_string()),
        ("chmod", [mode, path]) => Command::Chmod(mode.to_string(), path.to_string()),
        ("chown", [owner, path]) if owner.contains(':') => {
            Command::Chown(owner.to_string(), path.to_string())
        }
        ("truncate", [path, len]) => match len.parse() {
            Ok(len) => Command::Truncate(path.to_string(), len),
            Err(_) => unknown(),
        },
        ("touch", [path, mtime]) => match mtime.parse() {
            Ok(mtime) => Command::Touch(path.to_string(), mtime),
            Err(_) => unknown(),
        },
        ("cd", [path]) => Command::Cd(path.to_string()),
        ("pwd", []) => Command::Pwd,
        ("help", []) => Command::Help,
        ("quit" | "exit" | "q", []) => Command::Quit,
        _ => unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_command("ls"), Command::Ls(None));
        assert_eq!(parse_command("pwd"), Command::Pwd);
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("help"), Command::Help);
    }

    #[test]
    fn test_parse_commands_with_args() {
        assert_eq!(parse_command("ls /a"), Command::Ls(Some("/a".to_string())));
        assert_eq!(parse_command("cd docs"), Command::Cd("docs".to_string()));
        assert_eq!(
            parse_command("mv a b"),
            Command::Mv("a".to_string(), "b".to_string())
        );
        assert_eq!(
            parse_command("rm -r /tmp/x"),
            Command::Rm {
                path: "/tmp/x".to_string(),
                recursive: true
            }
        );
        assert_eq!(
            parse_command("chmod 0750 f"),
            Command::Chmod("0750".to_string(), "f".to_string())
        );
        assert_eq!(
            parse_command("chown alice:staff f"),
            Command::Chown("alice:staff".to_string(), "f".to_string())
        );
        assert_eq!(
            parse_command("truncate f 10"),
            Command::Truncate("f".to_string(), 10)
        );
        assert_eq!(
            parse_command("touch f -1"),
            Command::Touch("f".to_string(), -1)
        );
    }

    #[test]
    fn test_put_keeps_text_spacing() {
        assert_eq!(
            parse_command("put notes.txt hello  world"),
            Command::Put("notes.txt".to_string(), "hello  world".to_string())
        );
        assert_eq!(
            parse_command("append notes.txt"),
            Command::Append("notes.txt".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(parse_command("  pwd  "), Command::Pwd);
        assert_eq!(
            parse_command("stat   /a  "),
            Command::Stat("/a".to_string())
        );
    }

    #[test]
    fn test_misused_commands_are_unknown() {
        assert_eq!(parse_command("cd"), Command::Unknown("cd".to_string()));
        assert_eq!(
            parse_command("truncate f ten"),
            Command::Unknown("truncate f ten".to_string())
        );
        assert_eq!(
            parse_command("chown alice f"),
            Command::Unknown("chown alice f".to_string())
        );
        assert_eq!(
            parse_command("FOO bar"),
            Command::Unknown("FOO bar".to_string())
        );
        assert_eq!(parse_command(""), Command::Unknown(String::new()));
    }
}
