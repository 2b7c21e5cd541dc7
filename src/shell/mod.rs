//! Interactive shell
//!
//! Line-oriented command loop over a `CfsFileSystem`.

pub mod commands;
pub mod handlers;

use std::io::{self, BufRead, Write};

use log::debug;

use crate::filesystem::CfsFileSystem;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handlers::{format_record, handle_command};

/// Reads commands from `input` until `quit` or end of input, writing
/// responses to `output`. Returns the status of the last failed command, or
/// 0 if none failed.
pub fn run<R: BufRead, W: Write>(
    fs: &mut CfsFileSystem,
    input: R,
    mut output: W,
    prompt: bool,
) -> io::Result<i32> {
    let mut last_failure = 0;
    if prompt {
        write!(output, "cfs:{}> ", fs.working_directory())?;
        output.flush()?;
    }
    for line in input.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            let command = parse_command(&line);
            debug!("shell command: {:?}", command);
            let result = handle_command(fs, &command);
            if let Some(message) = result.message.as_deref().filter(|m| !m.is_empty()) {
                writeln!(output, "{}", message)?;
            }
            match result.status {
                CommandStatus::Quit => return Ok(last_failure),
                CommandStatus::Failure(code) => last_failure = code,
                CommandStatus::Success => {}
            }
        }
        if prompt {
            write!(output, "cfs:{}> ", fs.working_directory())?;
            output.flush()?;
        }
    }
    Ok(last_failure)
}
