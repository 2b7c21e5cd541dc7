//! Command handlers
//!
//! Executes parsed shell commands against a `CfsFileSystem` and renders the
//! outcome as text.

use std::io::{Read, Write};

use log::info;

use crate::error::FsError;
use crate::error::handlers::{error_to_exit_code, handle_error};
use crate::filesystem::CfsFileSystem;
use crate::permission::FsPermission;
use crate::shell::commands::{Command, CommandResult, CommandStatus};
use crate::status::FileRecord;

const HELP: &str = "\
ls [path]               list a directory
stat <path>             show one entry
mkdir <path>            create a directory and its parents
put <path> <text>       write a file, replacing it
append <path> <text>    append to a file
cat <path>              print a file
rm [-r] <path>          delete
mv <src> <dst>          rename
chmod <mode> <path>     set octal permission
chown <user:group> <p>  set owner
truncate <path> <len>   shrink a file
touch <path> <mtime>    set modification time (ms)
cd <path>               change working directory
pwd                     print working directory
quit                    leave";

/// Dispatches a parsed command to its handler.
pub fn handle_command(fs: &mut CfsFileSystem, command: &Command) -> CommandResult {
    let result = match command {
        Command::Ls(path) => handle_cmd_ls(fs, path.as_deref()),
        Command::Stat(path) => fs.stat(path).map(|record| CommandResult::success(format_record(&record))),
        Command::Mkdir(path) => fs.mkdirs_default(path).map(|_| CommandResult::silent()),
        Command::Put(path, text) => handle_cmd_put(fs, path, text),
        Command::Append(path, text) => handle_cmd_append(fs, path, text),
        Command::Cat(path) => handle_cmd_cat(fs, path),
        Command::Rm { path, recursive } => handle_cmd_rm(fs, path, *recursive),
        Command::Mv(src, dst) => handle_cmd_mv(fs, src, dst),
        Command::Chmod(mode, path) => mode
            .parse::<FsPermission>()
            .and_then(|permission| fs.set_permission(path, permission))
            .map(|_| CommandResult::silent()),
        Command::Chown(owner, path) => handle_cmd_chown(fs, owner, path),
        Command::Truncate(path, len) => fs.truncate(path, *len).map(|done| {
            if done {
                CommandResult::silent()
            } else {
                CommandResult::success(format!("{}: nothing to truncate", path))
            }
        }),
        Command::Touch(path, mtime) => {
            fs.set_times(path, *mtime, *mtime).map(|_| CommandResult::silent())
        }
        Command::Cd(path) => fs.set_working_directory(path).map(|_| CommandResult::silent()),
        Command::Pwd => Ok(CommandResult::success(fs.working_directory())),
        Command::Help => Ok(CommandResult::success(HELP)),
        Command::Quit => Ok(handle_cmd_quit()),
        Command::Unknown(raw) => Ok(handle_cmd_unknown(raw)),
    };
    result.unwrap_or_else(|e| failure(&e))
}

fn failure(err: &FsError) -> CommandResult {
    handle_error(err);
    CommandResult {
        status: CommandStatus::Failure(error_to_exit_code(err)),
        message: Some(format!("error: {}", err)),
    }
}

fn handle_cmd_ls(fs: &CfsFileSystem, path: Option<&str>) -> Result<CommandResult, FsError> {
    let target = path.unwrap_or(".");
    let records = fs.list(target)?;
    let lines: Vec<String> = records.iter().map(format_record).collect();
    Ok(CommandResult::success(lines.join("\n")))
}

fn handle_cmd_put(fs: &CfsFileSystem, path: &str, text: &str) -> Result<CommandResult, FsError> {
    let mut out = fs.create_default(path, true)?;
    out.write_all(text.as_bytes()).map_err(store_io)?;
    out.close().map_err(store_io)?;
    Ok(CommandResult::silent())
}

fn handle_cmd_append(fs: &CfsFileSystem, path: &str, text: &str) -> Result<CommandResult, FsError> {
    let mut out = fs.append(path)?;
    out.write_all(text.as_bytes()).map_err(store_io)?;
    out.close().map_err(store_io)?;
    Ok(CommandResult::silent())
}

fn handle_cmd_cat(fs: &CfsFileSystem, path: &str) -> Result<CommandResult, FsError> {
    let mut input = fs.open(path)?;
    let mut data = Vec::new();
    input.read_to_end(&mut data).map_err(store_io)?;
    input.close().map_err(store_io)?;
    Ok(CommandResult::success(String::from_utf8_lossy(&data)))
}

fn handle_cmd_rm(fs: &CfsFileSystem, path: &str, recursive: bool) -> Result<CommandResult, FsError> {
    if fs.delete(path, recursive)? {
        Ok(CommandResult::silent())
    } else {
        Err(FsError::NotFound(path.to_string()))
    }
}

fn handle_cmd_mv(fs: &CfsFileSystem, src: &str, dst: &str) -> Result<CommandResult, FsError> {
    if fs.rename(src, dst)? {
        Ok(CommandResult::silent())
    } else {
        Ok(CommandResult {
            status: CommandStatus::Failure(1),
            message: Some(format!("mv: cannot move {} to {}", src, dst)),
        })
    }
}

fn handle_cmd_chown(fs: &CfsFileSystem, owner: &str, path: &str) -> Result<CommandResult, FsError> {
    let (user, group) = owner.split_once(':').unwrap_or((owner, ""));
    fs.set_owner(path, user, group)?;
    Ok(CommandResult::silent())
}

fn handle_cmd_quit() -> CommandResult {
    info!("Shell session closed");
    CommandResult {
        status: CommandStatus::Quit,
        message: None,
    }
}

fn handle_cmd_unknown(raw: &str) -> CommandResult {
    CommandResult {
        status: CommandStatus::Failure(22),
        message: Some(format!("unknown or malformed command: {} (try help)", raw)),
    }
}

fn store_io(e: std::io::Error) -> FsError {
    FsError::StoreFailure(crate::error::StoreError::Io(e))
}

/// One `ls -l` style line.
pub fn format_record(record: &FileRecord) -> String {
    format!(
        "{}{} {:>3} {:<8} {:<8} {:>10} {:>14} {}",
        if record.is_dir { 'd' } else { '-' },
        record.permission,
        record.replication,
        record.owner,
        record.group,
        record.length,
        record.modification_time,
        record.path
    )
}
