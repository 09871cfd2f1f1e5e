use crate::command::{Command, ExitCode, Sink, Source};
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use nix::fcntl::OFlag;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};
use thiserror::Error;

/// Status reported when the program could not be found.
pub const NOT_FOUND: ExitCode = 127;
/// Status reported when the program exists but cannot be executed.
pub const NOT_EXECUTABLE: ExitCode = 126;

/// Failures while starting or collecting external processes.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{program}: command not found")]
    NotFound { program: String },
    #[error("{program}: permission denied")]
    NotExecutable { program: String },
    #[error("{program}: cannot start: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("{}: {source}", path.display())]
    Destination { path: PathBuf, source: io::Error },
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("wait failed: {0}")]
    Wait(#[source] io::Error),
}

impl LaunchError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LaunchError::NotFound { .. } => NOT_FOUND,
            LaunchError::NotExecutable { .. } => NOT_EXECUTABLE,
            _ => 1,
        }
    }
}

/// How a redirection destination is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`: create the file or cut it to zero length.
    Truncate,
    /// `>>`: create the file or write after its current end.
    Append,
}

/// Open a redirection destination for writing.
///
/// The returned handle is meant to be moved into [`Sink::File`] so that the
/// shell stops holding it as soon as the child has been started.
pub fn open_destination(path: &Path, mode: RedirectMode) -> Result<File, LaunchError> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        RedirectMode::Truncate => options.write(true).truncate(true),
        RedirectMode::Append => options.append(true),
    };
    options.open(path).map_err(|source| LaunchError::Destination {
        path: path.to_path_buf(),
        source,
    })
}

/// Create a pipe channel, returned as `(read end, write end)`.
///
/// Both ends are close-on-exec: a child only keeps the end that was
/// installed as one of its standard streams.
pub fn channel() -> Result<(OwnedFd, OwnedFd), LaunchError> {
    nix::unistd::pipe2(OFlag::O_CLOEXEC).map_err(LaunchError::Pipe)
}

/// Start `command` as a child process with the given standard streams.
///
/// The child inherits the environment, working directory and standard error
/// of the shell. Stream handles are released by the shell before returning,
/// so the only remaining copies belong to the child.
pub fn spawn(command: &Command, stdin: Source, stdout: Sink) -> Result<Child, LaunchError> {
    let Some(program) = command.name() else {
        return Err(LaunchError::NotFound {
            program: String::new(),
        });
    };

    let child = std::process::Command::new(program)
        .args(command.args())
        .stdin(stdin)
        .stdout(stdout)
        .spawn()
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => LaunchError::NotFound {
                program: program.to_string(),
            },
            ErrorKind::PermissionDenied => LaunchError::NotExecutable {
                program: program.to_string(),
            },
            _ => LaunchError::Spawn {
                program: program.to_string(),
                source,
            },
        })?;
    log::debug!("started {} as pid {}", command, child.id());
    Ok(child)
}

/// Block until `child` terminates and translate its status.
pub fn wait(mut child: Child) -> Result<ExitCode, LaunchError> {
    let pid = child.id();
    let status = child.wait().map_err(LaunchError::Wait)?;
    let code = status_code(status);
    log::debug!("pid {pid} finished with {code}");
    Ok(code)
}

/// The child's exit code, or the number of the signal that killed it.
pub fn status_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    status.signal().unwrap_or(-1)
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> ExitCode {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Word;
    use nix::fcntl::{FcntlArg, FdFlag, fcntl};
    use std::fs;
    use std::io::Read;
    use std::os::fd::AsRawFd;

    fn cmd(words: &[&str]) -> Command {
        Command::new(words.iter().map(|w| Word::new(*w).unwrap()).collect())
    }

    #[test]
    fn test_exit_code_is_reported() {
        let child = spawn(&cmd(&["sh", "-c", "exit 7"]), Source::Inherit, Sink::Inherit).unwrap();
        assert_eq!(wait(child).unwrap(), 7);
    }

    #[test]
    fn test_signal_number_is_reported() {
        let child = spawn(&cmd(&["sh", "-c", "kill -9 $$"]), Source::Inherit, Sink::Inherit).unwrap();
        assert_eq!(wait(child).unwrap(), 9);
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let err = spawn(
            &cmd(&["definitely-not-a-real-program-3sh"]),
            Source::Inherit,
            Sink::Inherit,
        )
        .unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }));
        assert_eq!(err.exit_code(), NOT_FOUND);
    }

    #[test]
    fn test_truncate_and_append_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old contents\n").unwrap();

        let file = open_destination(&path, RedirectMode::Truncate).unwrap();
        let child = spawn(&cmd(&["echo", "hi"]), Source::Inherit, Sink::File(file)).unwrap();
        assert_eq!(wait(child).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hi\n");

        let file = open_destination(&path, RedirectMode::Append).unwrap();
        let child = spawn(&cmd(&["echo", "hi"]), Source::Inherit, Sink::File(file)).unwrap();
        assert_eq!(wait(child).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hi\nhi\n");
    }

    #[test]
    fn test_destination_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_destination(&dir.path().join("nope/out.txt"), RedirectMode::Truncate)
            .unwrap_err();
        assert!(matches!(err, LaunchError::Destination { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_channel_ends_are_close_on_exec() {
        let (read_end, write_end) = channel().unwrap();
        for fd in [&read_end, &write_end] {
            let flags = fcntl(fd.as_raw_fd(), FcntlArg::F_GETFD).unwrap();
            assert!(FdFlag::from_bits_truncate(flags).contains(FdFlag::FD_CLOEXEC));
        }
    }

    #[test]
    fn test_channel_reaches_end_of_stream_once_writers_close() {
        let (read_end, write_end) = channel().unwrap();
        let child = spawn(&cmd(&["printf", "abc"]), Source::Inherit, Sink::Channel(write_end)).unwrap();
        assert_eq!(wait(child).unwrap(), 0);

        let mut reader = File::from(read_end);
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(text, "abc");
    }
}
