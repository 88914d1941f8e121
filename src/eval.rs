//! Pipeline execution: built-in dispatch, fork/exec with descriptor
//! rebinding, pipe wiring between adjacent stages, and child reaping.
//!
//! Every stage of a pipeline is spawned before any wait is collected.
//! Pipes are created with `O_CLOEXEC`, so the ends a child inherits but
//! does not bind vanish at exec; the coordinator drops its own copies
//! as soon as the owning child exists. An unclosed write end kept here
//! would keep the downstream reader from ever seeing end-of-input.

use std::ffi::{CString, NulError};
use std::io;
use std::os::fd::OwnedFd;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use tracing::debug;

use crate::builtin;
use crate::plan::{self, StageIo};
use crate::types::{Pipeline, Stage, Status};

#[derive(Debug, thiserror::Error)]
enum ExecError {
    #[error("{0}")]
    Sys(#[from] Errno),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("argument contains NUL byte")]
    Nul(#[from] NulError),
}

fn do_exec(stage: &Stage, io: StageIo) -> Result<std::convert::Infallible, ExecError> {
    io.bind()?;
    let argv: Vec<CString> = stage
        .argv
        .iter()
        .map(|s| CString::new(s.as_str()))
        .collect::<Result<_, _>>()?;
    Ok(unistd::execvp(&argv[0], &argv)?)
}

/// Child-side tail of a launch: bind descriptors and replace the
/// process image. On failure, report and take down this child only,
/// with 127 for a missing program and 126 for anything else. `_exit`
/// skips the inherited atexit/stdio state, which belongs to the shell.
fn exec_external(stage: &Stage, io: StageIo) -> ! {
    let status = match do_exec(stage, io) {
        Err(ExecError::Sys(Errno::ENOENT)) => {
            eprintln!("psh: command not found: {}", stage.argv[0]);
            127
        }
        Err(e) => {
            eprintln!("psh: {}: {}", stage.argv[0], e);
            126
        }
        Ok(never) => match never {},
    };
    unsafe { libc::_exit(status) }
}

/// Wait until `pid` reaches a terminal state. A stopped child is not
/// terminal; keep waiting on it.
fn reap(pid: Pid) -> nix::Result<WaitStatus> {
    loop {
        let status = waitpid(pid, Some(WaitPidFlag::WUNTRACED))?;
        match status {
            WaitStatus::Exited(..) | WaitStatus::Signaled(..) => {
                debug!(pid = pid.as_raw(), ?status, "reaped stage");
                return Ok(status);
            }
            _ => continue,
        }
    }
}

/// Run one pipeline left to right and return the terminal stage's
/// status.
///
/// Spawn-side errors (pipe or fork failure, an unopenable redirect
/// target) abort the remaining stages but never the shell; whatever was
/// already spawned is still reaped before returning. A non-last stage
/// that yields `Terminate` (the `exit` built-in) short-circuits the
/// rest the same way.
pub fn run_pipeline(pipeline: &Pipeline) -> Status {
    let count = pipeline.stages.len();
    let mut prev_read: Option<OwnedFd> = None;
    let mut children: Vec<Pid> = Vec::with_capacity(count);
    let mut last_child: Option<Pid> = None;
    let mut result = Status::Continue(0);

    for (i, stage) in pipeline.stages.iter().enumerate() {
        let is_last = i + 1 == count;

        // The (i, i+1) pipe must exist before stage i is spawned; this
        // stage's output and the next stage's input both need it.
        let (next_read, this_write) = if is_last {
            (None, None)
        } else {
            match unistd::pipe2(OFlag::O_CLOEXEC) {
                Ok((r, w)) => (Some(r), Some(w)),
                Err(e) => {
                    eprintln!("psh: pipe: {}", e);
                    result = Status::Continue(1);
                    break;
                }
            }
        };
        let left = prev_read.take();
        prev_read = next_read;

        // Blank stage: nothing to dispatch. Its pipe ends drop here, so
        // neighbors see end-of-input instead of hanging.
        if stage.argv.is_empty() {
            continue;
        }

        // Built-ins run in-process and take no part in the descriptor
        // plan; their redirect target is never opened.
        if let Some(run) = builtin::match_builtin(&stage.argv[0]) {
            let status = run(&stage.argv);
            if is_last {
                result = status;
            } else if status == Status::Terminate {
                result = status;
                break;
            }
            continue;
        }

        let io = match plan::for_stage(i, count, stage.redirect.as_deref(), left, this_write) {
            Ok(io) => io,
            Err(e) => {
                let target = stage.redirect.as_deref().unwrap_or(&stage.argv[0]);
                eprintln!("psh: {}: {}", target, e);
                result = Status::Continue(1);
                break;
            }
        };

        match unsafe { unistd::fork() } {
            Ok(ForkResult::Child) => exec_external(stage, io),
            Ok(ForkResult::Parent { child }) => {
                debug!(pid = child.as_raw(), argv = ?stage.argv, "spawned stage");
                children.push(child);
                if is_last {
                    last_child = Some(child);
                }
                // `io` drops at the end of this iteration, closing the
                // coordinator's copies of the handed-off descriptors.
            }
            Err(e) => {
                eprintln!("psh: fork: {}", e);
                result = Status::Continue(1);
                break;
            }
        }
    }

    // On the abort path a freshly created read end may still be held
    // here; release it before waiting so no child blocks on us.
    drop(prev_read);

    for pid in children {
        match reap(pid) {
            Ok(status) => {
                if Some(pid) == last_child {
                    result = match status {
                        WaitStatus::Exited(_, code) => Status::Continue(code as u8),
                        WaitStatus::Signaled(_, sig, _) => Status::Continue(128 + sig as u8),
                        _ => unreachable!("reap only returns terminal states"),
                    };
                }
            }
            Err(e) => eprintln!("psh: wait: {}", e),
        }
    }
    result
}
