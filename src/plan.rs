//! Per-stage descriptor planning: where a stage's stdin and stdout come
//! from, as a pair of owning bindings.
//!
//! Every source descriptor is held by an owning handle, so the
//! "duplicate onto the standard slot, then release the source" step
//! cannot leak a pipe end on any path: whoever drops the binding closes
//! its copy.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsRawFd, OwnedFd};

use nix::unistd;

/// Where a stage's standard input comes from.
#[derive(Debug)]
pub enum Input {
    /// The inherited terminal stdin; no duplication needed.
    Inherit,
    /// The read end of the pipe behind this stage.
    Pipe(OwnedFd),
}

/// Where a stage's standard output goes.
#[derive(Debug)]
pub enum Output {
    Inherit,
    /// The write end of the pipe ahead of this stage.
    Pipe(OwnedFd),
    /// A redirect target, already opened write/create/truncate.
    File(File),
}

#[derive(Debug)]
pub struct StageIo {
    pub input: Input,
    pub output: Output,
}

/// Compute the binding pair for stage `index` of `count`.
///
/// `left` is the read end of the pipe behind this stage, `right` the
/// write end of the pipe ahead; both transfer ownership into the plan.
/// The redirect file is opened here, before the stage is launched, so
/// an open failure aborts the pipeline while it is still the
/// coordinator's problem.
pub fn for_stage(
    index: usize,
    count: usize,
    redirect: Option<&str>,
    left: Option<OwnedFd>,
    right: Option<OwnedFd>,
) -> io::Result<StageIo> {
    let input = match left {
        Some(fd) => Input::Pipe(fd),
        None => Input::Inherit,
    };
    let last = index + 1 == count;
    let output = match (right, redirect) {
        (Some(fd), _) => Output::Pipe(fd),
        (None, Some(path)) if last => {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?;
            Output::File(file)
        }
        _ => Output::Inherit,
    };
    Ok(StageIo { input, output })
}

impl StageIo {
    /// Apply both bindings: duplicate each source onto its standard
    /// slot, then release the source. Runs in the child between fork
    /// and exec; the shell's own descriptors are never rebound.
    pub fn bind(self) -> nix::Result<()> {
        match &self.input {
            Input::Inherit => {}
            Input::Pipe(fd) => {
                unistd::dup2(fd.as_raw_fd(), libc::STDIN_FILENO)?;
            }
        }
        match &self.output {
            Output::Inherit => {}
            Output::Pipe(fd) => {
                unistd::dup2(fd.as_raw_fd(), libc::STDOUT_FILENO)?;
            }
            Output::File(file) => {
                unistd::dup2(file.as_raw_fd(), libc::STDOUT_FILENO)?;
            }
        }
        Ok(())
    }
}
