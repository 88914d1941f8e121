//! Built-in commands, run inside the shell process itself.

use std::path::Path;

use nix::unistd;

use crate::types::Status;

pub type Builtin = fn(&[String]) -> Status;

/// Static name → handler lookup. Built-ins never participate in piping
/// or redirection.
pub fn match_builtin(name: &str) -> Option<Builtin> {
    match name {
        "cd" => Some(builtin_cd),
        "exit" => Some(builtin_exit),
        _ => None,
    }
}

fn builtin_cd(argv: &[String]) -> Status {
    let Some(path) = argv.get(1) else {
        eprintln!("psh: expected argument to \"cd\"");
        return Status::Continue(1);
    };
    if let Err(e) = unistd::chdir(Path::new(path)) {
        eprintln!("psh: cd: {}: {}", path, e);
        return Status::Continue(1);
    }
    Status::Continue(0)
}

fn builtin_exit(_: &[String]) -> Status {
    Status::Terminate
}
