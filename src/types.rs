/// One command within a pipeline: whitespace-split argv (argv[0] is the
/// command name) and an optional output redirect target.
///
/// An empty argv is a valid stage: it comes from a blank command between
/// pipe delimiters and is executed as a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub argv: Vec<String>,
    pub redirect: Option<String>,
}

/// An ordered chain of stages. Always holds at least one stage; stage 0
/// reads from the terminal and the last stage writes to it unless a
/// redirect says otherwise.
#[derive(Debug, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

/// Outcome of a stage or a whole pipeline. Only `Terminate` stops the
/// interactive loop, and only the `exit` built-in produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Continue(u8),
    Terminate,
}
