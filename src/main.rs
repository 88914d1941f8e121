mod builtin;
mod eval;
mod parser;
mod plan;
mod types;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use types::Status;

const PROMPT: &str = "psh> ";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                match parser::parse_line(&line) {
                    Ok(pipeline) => {
                        if eval::run_pipeline(&pipeline) == Status::Terminate {
                            break;
                        }
                    }
                    Err(e) => eprintln!("psh: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
