//! decksh: a little language for deck markup generation.
//!
//! Scripts are line-oriented; each line is tokenized, its identifiers are
//! resolved against a symbol table, and the leading keyword selects a
//! markup generator. Loops buffer their body and replay it through the
//! same pipeline. Errors are collected per line and reported in
//! aggregate; processing continues past them.

pub mod command;
pub mod dispatch;
pub mod emit;
pub mod error;
pub mod eval;
pub mod interp;
pub mod lexer;

pub use command::{CommandRunner, ShellRunner};
pub use error::Error;
pub use interp::Interp;

/// Compile a script with the production shell runner, returning every
/// statement-level error collected during the pass.
pub fn compile(src: &str, w: &mut dyn std::io::Write) -> std::io::Result<Vec<Error>> {
    let mut interp = Interp::new(Box::new(ShellRunner));
    interp.run(src, w)?;
    Ok(interp.into_errors())
}
