//! Interactive shell: line parsing, help text and the prompt loop

mod help;
mod parser;
mod repl;

pub use repl::Shell;
