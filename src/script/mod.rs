// Command language for the "custom" chart type.
//
// User-authored script text is parsed into a closed set of commands and
// executed against the live plot element. Failures are captured, never
// propagated.

pub mod ast;
pub mod command;
pub mod exec;
pub mod lexer;

// Public API re-exports
pub use ast::ScriptCommand;
pub use command::parse_script;
pub use exec::{run, ScriptError, ScriptOutcome};
