//! Version and REPL banner constants.
//!
//! Grounded on the teacher's `config.rs`, trimmed to what a
//! prelude-backed REPL needs: the sandbox-era `FsConfig`/`NetConfig`
//! structs and the help/builtins-summary text are dropped along with
//! the filesystem/network/help subsystems they described.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "schemecore";
pub const WELCOME_SUBTITLE: &str = "A minimal Scheme-flavored Lisp core, analyzer, and trampoline";
pub const WELCOME_FOOTER: &str = "Type (quit) or Ctrl-D to exit.";
