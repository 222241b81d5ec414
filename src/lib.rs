pub mod cli;
pub mod codec;
pub mod command;
pub mod proto;
pub mod protocol;
pub mod session;

pub use cli::{CliError, execute, prompt};
pub use command::{Command, CommandError};
pub use session::{OpenOptions, RemoteIter, Session, SessionError};
