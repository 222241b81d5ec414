//! Commands understood by the interactive client.
//!
//! Each line typed at the prompt is parsed into a [`Command`], then executed against
//! an open [`Session`](crate::session::Session) by [`execute`](crate::cli::execute).
//! Dot-prefixed commands control the transaction; the rest inspect or change
//! concepts and take a single id or label argument.
//!
//! # Example
//! ```rust
//! use concept_session::Command;
//!
//! let cmd: Command = "subs V4216".try_into().unwrap();
//! assert_eq!(cmd, Command::Subs("V4216".to_string()));
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("invalid '{command}' command, {reason}")]
    InvalidCommandArguments { command: String, reason: String },

    #[error("no command provided")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Leave the prompt without committing.
    Exit,
    /// Commit the open transaction.
    Commit,
    /// Look a concept up by id.
    Concept(String),
    /// Look a schema concept up by label.
    Schema(String),
    Label(String),
    Sup(String),
    Subs(String),
    Sups(String),
    Instances(String),
    /// Attributes owned by a thing.
    Attributes(String),
    /// Value held by an attribute.
    Value(String),
    Delete(String),
    /// Define an entity type with the given label.
    EntityType(String),
}

impl TryInto<Command> for &str {
    type Error = CommandError;

    fn try_into(self) -> Result<Command, Self::Error> {
        let mut parts = self.split_whitespace();
        let name = parts.next().ok_or(CommandError::Empty)?;
        let argument = parts.next();

        if let Some(extra) = parts.next() {
            return Err(CommandError::InvalidCommandArguments {
                command: name.to_string(),
                reason: format!("unexpected argument '{extra}'"),
            });
        }

        let constructor: fn(String) -> Command = match name {
            ".exit" | ".commit" => {
                if argument.is_some() {
                    return Err(CommandError::InvalidCommandArguments {
                        command: name.to_string(),
                        reason: "takes no arguments".to_string(),
                    });
                }
                return Ok(if name == ".exit" {
                    Command::Exit
                } else {
                    Command::Commit
                });
            }
            "concept" => Command::Concept,
            "schema" => Command::Schema,
            "label" => Command::Label,
            "sup" => Command::Sup,
            "subs" => Command::Subs,
            "sups" => Command::Sups,
            "instances" => Command::Instances,
            "attributes" => Command::Attributes,
            "value" => Command::Value,
            "delete" => Command::Delete,
            "entity-type" => Command::EntityType,
            other => return Err(CommandError::UnrecognizedCommand(other.to_string())),
        };

        let argument = argument.ok_or_else(|| CommandError::InvalidCommandArguments {
            command: name.to_string(),
            reason: match name {
                "schema" | "entity-type" => format!("requires a label. Example: {name} person"),
                _ => format!("requires a concept id. Example: {name} V4216"),
            },
        })?;
        Ok(constructor(argument.to_string()))
    }
}
