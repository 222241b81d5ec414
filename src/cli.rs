//! Prompt and executor for the interactive client.
use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::{
    command::{Command, CommandError},
    proto::{Concept, ValueObject, value_object::Value},
    protocol::Transport,
    session::{RemoteIter, Session, SessionError},
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Prompts for and parses one command. End of input reads as [`Command::Exit`].
pub fn prompt<R, W>(mut reader: R, mut writer: W) -> Result<Command, CliError>
where
    R: BufRead,
    W: Write,
{
    write!(&mut writer, "> ")?;
    writer.flush()?;

    let mut s = String::default();
    if reader.read_line(&mut s)? == 0 {
        return Ok(Command::Exit);
    }
    Ok(s.as_str().try_into()?)
}

/// Runs `command` against `session`, writing its result to `writer`.
pub fn execute<T, W>(session: &Session<T>, command: &Command, mut writer: W) -> Result<(), CliError>
where
    T: Transport,
    W: Write,
{
    match command {
        Command::Exit => {}
        Command::Commit => {
            session.commit()?;
            writeln!(writer, "committed")?;
        }
        Command::Concept(id) => match session.get_concept(id)? {
            Some(concept) => writeln!(writer, "{}", describe(&concept))?,
            None => writeln!(writer, "no concept with id '{id}'")?,
        },
        Command::Schema(label) => match session.get_schema_concept(label)? {
            Some(concept) => writeln!(writer, "{}", describe(&concept))?,
            None => writeln!(writer, "no schema concept labelled '{label}'")?,
        },
        Command::Label(id) => {
            let label = session.as_schema_concept(&reference(id)).get_label()?;
            writeln!(writer, "{label}")?;
        }
        Command::Sup(id) => match session.as_schema_concept(&reference(id)).get_sup()? {
            Some(sup) => writeln!(writer, "{}", describe(&sup))?,
            None => writeln!(writer, "none")?,
        },
        Command::Subs(id) => {
            let concept = reference(id);
            list(session.as_schema_concept(&concept).subs()?, &mut writer)?;
        }
        Command::Sups(id) => {
            let concept = reference(id);
            list(session.as_schema_concept(&concept).sups()?, &mut writer)?;
        }
        Command::Instances(id) => {
            let concept = reference(id);
            list(session.as_type(&concept).instances()?, &mut writer)?;
        }
        Command::Attributes(id) => {
            let concept = reference(id);
            list(session.as_thing(&concept).attributes(&[])?, &mut writer)?;
        }
        Command::Value(id) => {
            let value = session.as_attribute(&reference(id)).value()?;
            writeln!(writer, "{}", format_value(&value))?;
        }
        Command::Delete(id) => {
            session.delete(&reference(id))?;
            writeln!(writer, "deleted {id}")?;
        }
        Command::EntityType(label) => {
            let concept = session.put_entity_type(label)?;
            writeln!(writer, "{}", describe(&concept))?;
        }
    }
    Ok(())
}

/// Concept handle for an id typed at the prompt. The server only looks at the id.
fn reference(id: &str) -> Concept {
    Concept {
        id: id.to_string(),
        ..Default::default()
    }
}

fn describe(concept: &Concept) -> String {
    match concept.kind() {
        Some(kind) => format!("{} {kind:?}", concept.id),
        None => format!("{} <base type {}>", concept.id, concept.base_type),
    }
}

fn list<T, W>(iter: RemoteIter<'_, T, Concept>, writer: &mut W) -> Result<(), CliError>
where
    T: Transport,
    W: Write,
{
    let mut count = 0;
    for concept in iter {
        writeln!(writer, "{}", describe(&concept?))?;
        count += 1;
    }
    writeln!(writer, "({count} concepts)")?;
    Ok(())
}

fn format_value(value: &ValueObject) -> String {
    match &value.value {
        Some(Value::String(s)) => format!("{s:?}"),
        Some(Value::Boolean(b)) => b.to_string(),
        Some(Value::Integer(i)) => i.to_string(),
        Some(Value::Long(l)) => l.to_string(),
        Some(Value::Float(f)) => f.to_string(),
        Some(Value::Double(d)) => d.to_string(),
        Some(Value::Date(millis)) => match value.as_datetime() {
            Some(date) => date.to_rfc3339(),
            None => format!("<date {millis}>"),
        },
        None => "<unset>".to_string(),
    }
}
