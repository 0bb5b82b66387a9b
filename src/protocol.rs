//! Line-oriented command protocol.
//!
//! One command per line, `|`-delimited fields, first field selects the verb
//! (case-insensitive). Parsing produces a typed [`Command`]; it never touches
//! the store. Reply strings are fixed verbatim -- existing terminal and web
//! clients parse them, so the exact text (including the capitalized booleans
//! in LIST output) is part of the wire contract.

use crate::types::{Task, TaskId, parse_due};

/// Capability banner sent once per connection, before the first command.
pub const BANNER: &str = "Conectado ao servidor de tarefas.\n\
Comandos:\n\
ADD|Descrição|YYYY-MM-DD|HH:MM|+55DDDNÚMERO\n\
LIST\n\
REMOVE|ID\n\
EDIT|ID|Descrição|YYYY-MM-DD|HH:MM|+55DDDNÚMERO\n\
EXIT\n";

pub const REPLY_EDITED: &str = "Tarefa editada com sucesso.";
pub const REPLY_REMOVED: &str = "Tarefa removida com sucesso.";
pub const REPLY_NOT_FOUND: &str = "ID não encontrado.";
pub const REPLY_LIST_EMPTY: &str = "Nenhuma tarefa cadastrada.";
pub const REPLY_GOODBYE: &str = "Fechando conexão. Tchau!";

/// A validated protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        description: String,
        date: String,
        time: String,
        phone: String,
    },
    List,
    Edit {
        id: TaskId,
        description: String,
        date: String,
        time: String,
        phone: String,
    },
    Remove {
        id: TaskId,
    },
    Exit,
}

/// Command parse failures, each with a fixed client-facing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Date or time field does not parse as `YYYY-MM-DD` / 24h `HH:MM`.
    InvalidDateTime,
    /// Id field is not an integer.
    InvalidId,
    /// Unrecognized verb, or wrong field count for a known verb.
    Unknown,
}

impl CommandError {
    pub fn reply(&self) -> &'static str {
        match self {
            CommandError::InvalidDateTime => {
                "Formato de data/hora inválido. Use YYYY-MM-DD e HH:MM (24h)"
            }
            CommandError::InvalidId => "ID inválido.",
            CommandError::Unknown => "Comando inválido.",
        }
    }
}

fn parse_id(field: &str) -> Result<TaskId, CommandError> {
    field.trim().parse().map_err(|_| CommandError::InvalidId)
}

fn validate_due(date: &str, time: &str) -> Result<(), CommandError> {
    parse_due(date, time)
        .map(|_| ())
        .map_err(|_| CommandError::InvalidDateTime)
}

/// Parse one command line. Fields are trimmed of surrounding whitespace.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let parts: Vec<&str> = line.split('|').collect();
    let verb = parts[0].trim().to_uppercase();

    match (verb.as_str(), parts.len()) {
        ("ADD", 5) => {
            let date = parts[2].trim();
            let time = parts[3].trim();
            validate_due(date, time)?;
            Ok(Command::Add {
                description: parts[1].trim().to_string(),
                date: date.to_string(),
                time: time.to_string(),
                phone: parts[4].trim().to_string(),
            })
        }
        ("LIST", 1) => Ok(Command::List),
        ("EDIT", 6) => {
            let id = parse_id(parts[1])?;
            let date = parts[3].trim();
            let time = parts[4].trim();
            validate_due(date, time)?;
            Ok(Command::Edit {
                id,
                description: parts[2].trim().to_string(),
                date: date.to_string(),
                time: time.to_string(),
                phone: parts[5].trim().to_string(),
            })
        }
        ("REMOVE", 2) => Ok(Command::Remove { id: parse_id(parts[1])? }),
        ("EXIT", 1) => Ok(Command::Exit),
        _ => Err(CommandError::Unknown),
    }
}

pub fn render_added(task: &Task) -> String {
    format!("Tarefa adicionada: ID {}", task.id)
}

/// One LIST line per task, storage order.
pub fn render_task_line(task: &Task) -> String {
    format!(
        "{} - {} | {} {} | Phone: {} | Sent: {}",
        task.id,
        task.description,
        task.date,
        task.time,
        task.phone,
        if task.sent { "True" } else { "False" }
    )
}

pub fn render_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return REPLY_LIST_EMPTY.to_string();
    }
    tasks
        .iter()
        .map(render_task_line)
        .collect::<Vec<_>>()
        .join("\n")
}
