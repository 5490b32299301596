use thiserror::Error;

/// User input read from the terminal
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Opens the address prompt
    OpenPrompt,
    ConfirmAddress(String),
    CancelAddress,
    /// Selects a publish rate index
    Rate(usize),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Invalid rate index: {0}")]
    InvalidRate(String),
    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),
}

pub const HELP: &str = "\
Commands:
  address [host:port]  set the broker address (opens the prompt without argument)
  cancel               dismiss the address prompt
  rate <index>         select the publish rate (0: 1000 ms ... 4: 50 ms)
  status               show the current values
  quit                 exit";

/// Parses one input line. While the address prompt is open a line that isn't a
/// command is the address itself, and an empty line cancels the prompt.
pub fn parse_line(line: &str, prompt_open: bool) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(prompt_open.then_some(Command::CancelAddress));
    }

    let (keyword, argument) = match line.split_once(char::is_whitespace) {
        Some((keyword, argument)) => (keyword, Some(argument.trim())),
        None => (line, None),
    };

    let command = match (keyword.to_ascii_lowercase().as_str(), argument) {
        ("address", Some(address)) => Command::ConfirmAddress(address.to_string()),
        ("address", None) => Command::OpenPrompt,
        ("cancel", None) => Command::CancelAddress,
        ("rate", Some(index)) => Command::Rate(
            index
                .parse()
                .map_err(|_| CommandError::InvalidRate(index.to_string()))?,
        ),
        ("rate", None) => return Err(CommandError::MissingArgument("rate")),
        ("status", None) => Command::Status,
        ("help", None) => Command::Help,
        ("quit" | "exit", None) => Command::Quit,
        _ if prompt_open => Command::ConfirmAddress(line.to_string()),
        _ => return Err(CommandError::Unknown(line.to_string())),
    };
    Ok(Some(command))
}
