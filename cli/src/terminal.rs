use std::io::{self, BufRead, IsTerminal, Write};

use askabroad::shell::{DisplaySink, InputSource, ShellError, ShellEvent, ShellOutput};
use colored::Colorize;
use dialoguer::{console::Term, Input};

/// Reads questions from the terminal, pre-filling the previous value.
///
/// Without a terminal (piped stdin or redirected stderr) questions are read
/// one per line instead. `exit`, `quit` or end of input close the shell.
pub struct TerminalInput {
    interactive: bool,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal() && Term::stderr().is_term(),
        }
    }
}

impl InputSource for TerminalInput {
    fn next_event(&mut self, label: &str, current: &str) -> Result<ShellEvent, ShellError> {
        if !self.interactive {
            return read_line_event(&mut io::stdin().lock());
        }

        // dialoguer appends its own ": "
        let prompt = label.trim_end_matches(':');
        let read = Input::<String>::new()
            .with_prompt(prompt)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text();

        match read {
            Ok(text) => Ok(event_for(text)),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Ok(ShellEvent::Closed)
            }
            Err(e) => Err(ShellError::Input(e.to_string())),
        }
    }
}

fn read_line_event(reader: &mut impl BufRead) -> Result<ShellEvent, ShellError> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| ShellError::Input(e.to_string()))?;
    if read == 0 {
        return Ok(ShellEvent::Closed);
    }
    let text = line.trim_end_matches(['\n', '\r']).to_string();
    Ok(event_for(text))
}

fn event_for(text: String) -> ShellEvent {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        ShellEvent::Closed
    } else {
        ShellEvent::InputChanged(text)
    }
}

/// Answers go to stdout, errors to stderr in red.
pub struct TerminalDisplay;

impl TerminalDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySink for TerminalDisplay {
    fn title(&mut self, title: &str) -> Result<(), ShellError> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}\n", title.bold()).map_err(|e| ShellError::Output(e.to_string()))
    }

    fn show(&mut self, output: &ShellOutput) -> Result<(), ShellError> {
        let written = match output {
            ShellOutput::Response(text) => {
                let mut out = io::stdout().lock();
                writeln!(out, "\n{text}\n")
            }
            ShellOutput::Error(message) => {
                let mut err = io::stderr().lock();
                writeln!(err, "\n{}\n", message.red())
            }
        };
        written.map_err(|e| ShellError::Output(e.to_string()))
    }
}
