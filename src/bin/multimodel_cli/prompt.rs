use anyhow::{bail, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Ask for the departure and destination airports
pub fn ask_route() -> Result<(String, String)> {
    let mut editor = DefaultEditor::new()?;
    let from = ask(&mut editor, "Enter departure airport: ")?;
    let to = ask(&mut editor, "Enter destination airport: ")?;
    Ok((from, to))
}

/// Read the first word of a line, asking again on blank input
fn ask(editor: &mut DefaultEditor, prompt: &str) -> Result<String> {
    loop {
        match editor.readline(prompt) {
            Ok(line) => {
                if let Some(word) = line.split_whitespace().next() {
                    return Ok(word.to_string());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => bail!("No airport entered"),
            Err(e) => return Err(e.into()),
        }
    }
}
