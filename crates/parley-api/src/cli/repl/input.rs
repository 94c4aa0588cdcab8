//! Line input for the REPL.
//!
//! The prompt always shows the joined channel and the local identity, e.g.
//! `[general] @alice >`. Ctrl+D and Ctrl+C come back as distinct events so
//! the loop can route both through the normal exit path.

use console::style;
use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

#[derive(Debug, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl+D, or the terminal went away.
    Eof,
    /// Ctrl+C.
    Interrupted,
}

pub struct ReplInput {
    rl: Readline,
    identity: String,
}

/// Prompt text for `identity` on `channel`.
pub fn prompt_for(identity: &str, channel: &str) -> String {
    format!(
        "{} {} ",
        style(format!("[{channel}]")).dim(),
        style(format!("{identity} >")).green().bold()
    )
}

impl ReplInput {
    /// Start reading for `identity`, initially on `channel`.
    ///
    /// The returned `SharedWriter` prints above the prompt; anything written
    /// to plain stdout while the prompt is active garbles the line.
    pub fn new(identity: &str, channel: &str) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, writer) = Readline::new(prompt_for(identity, channel))?;
        let input = Self {
            rl,
            identity: identity.to_string(),
        };
        Ok((input, writer))
    }

    /// Redraw the prompt after a channel change.
    pub fn set_channel(&mut self, channel: &str) {
        let prompt = prompt_for(&self.identity, channel);
        if let Err(err) = self.rl.update_prompt(&prompt) {
            tracing::debug!(error = %err, "prompt update failed");
        }
    }

    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                if !line.trim().is_empty() {
                    self.rl.add_history_entry(line.clone());
                }
                InputEvent::Line(line)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(err) => {
                tracing::debug!(error = %err, "readline failed, treating as EOF");
                InputEvent::Eof
            }
        }
    }

    /// Write out anything still buffered before the terminal is restored.
    pub fn flush(&mut self) {
        let _ = self.rl.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_channel_and_identity() {
        console::set_colors_enabled(false);
        assert_eq!(prompt_for("@alice", "general"), "[general] @alice > ");
    }
}
