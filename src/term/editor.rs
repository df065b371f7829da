use std::io::stdout;
use std::path::Path;

use anyhow::Context;
use editor_command::EditorBuilder;
use ratatui::DefaultTerminal;
use ratatui::crossterm::ExecutableCommand;
use ratatui::crossterm::terminal::{EnterAlternateScreen, disable_raw_mode, enable_raw_mode};

/// Opens `path` in the user's editor and restores the terminal afterwards.
pub fn run_editor(terminal: &mut DefaultTerminal, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    let mut command = EditorBuilder::edit_file(path)
        .context("no editor configured, set $VISUAL or $EDITOR")?;
    disable_raw_mode()?;
    let status = command.status();
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    terminal.clear()?;
    let status = status.with_context(|| format!("failed to run editor on {}", path.display()))?;
    tracing::debug!(%status, "editor exited");
    Ok(())
}
