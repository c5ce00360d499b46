//! `ssm edit` command implementation

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::Path;
use std::process::Command;

use crate::config::Config;

#[derive(Args)]
pub struct EditArgs {
    /// Editor to use instead of $EDITOR or the configured one
    #[arg(short, long)]
    editor: Option<String>,
}

pub async fn run(args: EditArgs) -> Result<()> {
    let config = Config::load()?;
    let store = super::open_store(&config);

    let editor = args.editor.unwrap_or_else(|| config.editor_command());
    if std::env::var_os("EDITOR").is_none() {
        tracing::info!("$EDITOR not defined, using {}", editor);
    }

    if let Some(parent) = store.path().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let status = editor_command(&editor, store.path())?
        .status()
        .with_context(|| format!("Failed to spawn editor '{}'", editor))?;

    if !status.success() {
        bail!("Editor '{}' exited with {}", editor, status);
    }
    Ok(())
}

/// `ssm path`
pub fn print_path() -> Result<()> {
    let config = Config::load()?;
    println!("{}", super::open_store(&config).path().display());
    Ok(())
}

/// Build the editor invocation. The editor string may carry its own flags.
fn editor_command(editor: &str, file: &Path) -> Result<Command> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("No editor configured");
    };

    let mut command = Command::new(program);
    command.args(parts).arg(file);
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_command_splits_flags() {
        let command = editor_command("code --wait", Path::new("/tmp/ssm.tsv")).unwrap();
        assert_eq!(command.get_program(), "code");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["--wait", "/tmp/ssm.tsv"]);
    }

    #[test]
    fn test_empty_editor_is_rejected() {
        assert!(editor_command("   ", Path::new("/tmp/ssm.tsv")).is_err());
    }
}
