//! Code related to CLI interface for managing the settings file
use crate::settings::{Settings, get_settings_file_path};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::Path;

/// Subcommands for settings
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Edit the program settings file, creating it if needed
    Edit,
    /// Check that the settings file can be loaded and has valid values
    Check,
    /// Get the path to where the settings file is read from
    Path,
    /// Write the contents of a placeholder `settings.toml` to the console
    DumpDefault,
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        let file_path = get_settings_file_path();
        match self {
            Self::Edit => handle_edit_command(&file_path)?,
            Self::Check => handle_check_command(&file_path)?,
            Self::Path => println!("{}", file_path.display()),
            Self::DumpDefault => print!("{}", Settings::default_file_contents()),
        }

        Ok(())
    }
}

/// Create a placeholder settings file at `file_path` unless there is one already.
///
/// Returns whether a new file was written.
fn ensure_settings_file_exists(file_path: &Path) -> Result<bool> {
    if file_path.is_file() {
        return Ok(false);
    }

    if let Some(dir_path) = file_path.parent() {
        fs::create_dir_all(dir_path)
            .with_context(|| format!("Failed to create directory: {}", dir_path.display()))?;
    }

    fs::write(file_path, Settings::default_file_contents())
        .with_context(|| format!("Failed to write settings file: {}", file_path.display()))?;

    Ok(true)
}

/// Handle the `edit` command
fn handle_edit_command(file_path: &Path) -> Result<()> {
    if ensure_settings_file_exists(file_path)? {
        println!("Created settings file: {}", file_path.display());
    }

    println!("Opening settings file for editing: {}", file_path.display());
    edit::edit_file(file_path)?;

    // Report mistakes now rather than on the next run
    check_settings_file(file_path)?;

    Ok(())
}

/// Handle the `check` command
fn handle_check_command(file_path: &Path) -> Result<()> {
    let settings = check_settings_file(file_path)?;
    if file_path.is_file() {
        println!("Settings file is valid: {}", file_path.display());
    } else {
        println!("No settings file found, so defaults are used");
    }
    print!("{}", toml::to_string(&settings)?);

    Ok(())
}

/// Load the settings at `file_path`, checking their values
fn check_settings_file(file_path: &Path) -> Result<Settings> {
    Settings::load_from_path(file_path).context("Settings file is invalid.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_settings_file_exists() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config").join("settings.toml");

        assert!(ensure_settings_file_exists(&file_path).unwrap());
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            Settings::default_file_contents()
        );

        // An existing file is left alone
        fs::write(&file_path, "log_level = \"warn\"\n").unwrap();
        assert!(!ensure_settings_file_exists(&file_path).unwrap());
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "log_level = \"warn\"\n"
        );
    }

    #[test]
    fn test_check_settings_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("settings.toml");

        // Missing file means default settings
        assert_eq!(check_settings_file(&file_path).unwrap(), Settings::default());

        // The placeholder file is valid
        ensure_settings_file_exists(&file_path).unwrap();
        assert_eq!(check_settings_file(&file_path).unwrap(), Settings::default());
        assert!(handle_check_command(&file_path).is_ok());

        fs::write(&file_path, "log_level = \"loud\"\n").unwrap();
        assert_eq!(
            check_settings_file(&file_path).unwrap_err().to_string(),
            "Settings file is invalid."
        );
    }
}
