//! Code related to the example models and the CLI commands for interacting with them.
use super::{RunOpts, handle_run_command};
use crate::output::OUTPUT_DIRECTORY_ROOT;
use crate::settings::Settings;
use anyhow::{Context, Result, bail, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The directory containing the example models.
const EXAMPLES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/demos");

/// The file in each example describing the model
const README_FILE_NAME: &str = "README.txt";

/// The available subcommands for managing example models.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Provide information about the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Extract an example model configuration to a new directory.
    Extract {
        /// The name of the example to extract.
        name: String,
        /// The destination folder for the example.
        new_path: Option<PathBuf>,
    },
    /// Run an example.
    Run {
        /// The name of the example to run.
        name: String,
        /// Directory for output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Whether to overwrite the output directory if it already exists
        #[arg(long)]
        overwrite: bool,
        /// Whether to write additional information to CSV files
        #[arg(long)]
        debug_model: bool,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Extract {
                name,
                new_path: dest,
            } => handle_example_extract_command(&name, dest.as_deref())?,
            Self::Run {
                name,
                output_dir,
                overwrite,
                debug_model,
            } => handle_example_run_command(
                &name,
                output_dir.as_deref(),
                overwrite,
                debug_model,
                None,
            )?,
        }

        Ok(())
    }
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for entry in EXAMPLES_DIR.dirs() {
        println!("{}", entry.path().display());
    }
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    println!("{}", example_readme(name)?);

    Ok(())
}

/// Get the description of the named example
fn example_readme(name: &str) -> Result<&'static str> {
    let path: PathBuf = [name, README_FILE_NAME].iter().collect();
    EXAMPLES_DIR
        .get_file(path)
        .context("Example not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")
}

/// Handle the `example extract` command
fn handle_example_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_example(name, dest)
}

/// Extract the specified example to a new directory
fn extract_example(name: &str, new_path: &Path) -> Result<()> {
    // Find the subdirectory in EXAMPLES_DIR whose name matches `name`.
    let sub_dir = EXAMPLES_DIR.get_dir(name).context("Example not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    // Copy the contents of the subdirectory to the destination
    fs::create_dir(new_path)?;
    for entry in sub_dir.entries() {
        match entry {
            DirEntry::Dir(_) => bail!("Subdirectories in examples not supported"),
            DirEntry::File(f) => {
                let file_name = f.path().file_name().context("Invalid file in example")?;
                let file_path = new_path.join(file_name);
                fs::write(&file_path, f.contents())?;
            }
        }
    }

    Ok(())
}

/// Handle the `example run` command.
pub fn handle_example_run_command(
    name: &str,
    output_path: Option<&Path>,
    overwrite: bool,
    debug_model: bool,
    settings: Option<Settings>,
) -> Result<()> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let model_path = temp_dir.path().join(name);
    extract_example(name, &model_path)?;

    // Outputs are named after the example rather than the temporary folder
    let output_dir = match output_path {
        Some(path) => path.to_path_buf(),
        None => get_output_dir_for_example(name),
    };
    let opts = RunOpts {
        output_dir: Some(output_dir),
        overwrite,
        debug_model,
    };
    handle_run_command(&model_path, &opts, settings)
}

/// The default output folder for the named example
fn get_output_dir_for_example(name: &str) -> PathBuf {
    [OUTPUT_DIRECTORY_ROOT, name].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_examples_have_readme() {
        for entry in EXAMPLES_DIR.dirs() {
            let name = entry.path().to_str().unwrap();
            assert!(!example_readme(name).unwrap().is_empty());
        }
    }

    #[test]
    fn test_extract_example() {
        let dir = tempdir().unwrap();
        let new_path = dir.path().join("simple");
        extract_example("simple", &new_path).unwrap();
        assert!(new_path.join("model.toml").is_file());
        assert!(new_path.join(README_FILE_NAME).is_file());

        // Destination must not already exist
        assert!(extract_example("simple", &new_path).is_err());

        assert!(extract_example("missing", &dir.path().join("missing")).is_err());
    }
}
