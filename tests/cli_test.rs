//! Integration tests for command dispatch and exit codes.

use std::fs;

use clap::Parser;
use tempfile::TempDir;

use notetree::cli::{Cli, CliError};
use notetree::cli::commands::execute_command;
use notetree::exitcode;

fn write_outline(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("notes.outline");
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn given_consistent_outline_when_checking_then_ok() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_outline(&dir, "Root [id=1]\n  Child [id=2] [bookmark]\n");
    let cli = Cli::parse_from(["notetree", "check", path.as_str()]);

    // Act
    let result = execute_command(&cli);

    // Assert
    assert!(result.is_ok());
}

#[test]
fn given_dangling_alias_when_checking_then_integrity_exit_code() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_outline(&dir, "Root [id=1]\n  Alias [id=2] [shared=7]\n");
    let cli = Cli::parse_from(["notetree", "check", path.as_str()]);

    // Act
    let err = execute_command(&cli).unwrap_err();

    // Assert
    assert!(matches!(err, CliError::Integrity(1)));
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_missing_outline_when_showing_tree_then_io_exit_code() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent").display().to_string();
    let cli = Cli::parse_from(["notetree", "tree", path.as_str()]);

    // Act
    let err = execute_command(&cli).unwrap_err();

    // Assert
    assert_eq!(err.exit_code(), exitcode::IOERR);
}

#[test]
fn given_no_subcommand_when_executing_then_usage_error() {
    // Arrange
    let cli = Cli::parse_from(["notetree"]);

    // Act
    let err = execute_command(&cli).unwrap_err();

    // Assert
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_find_by_name_when_executing_then_ok() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_outline(&dir, "Root [id=1]\n  Target [id=2]\n");
    let cli = Cli::parse_from(["notetree", "find", path.as_str(), "--name", "Target"]);

    // Act / Assert
    assert!(execute_command(&cli).is_ok());
}
