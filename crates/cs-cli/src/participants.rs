//! # Participants Subcommand
//!
//! Sorts a course's participant list, read from a JSON file holding an
//! array of `{firstname, lastname, email, grade, schooltype}` records.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use cs_core::{ListSorter, Participant, SortOrder};

/// Arguments for the `cs participants` subcommand.
#[derive(Args, Debug)]
pub struct ParticipantsArgs {
    /// JSON file with the participant array.
    pub file: PathBuf,

    /// Sort by field (firstname, lastname, email, grade, schooltype). Each
    /// repetition flips the direction.
    #[arg(long = "sort")]
    pub sort: Vec<String>,

    /// Start with a descending sort.
    #[arg(long)]
    pub descending: bool,

    /// Print the sorted list as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Execute the participants subcommand.
pub fn run_participants(args: &ParticipantsArgs) -> Result<u8> {
    let mut participants = load_participants(&args.file)?;

    let start = if args.descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let mut sorter = ListSorter::starting_with(start);
    for key in &args.sort {
        sorter.sort(&mut participants, key);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&participants)?);
    } else {
        print!("{}", render_participants(&participants));
    }
    Ok(0)
}

/// Read the participant array from `path`.
pub fn load_participants(path: &Path) -> Result<Vec<Participant>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn render_participants(participants: &[Participant]) -> String {
    let mut out = String::new();
    for p in participants {
        let grade = p.grade.map(|g| format!("{g}. Klasse")).unwrap_or_default();
        out.push_str(&format!(
            "{} {}  {}  {}  {}\n",
            p.firstname,
            p.lastname,
            p.email.as_deref().unwrap_or("-"),
            grade,
            p.schooltype.as_deref().unwrap_or("-")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("participants.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_accepts_partial_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            r#"[{"firstname":"b","lastname":"X","grade":7},{"firstname":"A","lastname":"Y"}]"#,
        );
        let list = load_participants(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].grade, Some(7));
        assert!(list[1].email.is_none());
    }

    #[test]
    fn test_load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "{not json");
        let err = load_participants(&path).unwrap_err();
        assert!(format!("{err}").contains("failed to parse"));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_participants(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_render_fills_missing_fields() {
        let list = vec![Participant {
            firstname: "Ada".into(),
            lastname: "L".into(),
            email: None,
            grade: Some(9),
            schooltype: None,
        }];
        assert_eq!(render_participants(&list), "Ada L  -  9. Klasse  -\n");
    }
}
