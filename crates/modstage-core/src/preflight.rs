//! Precondition check for required inputs.

use std::path::Path;

use crate::error::StageError;
use crate::layout::InputArtifact;

/// Verify that every required input exists.
///
/// All missing inputs are reported together so a single run surfaces the
/// whole list instead of one name per attempt.
pub fn check_inputs<'a>(
    inputs: impl IntoIterator<Item = &'a InputArtifact>,
    instructions: &Path,
) -> Result<(), StageError> {
    let mut missing = Vec::new();
    for input in inputs {
        if input.exists() {
            tracing::debug!(name = %input.display_name, path = %input.path.display(), "Input present");
        } else {
            tracing::debug!(name = %input.display_name, path = %input.path.display(), "Input missing");
            missing.push(input.display_name.clone());
        }
    }

    if missing.is_empty() {
        return Ok(());
    }

    Err(StageError::MissingInputs {
        names: missing,
        instructions: instructions.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_all_present_passes() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let a = tmp.path().join("a.jar");
        let b = tmp.path().join("b.zip");
        fs::write(&a, "a").expect("write should succeed");
        fs::write(&b, "b").expect("write should succeed");

        let inputs = [InputArtifact::new("a.jar", a), InputArtifact::new("b.zip", b)];
        check_inputs(&inputs, Path::new("README.md")).expect("inputs should be present");
    }

    #[test]
    fn test_reports_every_missing_input() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let inputs = [
            InputArtifact::new("a.jar", tmp.path().join("a.jar")),
            InputArtifact::new("b.zip", tmp.path().join("b.zip")),
        ];

        let err = check_inputs(&inputs, Path::new("README.md")).unwrap_err();
        match err {
            StageError::MissingInputs {
                names,
                instructions,
            } => {
                assert_eq!(names, vec!["a.jar".to_string(), "b.zip".to_string()]);
                assert_eq!(instructions, Path::new("README.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_directory_is_not_a_present_input() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let dir = tmp.path().join("a.jar");
        fs::create_dir_all(&dir).expect("create_dir_all should succeed");

        let inputs = [InputArtifact::new("a.jar", dir)];
        assert!(check_inputs(&inputs, Path::new("README.md")).is_err());
    }
}
