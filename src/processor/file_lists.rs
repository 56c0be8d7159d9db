//! Collapsing per-variable file lists into per-file read tasks

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One file to read together with the variables requested from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTask {
    pub path: PathBuf,
    pub vars: Vec<String>,
}

impl FileTask {
    pub fn new(path: impl Into<PathBuf>, vars: &[&str]) -> Self {
        Self {
            path: path.into(),
            vars: vars.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Merge per-variable file lists into a unique list of files.
///
/// Files keep their first-seen order across all lists; each file carries the
/// variables whose lists contain it, in list order and without repeats.
pub fn merge_file_lists<V, P>(lists: &[(V, Vec<P>)]) -> Vec<FileTask>
where
    V: AsRef<str>,
    P: AsRef<Path>,
{
    let mut tasks: Vec<FileTask> = Vec::new();
    for (var, files) in lists {
        let var = var.as_ref();
        for file in files {
            let path = file.as_ref();
            match tasks.iter_mut().find(|task| task.path == path) {
                Some(task) => {
                    if !task.vars.iter().any(|v| v == var) {
                        task.vars.push(var.to_string());
                    }
                }
                None => tasks.push(FileTask {
                    path: path.to_path_buf(),
                    vars: vec![var.to_string()],
                }),
            }
        }
    }
    tasks
}
