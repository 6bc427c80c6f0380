//! File-backed employee directory.
//!
//! One employee per line, `Name | Role`, the role optional. Blank lines
//! and `#` comments are ignored. Stands in for an external people-search
//! source behind the directory contract.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use mailscout_common::Employee;
use mailscout_pipeline::EmployeeDirectory;

pub struct FileRoster {
    path: PathBuf,
}

impl FileRoster {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EmployeeDirectory for FileRoster {
    /// Reads the roster, applying the case-insensitive role filter when
    /// one is given. A line with no role only matches an unfiltered
    /// query.
    async fn discover(&self, company: &str, role: Option<&str>) -> anyhow::Result<Vec<Employee>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            anyhow::anyhow!("failed to read roster {}: {err}", self.path.display())
        })?;

        let wanted = role.map(str::to_lowercase);
        let employees: Vec<Employee> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (name, line_role) = match line.split_once('|') {
                    Some((name, role)) => (name.trim(), Some(role.trim().to_lowercase())),
                    None => (line, None),
                };

                if name.is_empty() {
                    return None;
                }

                match (&wanted, line_role) {
                    (None, _) => Some(Employee::new(name)),
                    (Some(wanted), Some(role)) if role == *wanted => Some(Employee::new(name)),
                    _ => None,
                }
            })
            .collect();

        debug!(
            company,
            roster = %self.path.display(),
            found = employees.len(),
            "roster discovery"
        );

        Ok(employees)
    }
}
