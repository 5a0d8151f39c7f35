//! Domain types for inflow-io.

use inflow_shape::Sequence;

use crate::IoError;

/// A project identifier.
///
/// Wraps the string in the first column of the inflow CSV. Matched against
/// the `name` column of a summary CSV on export.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a project ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the project ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weekly inflow sequences with their project identifiers.
///
/// Produced by [`InflowReader`](crate::InflowReader). `project_ids[i]`
/// corresponds to `sequences[i]`, in CSV row order.
#[derive(Debug)]
pub struct Dataset {
    /// Project identifiers in row order.
    pub project_ids: Vec<ProjectId>,
    /// Validated, zero-substituted sequences in the same order.
    pub sequences: Vec<Sequence>,
}

impl Dataset {
    /// Number of projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.project_ids.len()
    }

    /// Whether the dataset holds no projects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.project_ids.is_empty()
    }

    /// Number of weeks per sequence (0 for an empty dataset).
    #[must_use]
    pub fn n_weeks(&self) -> usize {
        self.sequences.first().map_or(0, Sequence::len)
    }
}
