//! In-memory status source for testing the probe without a server.

use crate::collector::traits::{FetchError, Stage, StatusSource, TextRow};

/// In-memory `StatusSource`.
///
/// Holds the three raw result sets, can be told to fail at a given stage,
/// and records which stages were fetched in which order.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    status: TextRow,
    variables: TextRow,
    replication: Vec<TextRow>,
    failing: Option<Stage>,
    calls: Vec<Stage>,
}

impl MockSource {
    /// Creates an empty source: no status, no variables, not a replica.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a `SHOW GLOBAL STATUS` entry.
    pub fn set_status(&mut self, name: &str, value: &str) -> &mut Self {
        self.status.insert(name.to_string(), value.to_string());
        self
    }

    /// Removes a `SHOW GLOBAL STATUS` entry.
    pub fn remove_status(&mut self, name: &str) -> &mut Self {
        self.status.remove(name);
        self
    }

    /// Sets a `SHOW VARIABLES` entry.
    pub fn set_variable(&mut self, name: &str, value: &str) -> &mut Self {
        self.variables.insert(name.to_string(), value.to_string());
        self
    }

    /// Removes a `SHOW VARIABLES` entry.
    pub fn remove_variable(&mut self, name: &str) -> &mut Self {
        self.variables.remove(name);
        self
    }

    /// Appends a `SHOW SLAVE STATUS` row.
    pub fn add_replication_row(&mut self, fields: &[(&str, &str)]) -> &mut Self {
        let row = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.replication.push(row);
        self
    }

    /// Sets a field on the first replication row, creating the row if needed.
    pub fn set_replication_field(&mut self, name: &str, value: &str) -> &mut Self {
        if self.replication.is_empty() {
            self.replication.push(TextRow::new());
        }
        self.replication[0].insert(name.to_string(), value.to_string());
        self
    }

    /// Removes a field from the first replication row.
    pub fn remove_replication_field(&mut self, name: &str) -> &mut Self {
        if let Some(row) = self.replication.first_mut() {
            row.remove(name);
        }
        self
    }

    /// Makes the fetch for `stage` fail.
    pub fn fail_at(&mut self, stage: Stage) -> &mut Self {
        self.failing = Some(stage);
        self
    }

    /// Stages fetched so far, in call order.
    pub fn calls(&self) -> &[Stage] {
        &self.calls
    }

    fn enter(&mut self, stage: Stage) -> Result<(), FetchError> {
        self.calls.push(stage);
        if self.failing == Some(stage) {
            return Err(FetchError::Malformed(format!(
                "injected failure for {}",
                stage
            )));
        }
        Ok(())
    }
}

impl StatusSource for MockSource {
    fn fetch_status(&mut self) -> Result<TextRow, FetchError> {
        self.enter(Stage::Status)?;
        Ok(self.status.clone())
    }

    fn fetch_variables(&mut self) -> Result<TextRow, FetchError> {
        self.enter(Stage::Variables)?;
        Ok(self.variables.clone())
    }

    fn fetch_replication_status(&mut self) -> Result<Vec<TextRow>, FetchError> {
        self.enter(Stage::SlaveStatus)?;
        Ok(self.replication.clone())
    }
}
