//! The execution contract handed to the job queue.

use serde::{Deserialize, Serialize};

/// A named gate the job engine must see satisfied before running a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    /// Decryption key material is unlocked and available.
    KeyMaterial,
    /// The network is reachable.
    Network,
}

impl Precondition {
    /// Stable name used in logs and persisted descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyMaterial => "key_material",
            Self::Network => "network",
        }
    }
}

/// How many times the job engine may attempt the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryBudget {
    /// At most this many attempts.
    Bounded(u32),
    /// The engine's default policy applies.
    Unbounded,
}

/// Execution contract for a pending send. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    persistent: bool,
    group_key: Option<String>,
    preconditions: Vec<Precondition>,
    retry_budget: RetryBudget,
}

impl JobDescriptor {
    /// Start building a descriptor.
    pub fn builder() -> JobDescriptorBuilder {
        JobDescriptorBuilder::default()
    }

    /// Whether the job survives a process restart.
    pub fn persistent(&self) -> bool {
        self.persistent
    }

    /// Key serializing jobs for the same destination. `None` runs ungrouped.
    pub fn group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    /// Required preconditions, in the order they were added.
    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    /// Names of the required preconditions, in order.
    pub fn precondition_names(&self) -> Vec<&'static str> {
        self.preconditions.iter().map(Precondition::as_str).collect()
    }

    /// Whether a given precondition is required.
    pub fn requires(&self, precondition: Precondition) -> bool {
        self.preconditions.contains(&precondition)
    }

    /// Attempt budget.
    pub fn retry_budget(&self) -> RetryBudget {
        self.retry_budget
    }
}

/// Fluent builder for [`JobDescriptor`].
#[derive(Debug, Clone)]
pub struct JobDescriptorBuilder {
    persistent: bool,
    group_key: Option<String>,
    preconditions: Vec<Precondition>,
    retry_budget: RetryBudget,
}

impl Default for JobDescriptorBuilder {
    fn default() -> Self {
        Self {
            persistent: false,
            group_key: None,
            preconditions: Vec::new(),
            retry_budget: RetryBudget::Unbounded,
        }
    }
}

impl JobDescriptorBuilder {
    /// Persist the job across restarts.
    pub fn with_persistence(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Serialize with other jobs sharing this key.
    pub fn with_group_key(mut self, key: impl Into<String>) -> Self {
        self.group_key = Some(key.into());
        self
    }

    /// Require a precondition. Adding one twice has no effect.
    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        if !self.preconditions.contains(&precondition) {
            self.preconditions.push(precondition);
        }
        self
    }

    /// Bound the number of attempts.
    pub fn with_retry_count(mut self, attempts: u32) -> Self {
        self.retry_budget = RetryBudget::Bounded(attempts);
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> JobDescriptor {
        JobDescriptor {
            persistent: self.persistent,
            group_key: self.group_key,
            preconditions: self.preconditions,
            retry_budget: self.retry_budget,
        }
    }
}
