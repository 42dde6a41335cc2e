//! The constraint table built up while resolving a run list.

use std::collections::BTreeMap;

use cookshelf_core::constraint::Constraint;

use crate::conflict::MergeConflict;
use crate::merge::merge;

/// Constraints collected per cookbook, in the order they were found.
///
/// An empty list means the cookbook is required but unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintTable {
    entries: BTreeMap<String, Vec<Constraint>>,
}

impl ConstraintTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a cookbook's entry with a single constraint.
    pub fn seed(&mut self, package: &str, constraint: Option<Constraint>) {
        self.entries
            .insert(package.to_string(), constraint.into_iter().collect());
    }

    pub fn contains(&self, package: &str) -> bool {
        self.entries.contains_key(package)
    }

    pub fn get(&self, package: &str) -> Option<&[Constraint]> {
        self.entries.get(package).map(Vec::as_slice)
    }

    /// Append a constraint to an existing entry.
    ///
    /// Returns `false` if it was already recorded or there is nothing to add.
    pub fn add(&mut self, package: &str, constraint: Option<&Constraint>) -> bool {
        let (Some(constraint), Some(list)) = (constraint, self.entries.get_mut(package)) else {
            return false;
        };
        if list.contains(constraint) {
            return false;
        }
        list.push(constraint.clone());
        true
    }

    /// Fold an environment constraint into a cookbook's entry.
    ///
    /// The entry's first constraint is merged with `environment` and the
    /// entry is replaced by the result. On conflict the table is unchanged.
    pub fn apply_environment(
        &mut self,
        package: &str,
        environment: &Constraint,
    ) -> Result<&Constraint, MergeConflict> {
        let list = self.entries.entry(package.to_string()).or_default();
        let merged = merge(list.first(), environment)?;
        *list = vec![merged];
        Ok(&list[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Constraint])> {
        self.entries
            .iter()
            .map(|(name, list)| (name.as_str(), list.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
