use std::collections::BTreeMap;

use derive_more::Deref;

use crate::ValueTree;

/// Parameter name to value tree. Entries iterate in name order so every phase
/// is deterministic. `version` counts the phases that produced this table and
/// is bumped through [`VariableTable::next_version`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct VariableTable {
	#[deref]
	entries: BTreeMap<String, ValueTree>,
	version: u64,
}

impl VariableTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn version(&self) -> u64 {
		self.version
	}

	/// Consume this table and hand back the same entries tagged as the next
	/// version. Each phase calls this once on the table it returns.
	#[must_use]
	pub fn next_version(mut self) -> Self {
		self.version += 1;
		self
	}

	pub fn lookup(&self, name: &str) -> Option<&ValueTree> {
		self.entries.get(name)
	}

	/// Insert or overwrite an entry, returning the previous value.
	pub fn insert(&mut self, name: impl Into<String>, value: ValueTree) -> Option<ValueTree> {
		self.entries.insert(name.into(), value)
	}

	pub fn remove(&mut self, name: &str) -> Option<ValueTree> {
		self.entries.remove(name)
	}

	/// Names whose value tree still contains a `$` somewhere.
	pub fn keys_with_references(&self) -> Vec<String> {
		self.entries
			.iter()
			.filter(|(_, tree)| tree.has_reference())
			.map(|(name, _)| name.clone())
			.collect()
	}
}

impl<K: Into<String>> FromIterator<(K, ValueTree)> for VariableTable {
	fn from_iter<T: IntoIterator<Item = (K, ValueTree)>>(iter: T) -> Self {
		Self {
			entries: iter
				.into_iter()
				.map(|(name, tree)| (name.into(), tree))
				.collect(),
			version: 0,
		}
	}
}
