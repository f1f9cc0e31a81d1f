use crate::Assignment;
use crate::VariableTable;
use crate::reduce_concat;
use crate::reduce_merge;

/// The combinations produced for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
	pub assignments: Vec<Assignment>,
	/// Parameters that reduced to no candidate at all. When non-empty there
	/// are no assignments.
	pub empty_parameters: Vec<String>,
}

impl Expansion {
	pub fn is_empty(&self) -> bool {
		self.assignments.is_empty()
	}
}

/// Reduce every remaining parameter to its flat candidate list and build the
/// full cross product. The number of assignments is the product of the list
/// sizes; an empty list anywhere yields none and is logged.
pub fn expand(table: &VariableTable) -> Expansion {
	let parameters: Vec<(String, Vec<String>)> = table
		.iter()
		.map(|(name, tree)| (name.clone(), reduce_concat(tree)))
		.collect();

	let empty_parameters: Vec<String> = parameters
		.iter()
		.filter(|(_, candidates)| candidates.is_empty())
		.map(|(name, _)| name.clone())
		.collect();

	if !empty_parameters.is_empty() {
		tracing::warn!(
			"no files will be generated, these parameters have no candidate values: {}",
			empty_parameters.join(", ")
		);
	}

	let assignments = reduce_merge(&parameters);
	tracing::debug!(
		parameters = parameters.len(),
		combinations = assignments.len(),
		"expanded combinations"
	);

	Expansion {
		assignments,
		empty_parameters,
	}
}
