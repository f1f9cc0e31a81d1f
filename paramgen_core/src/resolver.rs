use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::Alternative;
use crate::Segment;
use crate::ValueTree;
use crate::VariableTable;
use crate::lexer::Chunk;
use crate::lexer::split_references;

/// Outcome of a resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
	/// Number of rewrite passes performed.
	pub passes: usize,
	/// Parameters that still reference a known parameter after the last
	/// pass. Only cycles end up here.
	pub unresolved: Vec<String>,
	/// `$tokens` that never matched a parameter name. They stay in the
	/// values verbatim.
	pub unknown_references: Vec<String>,
}

impl ResolveReport {
	pub fn is_complete(&self) -> bool {
		self.unresolved.is_empty()
	}
}

/// For every parameter that still contains a `$`, the set of known
/// parameter names it references. A parameter whose `$tokens` are all
/// unknown maps to an empty set.
type PendingReferences = BTreeMap<String, BTreeSet<String>>;

/// Rewrite every value tree in `table` until no `$name` reference to a known
/// parameter remains.
///
/// Each pass substitutes the *current* value of every referenced parameter,
/// so chains are followed one level per pass. The loop stops when nothing is
/// pending, when a pass leaves the pending references unchanged, or after one
/// pass per parameter plus one (which bounds cycles such as `a=$b`, `b=$a`).
/// Leftover references are reported, never fatal.
pub fn resolve(mut table: VariableTable) -> (VariableTable, ResolveReport) {
	let max_passes = table.len() + 1;
	let mut unknown = BTreeSet::new();
	let mut pending = pending_references(&table);
	let mut previous: Option<PendingReferences> = None;
	let mut passes = 0;

	while !pending.is_empty() && previous.as_ref() != Some(&pending) && passes < max_passes {
		passes += 1;
		tracing::debug!(pass = passes, pending = pending.len(), "resolving references");

		for name in pending.keys() {
			let Some(tree) = table.lookup(name) else {
				continue;
			};
			let rewritten = substitute_tree(tree, &table, &mut unknown);
			table.insert(name.clone(), rewritten);
		}

		previous = Some(pending);
		pending = pending_references(&table);
	}

	for token in &unknown {
		tracing::warn!("reference `{token}` does not match any parameter, keeping it verbatim");
	}

	let unresolved: Vec<String> = pending
		.into_iter()
		.filter(|(_, names)| !names.is_empty())
		.map(|(name, _)| name)
		.collect();
	if !unresolved.is_empty() {
		tracing::warn!(
			passes,
			"unresolved references remain in: {}",
			unresolved.join(", ")
		);
	}

	let report = ResolveReport {
		passes,
		unresolved,
		unknown_references: unknown.into_iter().collect(),
	};

	(table.next_version(), report)
}

fn pending_references(table: &VariableTable) -> PendingReferences {
	let is_known = |name: &str| table.contains_key(name);

	table
		.keys_with_references()
		.into_iter()
		.filter_map(|name| {
			let tree = table.lookup(&name)?;
			let mut names = BTreeSet::new();
			collect_references(tree, &is_known, &mut names);
			Some((name, names))
		})
		.collect()
}

fn collect_references<F>(tree: &ValueTree, is_known: &F, names: &mut BTreeSet<String>)
where
	F: Fn(&str) -> bool,
{
	for alternative in tree.iter().flat_map(|segment| segment.iter()) {
		match alternative {
			Alternative::Literal(value) if value.contains('$') => {
				for chunk in split_references(value, is_known) {
					if let Chunk::Reference(name) = chunk {
						names.insert(name.to_string());
					}
				}
			}
			Alternative::Literal(_) => {}
			Alternative::Tree(nested) => collect_references(nested, is_known, names),
		}
	}
}

fn substitute_tree(
	tree: &ValueTree,
	table: &VariableTable,
	unknown: &mut BTreeSet<String>,
) -> ValueTree {
	let segments = tree
		.iter()
		.map(|segment| {
			Segment(
				segment
					.iter()
					.map(|alternative| substitute_alternative(alternative, table, unknown))
					.collect(),
			)
		})
		.collect();

	ValueTree::new(segments)
}

/// Split a literal on its `$name` tokens and rebuild it as a nested tree:
/// literal chunks become one-alternative segments and each reference becomes
/// a segment holding the referenced parameter's current tree.
fn substitute_alternative(
	alternative: &Alternative,
	table: &VariableTable,
	unknown: &mut BTreeSet<String>,
) -> Alternative {
	let value = match alternative {
		Alternative::Tree(nested) => return Alternative::Tree(substitute_tree(nested, table, unknown)),
		Alternative::Literal(value) if !value.contains('$') => return alternative.clone(),
		Alternative::Literal(value) => value,
	};

	let chunks = split_references(value, &|name: &str| table.contains_key(name));
	for chunk in &chunks {
		if let Chunk::Unresolved(token) = chunk {
			unknown.insert((*token).to_string());
		}
	}

	if !chunks.iter().any(Chunk::is_reference) {
		return alternative.clone();
	}

	let segments = chunks
		.into_iter()
		.filter_map(|chunk| {
			match chunk {
				Chunk::Text(text) | Chunk::Unresolved(text) => Some(Segment::literal(text)),
				Chunk::Reference(name) => {
					table
						.lookup(name)
						.map(|tree| Segment(vec![Alternative::Tree(tree.clone())]))
				}
			}
		})
		.collect();

	Alternative::Tree(ValueTree::new(segments))
}
