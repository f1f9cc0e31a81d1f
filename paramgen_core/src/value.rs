use std::collections::BTreeMap;
use std::fmt::Display;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Serialize;

/// One candidate at a segment position. Literals come straight from the
/// configuration; trees appear once a `$name` reference has been substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alternative {
	Literal(String),
	Tree(ValueTree),
}

impl Alternative {
	pub fn literal(value: impl Into<String>) -> Self {
		Self::Literal(value.into())
	}

	/// Whether this alternative still carries a `$` anywhere, recursing into
	/// nested trees.
	pub fn has_reference(&self) -> bool {
		match self {
			Self::Literal(value) => value.contains('$'),
			Self::Tree(tree) => tree.has_reference(),
		}
	}

	fn reduce(&self) -> Vec<String> {
		match self {
			Self::Literal(value) => vec![value.clone()],
			Self::Tree(tree) => reduce_concat(tree),
		}
	}
}

/// A set of mutually exclusive alternatives at one concatenation position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct Segment(pub Vec<Alternative>);

impl Segment {
	pub fn literal(value: impl Into<String>) -> Self {
		Self(vec![Alternative::literal(value)])
	}

	pub fn literals<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(values.into_iter().map(Alternative::literal).collect())
	}

	/// Every string this segment can contribute, in order.
	pub fn candidates(&self) -> Vec<String> {
		self.iter().flat_map(Alternative::reduce).collect()
	}
}

/// The value of one parameter: segments concatenated positionally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct ValueTree(pub Vec<Segment>);

impl ValueTree {
	pub fn new(segments: Vec<Segment>) -> Self {
		Self(segments)
	}

	/// A tree holding a single literal value.
	pub fn constant(value: impl Into<String>) -> Self {
		Self(vec![Segment::literal(value)])
	}

	/// One segment whose alternatives are the given literals.
	pub fn choice<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(vec![Segment::literals(values)])
	}

	pub fn is_constant(&self) -> bool {
		matches!(self.as_slice(), [segment] if matches!(segment.as_slice(), [Alternative::Literal(_)]))
	}

	pub fn has_reference(&self) -> bool {
		self.iter()
			.any(|segment| segment.iter().any(Alternative::has_reference))
	}
}

/// Flatten a value tree into every string obtained by picking one
/// alternative per segment and concatenating them in order. The first segment
/// varies slowest and duplicates are preserved.
pub fn reduce_concat(tree: &ValueTree) -> Vec<String> {
	let mut results = vec![String::new()];

	for segment in tree.iter() {
		let candidates = segment.candidates();
		let mut next = Vec::with_capacity(results.len() * candidates.len());

		for prefix in &results {
			for candidate in &candidates {
				let mut value = String::with_capacity(prefix.len() + candidate.len());
				value.push_str(prefix);
				value.push_str(candidate);
				next.push(value);
			}
		}

		results = next;
	}

	results
}

/// One point of the cross product: a concrete value for every parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deref)]
pub struct Assignment(BTreeMap<String, String>);

impl Assignment {
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Assignment {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

impl Display for Assignment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let pairs = self
			.0
			.iter()
			.map(|(key, value)| format!("{key}={value}"))
			.collect::<Vec<_>>();
		write!(f, "{{{}}}", pairs.join(", "))
	}
}

/// Cross product across parameters. Each entry pairs a parameter name with
/// its flat candidate list; every returned assignment picks exactly one
/// candidate per parameter. The first parameter varies slowest.
pub fn reduce_merge(parameters: &[(String, Vec<String>)]) -> Vec<Assignment> {
	let mut combinations: Vec<Vec<(&str, &str)>> = vec![Vec::new()];

	for (name, candidates) in parameters {
		let mut next = Vec::with_capacity(combinations.len() * candidates.len());

		for combination in &combinations {
			for candidate in candidates {
				let mut extended = combination.clone();
				extended.push((name.as_str(), candidate.as_str()));
				next.push(extended);
			}
		}

		combinations = next;
	}

	combinations
		.into_iter()
		.map(|pairs| pairs.into_iter().collect())
		.collect()
}
