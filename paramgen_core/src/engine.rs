use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::Assignment;
use crate::ParamgenError;
use crate::ParamgenResult;
use crate::lexer::Chunk;
use crate::lexer::split_references;

/// Default file name prefix for generated files: `file_gen_1`, `file_gen_2`,
/// and so on.
pub const DEFAULT_OUTPUT_PREFIX: &str = "file_gen_";

/// A template read once and copied for every assignment. Lines keep their
/// original terminators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
	lines: Vec<String>,
}

impl Template {
	pub fn new(content: &str) -> Self {
		Self {
			lines: content.split_inclusive('\n').map(String::from).collect(),
		}
	}

	pub fn read(path: &Path) -> ParamgenResult<Self> {
		if !path.is_file() {
			return Err(ParamgenError::MissingInput {
				kind: "template",
				path: path.to_path_buf(),
			});
		}

		Ok(Self::new(&std::fs::read_to_string(path)?))
	}

	/// Substitute every line for one assignment.
	pub fn render(&self, assignment: &Assignment) -> Substitution {
		let mut text = String::new();
		let mut unresolved = BTreeSet::new();

		for line in &self.lines {
			let substitution = substitute_line(line, assignment);
			text.push_str(&substitution.text);
			unresolved.extend(substitution.unresolved);
		}

		Substitution {
			text,
			unresolved: unresolved.into_iter().collect(),
		}
	}
}

/// Text after substitution together with the tokens that could not be
/// replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
	pub text: String,
	pub unresolved: Vec<String>,
}

/// Replace every `$name` token in `line` with its value from `assignment`.
///
/// Each pass scans the line once; text inserted during a pass is only
/// rescanned by the next one. Passes stop when no `$` remains, when a pass
/// replaces nothing, or after `assignment.len() + 1` passes. Whatever is left
/// is returned in [`Substitution::unresolved`].
pub fn substitute_line(line: &str, assignment: &Assignment) -> Substitution {
	let is_known = |name: &str| assignment.contains_key(name);
	let max_passes = assignment.len() + 1;
	let mut text = line.to_string();

	for _ in 0..max_passes {
		if !text.contains('$') {
			break;
		}

		let mut replaced = false;
		let mut next = String::with_capacity(text.len());
		for chunk in split_references(&text, &is_known) {
			match chunk {
				Chunk::Reference(name) => {
					next.push_str(assignment.get(name).unwrap_or_default());
					replaced = true;
				}
				Chunk::Text(value) | Chunk::Unresolved(value) => next.push_str(value),
			}
		}

		text = next;
		if !replaced {
			break;
		}
	}

	let unresolved = if text.contains('$') {
		split_references(&text, &is_known)
			.into_iter()
			.filter_map(|chunk| {
				match chunk {
					Chunk::Reference(name) => Some(format!("${name}")),
					Chunk::Unresolved(token) => Some(token.to_string()),
					Chunk::Text(_) => None,
				}
			})
			.collect()
	} else {
		Vec::new()
	};

	Substitution { text, unresolved }
}

/// A file written for one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
	/// 1-indexed position in generation order.
	pub index: usize,
	pub path: PathBuf,
	/// Tokens left untouched in this file.
	pub unresolved: Vec<String>,
}

/// Write one file per assignment into `output_dir`, named `<prefix><N>` with
/// `N` counting from 1 in assignment order.
///
/// Each file is written to a temporary file in `output_dir` and then moved
/// into place. The first failure aborts the remaining assignments; files
/// already written stay on disk.
pub fn write_files(
	template: &Template,
	assignments: &[Assignment],
	output_dir: &Path,
	prefix: &str,
) -> ParamgenResult<Vec<GeneratedFile>> {
	let mut generated = Vec::with_capacity(assignments.len());

	for (offset, assignment) in assignments.iter().enumerate() {
		let index = offset + 1;
		let path = output_dir.join(format!("{prefix}{index}"));
		let rendered = template.render(assignment);

		if !rendered.unresolved.is_empty() {
			tracing::warn!(
				file = %path.display(),
				"unresolved tokens left in output: {}",
				rendered.unresolved.join(", ")
			);
		}

		write_atomically(&path, output_dir, rendered.text.as_bytes()).map_err(|reason| {
			ParamgenError::WriteOutput {
				path: path.clone(),
				reason,
			}
		})?;

		tracing::debug!(file = %path.display(), %assignment, "generated file");
		generated.push(GeneratedFile {
			index,
			path,
			unresolved: rendered.unresolved,
		});
	}

	Ok(generated)
}

fn write_atomically(path: &Path, dir: &Path, content: &[u8]) -> Result<(), String> {
	let mut file = NamedTempFile::new_in(dir).map_err(|e| e.to_string())?;
	file.write_all(content).map_err(|e| e.to_string())?;
	file.persist(path).map_err(|e| e.to_string())?;
	Ok(())
}
