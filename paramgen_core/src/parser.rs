use super::ParamgenError;
use super::ParamgenResult;
use crate::Segment;
use crate::ValueTree;
use crate::VariableTable;

/// Parse a single configuration line into a parameter name and its value
/// tree.
///
/// The grammar is `name=seg1[;seg2[;...]]` where every segment is a
/// `,`-separated list of alternatives. Blank lines and `#` comments yield
/// `Ok(None)`. `line_number` is 1-indexed and only used for error reporting.
pub fn parse_line(line: &str, line_number: usize) -> ParamgenResult<Option<(String, ValueTree)>> {
	let line = line.trim();

	if line.is_empty() || line.starts_with('#') {
		return Ok(None);
	}

	let Some((name, raw_value)) = line.split_once('=') else {
		return Err(ParamgenError::MalformedLine {
			line: line_number,
			content: line.to_string(),
		});
	};

	let name = name.trim();
	if name.is_empty() {
		return Err(ParamgenError::EmptyName { line: line_number });
	}

	Ok(Some((name.to_string(), parse_value(raw_value))))
}

/// Split a raw value on `;` into segments and on `,` into alternatives. A
/// value without `;` is a single segment of mutually exclusive whole values.
pub fn parse_value(raw_value: &str) -> ValueTree {
	let segments = raw_value
		.split(';')
		.map(|segment| Segment::literals(segment.split(',')))
		.collect();

	ValueTree::new(segments)
}

/// Parse a whole configuration document into a [`VariableTable`].
///
/// Lines starting with any of `exclude_prefixes` are skipped. A parameter
/// defined twice keeps its last definition.
pub fn parse_config(content: &str, exclude_prefixes: &[String]) -> ParamgenResult<VariableTable> {
	let mut table = VariableTable::new();

	for (index, line) in content.lines().enumerate() {
		let trimmed = line.trim();
		if let Some(prefix) = exclude_prefixes
			.iter()
			.find(|prefix| !prefix.is_empty() && trimmed.starts_with(prefix.as_str()))
		{
			tracing::warn!(line = index + 1, prefix = %prefix, "skipping excluded line `{trimmed}`");
			continue;
		}

		let Some((name, tree)) = parse_line(line, index + 1)? else {
			continue;
		};

		tracing::debug!(line = index + 1, %name, segments = tree.len(), "parsed parameter");
		if table.insert(name.clone(), tree).is_some() {
			tracing::warn!(%name, "parameter defined more than once, keeping the last definition");
		}
	}

	Ok(table.next_version())
}
