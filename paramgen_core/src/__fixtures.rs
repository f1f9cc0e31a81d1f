use std::path::Path;
use std::path::PathBuf;

use crate::Assignment;
use crate::ParamgenResult;
use crate::VariableTable;
use crate::parse_config;

/// Parse configuration text without any exclude prefixes.
pub fn table_from(content: &str) -> ParamgenResult<VariableTable> {
	parse_config(content, &[])
}

pub fn assignment(pairs: &[(&str, &str)]) -> Assignment {
	pairs.iter().copied().collect()
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
	let path = dir.join(name);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
	}
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {name}: {e}"));
	path
}

pub fn read_file(path: &Path) -> String {
	std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Contents of every generated file in `dir` with the given prefix, in
/// counter order.
pub fn generated_contents(dir: &Path, prefix: &str) -> Vec<String> {
	let mut index = 1;
	let mut contents = Vec::new();

	loop {
		let path = dir.join(format!("{prefix}{index}"));
		if !path.is_file() {
			break;
		}
		contents.push(read_file(&path));
		index += 1;
	}

	contents
}
