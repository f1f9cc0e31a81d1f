use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ParamgenError;
use crate::ParamgenResult;
use crate::ValueTree;
use crate::VariableTable;
use crate::reduce_concat;

/// Marker that opens and closes a command name, as in `%TAR%`.
pub const COMMAND_MARKER: char = '%';

/// A parsed command key: `%NAME%` or `%NAME%:$variable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandKey {
	pub name: String,
	pub output_variable: Option<String>,
}

impl CommandKey {
	/// Whether a table key denotes a command rather than a parameter.
	pub fn is_command(key: &str) -> bool {
		key.starts_with(COMMAND_MARKER)
	}

	pub fn parse(key: &str) -> ParamgenResult<Self> {
		let malformed = || ParamgenError::MalformedCommand(key.to_string());

		let rest = key.trim().strip_prefix(COMMAND_MARKER).ok_or_else(malformed)?;
		let (name, suffix) = rest.split_once(COMMAND_MARKER).ok_or_else(malformed)?;

		let valid_name = !name.is_empty()
			&& name
				.chars()
				.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.');
		if !valid_name {
			return Err(malformed());
		}

		let suffix = suffix.trim();
		let output_variable = if suffix.is_empty() {
			None
		} else {
			let variable = suffix
				.strip_prefix(':')
				.map(str::trim)
				.and_then(|s| s.strip_prefix('$'))
				.ok_or_else(malformed)?;

			if variable.is_empty() || variable.contains(char::is_whitespace) {
				return Err(malformed());
			}

			Some(variable.to_string())
		};

		Ok(Self {
			name: name.to_string(),
			output_variable,
		})
	}
}

/// A build action triggered by a command key.
///
/// `execute` receives the flattened source paths and the job's output
/// directory. Returning `Some(paths)` binds those paths to the command's
/// output variable; `None` means the action produces no variable.
pub trait CommandAction: Debug {
	fn requires_output_variable(&self) -> bool {
		false
	}

	fn execute(
		&self,
		sources: &[String],
		output_dir: &Path,
		output_variable: Option<&str>,
	) -> ParamgenResult<Option<Vec<String>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
	TarGz,
	Zip,
}

impl ArchiveFormat {
	pub fn extension(self) -> &'static str {
		match self {
			Self::TarGz => "tar.gz",
			Self::Zip => "zip",
		}
	}
}

/// Bundles every source into one archive named after the output variable,
/// written straight into the output directory.
///
/// The bound value is the archive's file name relative to the output
/// directory (`bundle.tar.gz`), not an absolute path. Generated files live
/// in the same directory, so the name can be used as is.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveAction {
	pub format: ArchiveFormat,
}

impl CommandAction for ArchiveAction {
	fn requires_output_variable(&self) -> bool {
		true
	}

	fn execute(
		&self,
		sources: &[String],
		output_dir: &Path,
		output_variable: Option<&str>,
	) -> ParamgenResult<Option<Vec<String>>> {
		let stem = output_variable.unwrap_or("archive");
		let file_name = format!("{stem}.{}", self.format.extension());
		let archive_path = output_dir.join(&file_name);

		let result = match self.format {
			ArchiveFormat::TarGz => write_tar_gz(&archive_path, sources),
			ArchiveFormat::Zip => write_zip(&archive_path, sources),
		};
		result.map_err(|e| {
			ParamgenError::Archive {
				path: archive_path.clone(),
				reason: e.to_string(),
			}
		})?;

		tracing::debug!(archive = %archive_path.display(), sources = sources.len(), "wrote archive");
		Ok(Some(vec![file_name]))
	}
}

/// Copies every source into the output directory.
#[derive(Debug, Clone, Copy)]
pub struct CopyAction;

impl CommandAction for CopyAction {
	fn execute(
		&self,
		sources: &[String],
		output_dir: &Path,
		_output_variable: Option<&str>,
	) -> ParamgenResult<Option<Vec<String>>> {
		for source in sources {
			let source_path = Path::new(source);
			let target = output_dir.join(entry_name(source_path, source));
			tracing::debug!(from = %source, to = %target.display(), "copying file");
			copy_recursive(source_path, &target)?;
		}

		Ok(None)
	}
}

/// Maps command names to their actions. New commands are added with
/// [`CommandRegistry::register`].
#[derive(Debug, Default)]
pub struct CommandRegistry {
	actions: HashMap<String, Box<dyn CommandAction>>,
}

impl CommandRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry with `TAR`, `ZIP` and `FILE_IN`.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry.register(
			"TAR",
			ArchiveAction {
				format: ArchiveFormat::TarGz,
			},
		);
		registry.register(
			"ZIP",
			ArchiveAction {
				format: ArchiveFormat::Zip,
			},
		);
		registry.register("FILE_IN", CopyAction);
		registry
	}

	pub fn register(&mut self, name: impl Into<String>, action: impl CommandAction + 'static) {
		self.actions.insert(name.into(), Box::new(action));
	}

	pub fn get(&self, name: &str) -> Option<&dyn CommandAction> {
		self.actions.get(name).map(AsRef::as_ref)
	}

	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

/// What the command pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandReport {
	/// Command names in execution order.
	pub executed: Vec<String>,
	/// Variables bound by commands. They only exist to satisfy references and
	/// are dropped with [`remove_derived_variables`] once resolution is done.
	pub derived: Vec<String>,
}

/// Run every command key in `table` and fold the results back in.
///
/// Each command key is removed from the table. Actions that bind a variable
/// insert it as a single segment whose alternatives are the produced paths.
/// Runs exactly once per job, before any file is generated.
pub fn process_commands(
	mut table: VariableTable,
	registry: &CommandRegistry,
	output_dir: &Path,
) -> ParamgenResult<(VariableTable, CommandReport)> {
	let mut report = CommandReport::default();
	let keys: Vec<String> = table
		.keys()
		.filter(|key| CommandKey::is_command(key))
		.cloned()
		.collect();

	for key in keys {
		let command = CommandKey::parse(&key)?;
		let action = registry
			.get(&command.name)
			.ok_or_else(|| ParamgenError::UnknownCommand(command.name.clone()))?;

		if action.requires_output_variable() && command.output_variable.is_none() {
			return Err(ParamgenError::MissingOutputVariable(key));
		}

		let sources = table.lookup(&key).map(command_sources).unwrap_or_default();
		for source in &sources {
			if !Path::new(source).exists() {
				return Err(ParamgenError::MissingSource {
					path: PathBuf::from(source),
				});
			}
		}

		tracing::debug!(command = %command.name, sources = sources.len(), "running command");
		let produced =
			action.execute(&sources, output_dir, command.output_variable.as_deref())?;
		table.remove(&key);
		report.executed.push(command.name.clone());

		match (produced, command.output_variable) {
			(Some(paths), Some(variable)) => {
				if table.insert(variable.clone(), ValueTree::choice(paths)).is_some() {
					tracing::warn!(%variable, "command output overwrites an existing parameter");
				}
				report.derived.push(variable);
			}
			(None, Some(variable)) => {
				tracing::warn!(
					command = %command.name,
					%variable,
					"command does not produce a value, ignoring its output variable"
				);
			}
			(_, None) => {}
		}
	}

	Ok((table.next_version(), report))
}

/// Drop the command-derived variables once ordinary resolution has consumed
/// them.
pub fn remove_derived_variables(mut table: VariableTable, derived: &[String]) -> VariableTable {
	for variable in derived {
		table.remove(variable);
	}

	table.next_version()
}

fn command_sources(tree: &ValueTree) -> Vec<String> {
	reduce_concat(tree)
		.into_iter()
		.map(|source| source.trim().to_string())
		.filter(|source| !source.is_empty())
		.collect()
}

fn entry_name(path: &Path, fallback: &str) -> PathBuf {
	path.file_name()
		.map_or_else(|| PathBuf::from(fallback), PathBuf::from)
}

fn write_tar_gz(archive_path: &Path, sources: &[String]) -> io::Result<()> {
	let encoder = GzEncoder::new(File::create(archive_path)?, Compression::default());
	let mut builder = tar::Builder::new(encoder);

	for source in sources {
		let path = Path::new(source);
		let name = entry_name(path, source);
		if path.is_dir() {
			builder.append_dir_all(&name, path)?;
		} else {
			builder.append_path_with_name(path, &name)?;
		}
	}

	builder.into_inner()?.finish()?;
	Ok(())
}

fn write_zip(archive_path: &Path, sources: &[String]) -> io::Result<()> {
	let mut writer = ZipWriter::new(File::create(archive_path)?);

	for source in sources {
		let path = Path::new(source);
		let name = entry_name(path, source);
		append_zip_entry(&mut writer, path, &zip_name(&name))?;
	}

	writer.finish().map_err(io::Error::other)?;
	Ok(())
}

fn zip_options() -> SimpleFileOptions {
	SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn append_zip_entry(writer: &mut ZipWriter<File>, path: &Path, name: &str) -> io::Result<()> {
	if path.is_dir() {
		writer
			.add_directory(format!("{name}/"), zip_options())
			.map_err(io::Error::other)?;

		for entry in std::fs::read_dir(path)? {
			let entry = entry?;
			let child_name = format!("{name}/{}", entry.file_name().to_string_lossy());
			append_zip_entry(writer, &entry.path(), &child_name)?;
		}
	} else {
		writer
			.start_file(name.to_string(), zip_options())
			.map_err(io::Error::other)?;
		io::copy(&mut File::open(path)?, writer)?;
	}

	Ok(())
}

fn zip_name(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}

fn copy_recursive(source: &Path, target: &Path) -> io::Result<()> {
	if source.is_dir() {
		std::fs::create_dir_all(target)?;
		for entry in std::fs::read_dir(source)? {
			let entry = entry?;
			copy_recursive(&entry.path(), &target.join(entry.file_name()))?;
		}
	} else {
		std::fs::copy(source, target)?;
	}

	Ok(())
}
