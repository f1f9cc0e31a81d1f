use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ParamgenError {
	#[error(transparent)]
	#[diagnostic(code(paramgen::io_error))]
	Io(#[from] std::io::Error),

	#[error("line {line} is not a parameter definition: `{content}`")]
	#[diagnostic(
		code(paramgen::malformed_line),
		help("parameters are written as `name=alt1,alt2;seg2` and comments start with `#`")
	)]
	MalformedLine { line: usize, content: String },

	#[error("line {line} defines a parameter with an empty name")]
	#[diagnostic(code(paramgen::empty_name))]
	EmptyName { line: usize },

	#[error("malformed command key: `{0}`")]
	#[diagnostic(
		code(paramgen::malformed_command),
		help("command keys are written as `%NAME%` or `%NAME%:$variable`")
	)]
	MalformedCommand(String),

	#[error("unknown command: `{0}`")]
	#[diagnostic(
		code(paramgen::unknown_command),
		help("available commands: TAR, ZIP, FILE_IN")
	)]
	UnknownCommand(String),

	#[error("command `{0}` must bind an output variable")]
	#[diagnostic(
		code(paramgen::missing_output_variable),
		help("append `:$name` to the command key, e.g. `%TAR%:$bundle=a.txt,b.txt`")
	)]
	MissingOutputVariable(String),

	#[error("command source does not exist: `{}`", path.display())]
	#[diagnostic(code(paramgen::missing_source))]
	MissingSource { path: PathBuf },

	#[error("{kind} file not found: `{}`", path.display())]
	#[diagnostic(code(paramgen::missing_input))]
	MissingInput { kind: &'static str, path: PathBuf },

	#[error("job list line {line} is malformed: `{content}`")]
	#[diagnostic(
		code(paramgen::malformed_job_line),
		help("job lines are written as `config,template[,output_dir]`")
	)]
	MalformedJobLine { line: usize, content: String },

	#[error("failed to parse settings file: {0}")]
	#[diagnostic(
		code(paramgen::config_parse),
		help("check that paramgen.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("failed to write archive `{}`: {reason}", path.display())]
	#[diagnostic(code(paramgen::archive))]
	Archive { path: PathBuf, reason: String },

	#[error("failed to write generated file `{}`: {reason}", path.display())]
	#[diagnostic(code(paramgen::write_output))]
	WriteOutput { path: PathBuf, reason: String },

	#[error("no combinations to generate: {} has no candidate values", parameters.join(", "))]
	#[diagnostic(
		code(paramgen::empty_expansion),
		help("set `fail_on_empty = false` in paramgen.toml to treat this as a warning")
	)]
	EmptyExpansion { parameters: Vec<String> },
}

impl ParamgenError {
	/// Errors that only abort the job they occurred in. Every other error
	/// stops the whole run.
	pub fn is_job_local(&self) -> bool {
		matches!(self, Self::WriteOutput { .. } | Self::EmptyExpansion { .. })
	}
}

pub type ParamgenResult<T> = Result<T, ParamgenError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
