use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::CommandRegistry;
use crate::CommandReport;
use crate::GeneratedFile;
use crate::ParamgenConfig;
use crate::ParamgenError;
use crate::ParamgenResult;
use crate::ResolveReport;
use crate::Template;
use crate::write_files;
use crate::commands::process_commands;
use crate::commands::remove_derived_variables;
use crate::expander::expand;
use crate::parser::parse_config;
use crate::resolver::resolve;

/// One generation job: a configuration, a template and the directory that
/// receives the generated files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSpec {
	pub config: PathBuf,
	pub template: PathBuf,
	pub output_dir: PathBuf,
}

/// The directory used for a job that names none:
/// `<default_output_prefix><unix seconds>-<ordinal>` under the current
/// directory.
pub fn default_output_dir(config: &ParamgenConfig, ordinal: usize) -> ParamgenResult<PathBuf> {
	let timestamp = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_or(0, |duration| duration.as_secs());

	Ok(std::env::current_dir()?.join(format!(
		"{}{timestamp}-{ordinal}",
		config.default_output_prefix
	)))
}

/// Parse a job list with one `config,template[,output_dir]` entry per line.
/// Blank lines and `#` comments are skipped. Jobs without an output
/// directory get [`default_output_dir`] with their line number.
pub fn parse_job_list(content: &str, config: &ParamgenConfig) -> ParamgenResult<Vec<JobSpec>> {
	let mut jobs = Vec::new();

	for (index, line) in content.lines().enumerate() {
		let trimmed = line.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}

		let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
		let (config_path, template_path, output_dir) = match fields.as_slice() {
			[config_path, template_path] => (*config_path, *template_path, None),
			[config_path, template_path, output_dir, ..] => {
				(*config_path, *template_path, Some(*output_dir))
			}
			_ => {
				return Err(ParamgenError::MalformedJobLine {
					line: index + 1,
					content: trimmed.to_string(),
				});
			}
		};

		if config_path.is_empty() || template_path.is_empty() {
			return Err(ParamgenError::MalformedJobLine {
				line: index + 1,
				content: trimmed.to_string(),
			});
		}

		let output_dir = match output_dir.filter(|dir| !dir.is_empty()) {
			Some(dir) => PathBuf::from(dir),
			None => default_output_dir(config, index + 1)?,
		};

		jobs.push(JobSpec {
			config: PathBuf::from(config_path),
			template: PathBuf::from(template_path),
			output_dir,
		});
	}

	Ok(jobs)
}

/// Everything a completed job produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
	pub job: JobSpec,
	pub commands: CommandReport,
	pub resolution: ResolveReport,
	/// Parameters without candidates. Non-empty means no file was written.
	pub empty_parameters: Vec<String>,
	pub files: Vec<GeneratedFile>,
}

/// Run the whole pipeline for one job: parse, run commands, resolve, drop
/// derived variables, expand and write one file per combination.
pub fn run_job(
	job: &JobSpec,
	config: &ParamgenConfig,
	registry: &CommandRegistry,
) -> ParamgenResult<JobReport> {
	tracing::debug!(config = %job.config.display(), template = %job.template.display(), "starting job");

	let content = read_input(&job.config, "configuration")?;
	let table = parse_config(&content, &config.exclude_prefixes)?;
	let template = Template::read(&job.template)?;

	std::fs::create_dir_all(&job.output_dir)?;

	let (table, commands) = process_commands(table, registry, &job.output_dir)?;
	let (table, resolution) = resolve(table);
	let table = remove_derived_variables(table, &commands.derived);
	let expansion = expand(&table);

	if expansion.is_empty() && config.fail_on_empty {
		return Err(ParamgenError::EmptyExpansion {
			parameters: expansion.empty_parameters,
		});
	}

	let files = write_files(
		&template,
		&expansion.assignments,
		&job.output_dir,
		&config.output_prefix,
	)?;

	tracing::info!(
		output = %job.output_dir.display(),
		files = files.len(),
		"generated files"
	);

	Ok(JobReport {
		job: job.clone(),
		commands,
		resolution,
		empty_parameters: expansion.empty_parameters,
		files,
	})
}

/// A job that stopped because of a job-local error.
#[derive(Debug)]
pub struct JobFailure {
	pub job: JobSpec,
	pub error: ParamgenError,
}

/// Outcome of running a job list.
#[derive(Debug, Default)]
pub struct RunReport {
	pub completed: Vec<JobReport>,
	pub failed: Vec<JobFailure>,
}

impl RunReport {
	pub fn is_ok(&self) -> bool {
		self.failed.is_empty()
	}
}

/// Run jobs strictly one after another. A job-local error (see
/// [`ParamgenError::is_job_local`]) is recorded and the next job starts; any
/// other error stops the run immediately.
pub fn run_jobs(
	jobs: &[JobSpec],
	config: &ParamgenConfig,
	registry: &CommandRegistry,
) -> ParamgenResult<RunReport> {
	let mut report = RunReport::default();

	for job in jobs {
		match run_job(job, config, registry) {
			Ok(job_report) => report.completed.push(job_report),
			Err(error) if error.is_job_local() => {
				tracing::error!(config = %job.config.display(), "job failed: {error}");
				report.failed.push(JobFailure {
					job: job.clone(),
					error,
				});
			}
			Err(error) => return Err(error),
		}
	}

	Ok(report)
}

fn read_input(path: &Path, kind: &'static str) -> ParamgenResult<String> {
	if !path.is_file() {
		return Err(ParamgenError::MissingInput {
			kind,
			path: path.to_path_buf(),
		});
	}

	Ok(std::fs::read_to_string(path)?)
}
