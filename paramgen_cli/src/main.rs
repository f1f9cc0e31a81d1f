use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use paramgen_cli::Commands;
use paramgen_cli::OutputFormat;
use paramgen_cli::ParamgenCli;
use paramgen_core::CommandRegistry;
use paramgen_core::ParamgenConfig;
use paramgen_core::ParamgenError;
use paramgen_core::job::JobReport;
use paramgen_core::job::JobSpec;
use paramgen_core::job::RunReport;
use paramgen_core::job::default_output_dir;
use paramgen_core::job::parse_job_list;
use paramgen_core::job::run_jobs;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = ParamgenCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_logging(args.verbose);

	let result = match &args.command {
		Some(Commands::Run { jobs, format }) => run_job_list(&args, jobs, *format),
		Some(Commands::Generate {
			config,
			template,
			output,
			format,
		}) => run_generate(&args, config, template, output.as_deref(), *format),
		None => {
			eprintln!("No subcommand specified. Run `paramgen --help` for usage.");
			process::exit(2);
		}
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(e) => {
			match e.downcast::<ParamgenError>() {
				Ok(paramgen_err) => {
					let report: miette::Report = (*paramgen_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr at `warn` by default and `debug` with `--verbose`.
/// `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}

fn resolve_root(args: &ParamgenCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_settings(args: &ParamgenCli) -> Result<ParamgenConfig, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let settings = ParamgenConfig::load_or_default(&root)?;
	tracing::debug!(root = %root.display(), ?settings, "loaded settings");
	Ok(settings)
}

fn run_job_list(
	args: &ParamgenCli,
	jobs_path: &Path,
	format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
	let settings = load_settings(args)?;

	if !jobs_path.is_file() {
		return Err(ParamgenError::MissingInput {
			kind: "job list",
			path: jobs_path.to_path_buf(),
		}
		.into());
	}

	let content = std::fs::read_to_string(jobs_path)?;
	let jobs = parse_job_list(&content, &settings)?;
	if jobs.is_empty() {
		println!("No jobs found in {}", jobs_path.display());
		return Ok(true);
	}

	let report = run_jobs(&jobs, &settings, &CommandRegistry::with_builtins())?;
	print_report(&report, format)?;

	Ok(report.is_ok())
}

fn run_generate(
	args: &ParamgenCli,
	config: &Path,
	template: &Path,
	output: Option<&Path>,
	format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
	let settings = load_settings(args)?;
	let output_dir = match output {
		Some(dir) => dir.to_path_buf(),
		None => default_output_dir(&settings, 1)?,
	};

	let job = JobSpec {
		config: config.to_path_buf(),
		template: template.to_path_buf(),
		output_dir,
	};

	let report = run_jobs(&[job], &settings, &CommandRegistry::with_builtins())?;
	print_report(&report, format)?;

	Ok(report.is_ok())
}

#[derive(Serialize)]
struct FailureSummary<'a> {
	job: &'a JobSpec,
	error: String,
}

#[derive(Serialize)]
struct RunSummary<'a> {
	completed: &'a [JobReport],
	failed: Vec<FailureSummary<'a>>,
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	match format {
		OutputFormat::Json => {
			let summary = RunSummary {
				completed: &report.completed,
				failed: report
					.failed
					.iter()
					.map(|failure| {
						FailureSummary {
							job: &failure.job,
							error: failure.error.to_string(),
						}
					})
					.collect(),
			};
			println!("{}", serde_json::to_string_pretty(&summary)?);
		}
		OutputFormat::Text => print_text_report(report),
	}

	Ok(())
}

fn print_text_report(report: &RunReport) {
	for job_report in &report.completed {
		print_job_report(job_report);
	}

	for failure in &report.failed {
		println!(
			"{} {}: {}",
			colored!("failed", red),
			failure.job.config.display(),
			failure.error
		);
	}

	let total_files: usize = report.completed.iter().map(|r| r.files.len()).sum();
	let jobs = report.completed.len() + report.failed.len();
	println!();
	println!(
		"{}",
		colored!(
			format!(
				"Generated {total_files} file(s) across {jobs} job(s), {} failed.",
				report.failed.len()
			),
			bold
		)
	);
}

fn print_job_report(job_report: &JobReport) {
	let job = &job_report.job;
	println!(
		"{} {} -> {} file(s) in {}",
		colored!("ok", green),
		job.config.display(),
		job_report.files.len(),
		job.output_dir.display()
	);

	if !job_report.commands.derived.is_empty() {
		println!(
			"  built by commands: {}",
			job_report.commands.derived.join(", ")
		);
	}

	if !job_report.resolution.unresolved.is_empty() {
		println!(
			"  {} unresolved references in: {}",
			colored!("warning:", yellow),
			job_report.resolution.unresolved.join(", ")
		);
	}

	if !job_report.empty_parameters.is_empty() {
		println!(
			"  {} no candidates for: {}",
			colored!("warning:", yellow),
			job_report.empty_parameters.join(", ")
		);
	}
}
