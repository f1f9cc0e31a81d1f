use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate one file per combination of parameter values.",
	long_about = "paramgen expands a configuration of parameters, each with several \
	              alternative values, into every combination and renders a template once \
	              per combination.\n\nValues may reference other parameters with `$name` and \
	              may be built by commands such as %TAR% or %ZIP% before expansion.\n\nQuick \
	              start:\n  paramgen generate --config params.conf --template job.tpl\n  \
	              paramgen run --jobs jobs.list"
)]
pub struct ParamgenCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Directory that holds the optional `paramgen.toml` settings file.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Run every job in a job list.
	///
	/// Each non-comment line of the job list is `config,template[,output]`.
	/// Jobs run one after another. A job whose files cannot be written is
	/// reported and skipped; any other error stops the run.
	Run {
		/// Path to the job list.
		#[arg(long)]
		jobs: PathBuf,

		/// Output format for the run summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Run a single job.
	///
	/// Reads the configuration, runs its commands, resolves references,
	/// expands every combination and renders the template once per
	/// combination into the output directory.
	Generate {
		/// Path to the parameter configuration.
		#[arg(long)]
		config: PathBuf,

		/// Path to the template file.
		#[arg(long)]
		template: PathBuf,

		/// Directory that receives the generated files. Defaults to a
		/// timestamped directory under the current directory.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Output format for the job summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each job report includes
	/// the generated files, derived variables and unresolved parameters.
	Json,
}
