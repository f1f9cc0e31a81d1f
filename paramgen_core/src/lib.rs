//! `paramgen_core` is the core library for the `paramgen` file generator.
//! Given a template and a configuration of parameters, each with several
//! alternative values that may reference one another, it resolves every
//! reference, enumerates every combination of values and writes one file per
//! combination.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Configuration text
//!   → Parser (one value tree per `name=a1,a2;$b` line)
//!   → Command processor (runs %TAR%, %ZIP%, %FILE_IN% and binds derived variables)
//!   → Resolver (rewrites `$name` references to a fixed point)
//!   → Cleanup (drops command-derived variables)
//!   → Expander (flattens every parameter and builds the cross product)
//!   → Template engine (substitutes each assignment and writes file_gen_<N>)
//! ```
//!
//! ## Configuration Language
//!
//! ```text
//! # comments start with `#`
//! host=alpha,beta
//! path=/srv/;$host;/data,/logs
//! %TAR%:$bundle=input.txt,extra.txt
//! %FILE_IN%=shared.cfg
//! ```
//!
//! `,` separates mutually exclusive alternatives and `;` separates segments
//! that are concatenated in order, so `path` above expands to four values.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paramgen_core::CommandRegistry;
//! use paramgen_core::ParamgenConfig;
//! use paramgen_core::job::JobSpec;
//! use paramgen_core::job::run_job;
//!
//! let job = JobSpec {
//! 	config: "params.conf".into(),
//! 	template: "job.template".into(),
//! 	output_dir: "generated".into(),
//! };
//! let report = run_job(&job, &ParamgenConfig::default(), &CommandRegistry::with_builtins())?;
//! println!("{} file(s) written", report.files.len());
//! # Ok::<(), paramgen_core::ParamgenError>(())
//! ```

pub use commands::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use expander::*;
pub use job::*;
pub use parser::*;
pub use resolver::*;
pub use table::*;
pub use value::*;

pub mod commands;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod expander;
pub mod job;
pub(crate) mod lexer;
mod parser;
mod resolver;
mod table;
mod value;

#[cfg(test)]
mod __fixtures;
