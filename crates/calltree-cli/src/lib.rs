//! Command-line runtime for the `calltree` tool.
//!
//! The runner partitions configuration flags from command flags, loads the
//! layered [`calltree_config::Config`], installs telemetry, opens the
//! configured tag index and renders the resulting caller forest. It is
//! exercised both from the binary entrypoint and from tests, where the
//! configuration loader and IO streams are substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use calltree_config::{Backend, Config};
use calltree_graph::{
    BlacklistFilter, BlacklistMode, BuildOptions, CscopeSource, DepthLimit, GlobalSource,
    PatternSyntax, Symbol, TagSource, TreeBuilder,
};
use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use tracing::{debug, info, warn};

mod cli;
mod config;
mod errors;
mod output;
mod telemetry;

pub use cli::OutputFormat;

use cli::Cli;
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;

const CLI_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::run");

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: This list must be kept in sync with the configuration fields
/// in `calltree-config` that are settable from the command line.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--backend",
    "--tag-path",
    "--log-filter",
    "--log-format",
];

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }

    fn report(&mut self, error: &AppError) {
        if let Err(write_error) = writeln!(self.stderr, "{error}") {
            warn!(target: CLI_TARGET, %write_error, %error, "failed to report error");
        }
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
    install_telemetry: bool,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self {
            io,
            loader,
            install_telemetry: false,
        }
    }

    const fn with_telemetry(mut self, install_telemetry: bool) -> Self {
        self.install_telemetry = install_telemetry;
        self
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let arguments: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&arguments);

        let cli = match Cli::try_parse_from(&split.command_arguments) {
            Ok(cli) => cli,
            Err(error) => return self.handle_usage(&error),
        };

        match self.execute(&cli, &split.config_arguments) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                self.io.report(&error);
                ExitCode::FAILURE
            }
        }
    }

    fn handle_usage(&mut self, error: &clap::Error) -> ExitCode {
        if matches!(
            error.kind(),
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
        ) {
            if let Err(write_error) = write!(self.io.stdout, "{}", error.render()) {
                warn!(target: CLI_TARGET, %write_error, "failed to write help");
                return ExitCode::FAILURE;
            }
            return ExitCode::SUCCESS;
        }
        if let Err(write_error) = write!(self.io.stderr, "{}", error.render()) {
            warn!(target: CLI_TARGET, %write_error, "failed to write usage error");
        }
        ExitCode::FAILURE
    }

    fn execute(&mut self, cli: &Cli, config_arguments: &[OsString]) -> Result<(), AppError> {
        let config = self.loader.load(config_arguments)?;
        if self.install_telemetry {
            let filter = if cli.verbose {
                telemetry::VERBOSE_FILTER
            } else {
                config.log_filter()
            };
            telemetry::initialise(filter, config.log_format())?;
        }

        let request = TreeRequest::resolve(cli, &config)?;
        let source = open_source(&config)?;
        info!(
            target: CLI_TARGET,
            backend = %source.kind(),
            roots = request.roots.len(),
            "building caller trees"
        );

        let mut builder = TreeBuilder::new(source)
            .with_blacklist(request.blacklist)
            .with_options(request.options);
        let forest = builder.build_forest(&request.roots)?;
        output::emit(&forest, cli.format, cli.output.as_deref(), self.io.stdout)?;
        Ok(())
    }
}

/// Tree inputs merged from command flags and configuration.
#[derive(Debug)]
struct TreeRequest {
    roots: Vec<Symbol>,
    blacklist: BlacklistFilter,
    options: BuildOptions,
}

impl TreeRequest {
    /// Validates symbols, depth and blacklist before any index is opened.
    fn resolve(cli: &Cli, config: &Config) -> Result<Self, AppError> {
        let roots = cli
            .symbols
            .iter()
            .map(|symbol| {
                if symbol.is_empty() || symbol.contains(char::is_whitespace) {
                    Err(AppError::InvalidSymbol(symbol.clone()))
                } else {
                    Ok(Symbol::new(symbol.as_str()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let max_depth = match cli.max_depth.or(config.max_depth()) {
            Some(requested) => DepthLimit::from_request(requested)?,
            None => DepthLimit::Unlimited,
        };

        let syntax = if cli.regex {
            PatternSyntax::Regex
        } else {
            PatternSyntax::Exact
        };
        let patterns = config.blacklist().iter().chain(&cli.blacklist);
        let blacklist = BlacklistFilter::new(patterns, syntax)?;

        let blacklist_mode = if cli.mark_blacklisted {
            BlacklistMode::Mark
        } else {
            BlacklistMode::Omit
        };
        let options = BuildOptions::default()
            .with_max_depth(max_depth)
            .with_show_position(cli.show_position)
            .with_blacklist_mode(blacklist_mode)
            .with_collapse_repeats(cli.collapse_repeats);
        debug!(target: CLI_TARGET, ?options, "resolved build options");

        Ok(Self {
            roots,
            blacklist,
            options,
        })
    }
}

fn open_source(config: &Config) -> Result<Box<dyn TagSource>, AppError> {
    let source: Box<dyn TagSource> = match config.backend() {
        Backend::Global => Box::new(GlobalSource::open(config.tag_path())?),
        Backend::Cscope => Box::new(CscopeSource::open(config.tag_path())?),
    };
    Ok(source)
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    CliRunner::new(&mut io, &OrthoConfigLoader)
        .with_telemetry(true)
        .run(args)
}

/// Runs the CLI with a custom configuration loader and no telemetry.
#[cfg(test)]
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}
