//! Configuration loading helpers for the `calltree` CLI.
//!
//! Flags owned by `calltree-config` are partitioned out of the argument list
//! so `ortho_config` only sees the flags it understands, while clap parses
//! the remaining command flags and symbols.

use std::ffi::{OsStr, OsString};

use calltree_config::Config;
use ortho_config::OrthoConfig;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the partitioned configuration arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Skip;
    }

    let (flag, has_inline_value) = match argument_text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (argument_text.as_ref(), false),
    };

    if super::CONFIG_CLI_FLAGS.contains(&flag) {
        return FlagAction::Include {
            needs_value: !has_inline_value,
        };
    }

    FlagAction::Skip
}

/// Arguments partitioned between the configuration loader and clap.
///
/// Both lists start with the program name.
#[derive(Debug, Default)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

/// Moves configuration flags (and their values) out of `args`.
///
/// Flags may appear anywhere before a literal `--`; everything after `--` is
/// left to clap untouched.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut split = ConfigArgumentSplit::default();
    let mut arguments = args.iter();
    let Some(program) = arguments.next() else {
        return split;
    };
    split.config_arguments.push(program.clone());
    split.command_arguments.push(program.clone());

    while let Some(argument) = arguments.next() {
        if argument == "--" {
            split.command_arguments.push(argument.clone());
            split.command_arguments.extend(arguments.cloned());
            break;
        }
        match process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                split.config_arguments.push(argument.clone());
                if needs_value && let Some(value) = arguments.next() {
                    split.config_arguments.push(value.clone());
                }
            }
            FlagAction::Skip => split.command_arguments.push(argument.clone()),
        }
    }

    split
}
