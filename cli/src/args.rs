use std::ffi::OsString;
use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use dbextract_core::config::{parse_positive, ExtractConfig, Overrides, DEFAULT_OUTPUT_FILE};
use dbextract_core::ExtractError;

#[derive(Parser, Debug)]
#[command(
    name = "dbextract",
    about = "Extract key/value data from a damaged or detached database file",
    args_override_self = true
)]
pub struct Args {
    /// Path to file or block device where part or all of the database exists.
    #[arg(
        short = 'f',
        long = "file",
        value_name = "PATH",
        value_parser = OsStringValueParser::new().map(PathBuf::from)
    )]
    pub file: Option<PathBuf>,

    /// File to log to. If not provided, messages are printed to stderr.
    #[arg(short = 'l', long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// File to which to output text memcached protocol messages.
    /// This file must not already exist.
    #[arg(
        short = 'o',
        long = "output-file",
        value_name = "PATH",
        default_value = DEFAULT_OUTPUT_FILE
    )]
    pub output_file: PathBuf,

    /// Specifies block size, overriding file headers.
    #[arg(long, value_name = "N", allow_hyphen_values = true, value_parser = block_size)]
    pub force_block_size: Option<NonZeroU32>,

    /// Specifies extent size, overriding file headers.
    #[arg(long, value_name = "N", allow_hyphen_values = true, value_parser = extent_size)]
    pub force_extent_size: Option<NonZeroU32>,

    /// Specifies number of slices in *this* file, overriding file headers.
    #[arg(long, value_name = "N", allow_hyphen_values = true, value_parser = mod_count)]
    pub force_mod_count: Option<NonZeroU32>,

    /// Stray positional arguments, rejected after parsing.
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

fn block_size(raw: &str) -> Result<NonZeroU32, String> {
    parse_positive(raw, "Block size")
}

fn extent_size(raw: &str) -> Result<NonZeroU32, String> {
    parse_positive(raw, "Extent size")
}

fn mod_count(raw: &str) -> Result<NonZeroU32, String> {
    parse_positive(raw, "The mod count")
}

impl Args {
    pub fn into_config(self) -> Result<ExtractConfig, ExtractError> {
        if let Some(extra) = self.extra.first() {
            return Err(ExtractError::Usage(format!(
                "Unexpected extra argument: \"{extra}\"\n\n{}",
                Args::command().render_usage()
            )));
        }

        let overrides = Overrides {
            block_size: self.force_block_size,
            extent_size: self.force_extent_size,
            mod_count: self.force_mod_count,
        };

        ExtractConfig::try_new(
            self.file.unwrap_or_default(),
            self.log_file,
            Some(self.output_file),
            overrides,
        )
    }
}

fn classify(err: clap::Error) -> ExtractError {
    let rendered = err.render().to_string();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            ExtractError::Help(rendered)
        }
        ErrorKind::ValueValidation => ExtractError::Validation(rendered),
        _ => ExtractError::Usage(rendered),
    }
}

/// Parse the full argv (program name first) into a validated config.
pub fn parse_args<I, T>(tokens: I) -> Result<ExtractConfig, ExtractError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(tokens)
        .map_err(classify)?
        .into_config()
}
