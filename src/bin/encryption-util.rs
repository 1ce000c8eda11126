//! encryption-util CLI
//!
//! Encrypts a clear text, or decrypts a cipher text, with a password and
//! writes the result to a file. Exit status 0 means the file was written;
//! any other status means it was not, and a SEVERE line explains why.

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use encryption_util::cipher::SealedBoxCipher;
use encryption_util::file_ops::{self, Mode};
use encryption_util::logging::{self, Severity};
use encryption_util::password;

/// Exit status for every failure; the POSIX view of `exit(-1)`.
const FAILURE: u8 = 255;

/// Options are only recognized before MODE. Everything from MODE on is taken
/// verbatim, so a TEXT or PASSWORD of `--help`, `-v` or `--` is just data.
#[derive(Parser)]
#[command(name = "encryption-util")]
#[command(version)]
#[command(about = "Encrypt or decrypt a secret artifact with a password.", long_about = None)]
#[command(
    override_usage = "encryption-util [OPTIONS] <encrypt|decrypt> <TEXT> <PASSWORD> <OUTPUT_FILE>\n       encryption-util [OPTIONS] --password-stdin <encrypt|decrypt> <TEXT> <OUTPUT_FILE>"
)]
struct Cli {
    /// Read the password from stdin (or the terminal) instead of the argument list
    #[arg(long)]
    password_stdin: bool,

    /// Log more detail (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// MODE, TEXT, [PASSWORD,] OUTPUT_FILE
    #[arg(
        value_name = "ARGS",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

struct Invocation {
    mode: Mode,
    payload: String,
    password: Option<String>,
    output: PathBuf,
}

/// Splits the raw argument list after the options into its parts.
fn invocation(cli: Cli) -> Result<Invocation, clap::Error> {
    let expected = if cli.password_stdin { 3 } else { 4 };
    if cli.args.len() != expected {
        return Err(Cli::command().error(
            ErrorKind::WrongNumberOfValues,
            format!(
                "expected {} arguments after the options, got {}",
                expected,
                cli.args.len()
            ),
        ));
    }

    // The count is checked, so `next` never falls back to the default.
    let mut args = cli.args.into_iter();
    let mut next = || args.next().unwrap_or_default();

    let mode_arg = next();
    let mode = <Mode as ValueEnum>::from_str(&mode_arg, false).map_err(|_| {
        Cli::command().error(
            ErrorKind::InvalidValue,
            format!(
                "invalid mode '{}' [possible values: encrypt, decrypt]",
                mode_arg
            ),
        )
    })?;
    let payload = next();
    let password = if cli.password_stdin {
        None
    } else {
        Some(next())
    };
    let output = PathBuf::from(next());

    Ok(Invocation {
        mode,
        payload,
        password,
        output,
    })
}

fn main() -> ExitCode {
    let parsed = Cli::try_parse().and_then(|cli| {
        let verbose = cli.verbose;
        invocation(cli).map(|invocation| (verbose, invocation))
    });
    let (verbose, invocation) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            // Ignore write errors - stdout/stderr may already be closed, and
            // the exit status below still reports the outcome.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::setup_logger(verbose);

    let mut reader = password::select_reader(invocation.password);
    let result = file_ops::run(
        invocation.mode,
        &invocation.payload,
        &mut *reader,
        &invocation.output,
        &SealedBoxCipher::new(),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::trace(
                Severity::Severe,
                &file_ops::failure_message(invocation.mode, &e),
            );
            ExitCode::from(FAILURE)
        }
    }
}
