#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` implements the command-line front-end of the `rdelta` tool. It
//! exposes three commands that mirror the stages of an rsync transfer run
//! over files:
//!
//! - `rdelta signature BASIS SIGNATURE` writes the block signature of BASIS.
//! - `rdelta delta SIGNATURE TARGET DELTA` matches TARGET against the
//!   signature and writes the delta stream as matches are found.
//! - `rdelta patch BASIS DELTA OUTPUT` rebuilds the target from BASIS, or
//!   rewrites BASIS itself with `--inplace`.
//!
//! An output operand of `-` writes to standard output.
//!
//! # Design
//!
//! [`run`] accepts an iterator of arguments together with handles for
//! standard output and error, which keeps the binary a thin wrapper and lets
//! tests drive the whole surface in-process. A [`clap`] command definition
//! performs the parse; the help text is a static snapshot so its wording is
//! stable across `clap` releases.
//!
//! # Errors
//!
//! Failures are rendered as a single `rdelta: ... (code N)` line on stderr.
//! Exit statuses follow rsync's conventions: [`EXIT_SYNTAX`] for usage and
//! configuration errors, [`EXIT_FILE_IO`] for file I/O and
//! [`EXIT_STREAM_FORMAT`] for malformed signature or delta streams.
//!
//! # Examples
//!
//! ```
//! use cli::run;
//!
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = run(["rdelta", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(String::from_utf8(stdout).unwrap().starts_with("rdelta "));
//! ```

use std::ffi::OsString;
use std::io::Write;

mod arguments;
mod commands;
mod error;

pub use error::{CliError, EXIT_FILE_IO, EXIT_STREAM_FORMAT, EXIT_SYNTAX};

use arguments::{Invocation, ParsedArgs, parse_args};

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Deterministic help text describing the supported commands.
const HELP_TEXT: &str = concat!(
    "rdelta ",
    env!("CARGO_PKG_VERSION"),
    "\n",
    "rsync-style binary deltas between two versions of a file.\n",
    "\n",
    "Usage: rdelta [-v]... [--debug=FLAG[N]]... COMMAND [OPTIONS] OPERANDS\n",
    "\n",
    "Commands:\n",
    "  signature BASIS SIGNATURE       Write the block signature of BASIS.\n",
    "      -B, --block-size=SIZE       Block length (derived from BASIS when omitted).\n",
    "          --checksum=ALGORITHM    Strong checksum: md4 (default), md5, sha1, xxh64.\n",
    "          --sum-length=BYTES      Truncate strong checksums to BYTES.\n",
    "          --checksum-seed=NUM     Seed mixed into strong checksums (0 disables).\n",
    "  delta SIGNATURE TARGET DELTA    Write the delta turning the basis into TARGET.\n",
    "          --max-literal=BYTES     Longest literal run emitted as one record.\n",
    "  patch BASIS DELTA OUTPUT        Rebuild the target into OUTPUT.\n",
    "  patch --inplace BASIS DELTA     Rewrite BASIS so it holds the target.\n",
    "\n",
    "Options:\n",
    "  -h, --help           Show this help message and exit.\n",
    "  -V, --version        Output version information and exit.\n",
    "  -v, --verbose        Increase verbosity; may be repeated.\n",
    "      --debug=FLAG[N]  Raise one subsystem (genr, delta, send, recv, io).\n",
    "\n",
    "An output operand of '-' writes to standard output. RDELTA_LOG overrides\n",
    "the log filter derived from -v and --debug.\n",
);

/// Runs the CLI using the provided argument iterator and output handles.
///
/// The function returns the process exit code that should be used by the
/// caller. On success, `0` is returned.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let result = parse_args(arguments).and_then(|parsed| execute(parsed, stdout));
    match result {
        Ok(()) => 0,
        Err(error) => {
            let code = error.exit_code();
            let _ = writeln!(stderr, "rdelta: {error} (code {code})");
            code
        }
    }
}

fn execute<Out: Write>(parsed: ParsedArgs, stdout: &mut Out) -> Result<(), CliError> {
    let ParsedArgs {
        show_help,
        show_version,
        verbosity,
        command,
    } = parsed;

    if show_help {
        return write_stdout(stdout, HELP_TEXT);
    }
    if show_version {
        return write_stdout(stdout, concat!("rdelta ", env!("CARGO_PKG_VERSION"), "\n"));
    }
    let Some(command) = command else {
        return Err(CliError::Usage(
            "missing command (expected signature, delta or patch); see --help".to_owned(),
        ));
    };

    logging::init_tracing(verbosity);

    match command {
        Invocation::Signature {
            basis,
            output,
            options,
        } => commands::signature(&basis, &output, &options, stdout),
        Invocation::Delta {
            signature,
            target,
            output,
            options,
        } => commands::delta(&signature, &target, &output, options, stdout),
        Invocation::Patch {
            basis,
            delta,
            destination,
        } => commands::patch(&basis, &delta, &destination, stdout),
    }
}

fn write_stdout<Out: Write>(stdout: &mut Out, text: &str) -> Result<(), CliError> {
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(CliError::io("write", std::path::Path::new("<stdout>")))
}

/// Converts a numeric exit code into an [`std::process::ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    std::process::ExitCode::from(clamped as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_capture(args: &[&str]) -> (i32, String, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(
            std::iter::once("rdelta").chain(args.iter().copied()),
            &mut stdout,
            &mut stderr,
        );
        (
            code,
            String::from_utf8(stdout).expect("utf-8 stdout"),
            String::from_utf8(stderr).expect("utf-8 stderr"),
        )
    }

    #[test]
    fn help_lists_every_command() {
        let (code, stdout, stderr) = run_capture(&["--help"]);
        assert_eq!(code, 0);
        assert!(stderr.is_empty());
        for command in ["signature", "delta", "patch", "--inplace"] {
            assert!(stdout.contains(command), "{command}");
        }
    }

    #[test]
    fn missing_command_is_a_syntax_error() {
        let (code, stdout, stderr) = run_capture(&[]);
        assert_eq!(code, EXIT_SYNTAX);
        assert!(stdout.is_empty());
        assert!(stderr.starts_with("rdelta: missing command"), "{stderr}");
        assert!(stderr.trim_end().ends_with("(code 1)"), "{stderr}");
    }

    #[test]
    fn unknown_option_is_a_syntax_error() {
        let (code, _, stderr) = run_capture(&["delta", "--bogus", "a", "b", "c"]);
        assert_eq!(code, EXIT_SYNTAX);
        assert!(!stderr.is_empty());
    }

    #[test]
    fn missing_input_file_reports_file_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let absent = dir.path().join("absent");
        let out = dir.path().join("out.sig");
        let (code, _, stderr) = run_capture(&[
            "signature",
            absent.to_str().expect("utf-8 path"),
            out.to_str().expect("utf-8 path"),
        ]);
        assert_eq!(code, EXIT_FILE_IO);
        assert!(stderr.contains("failed to open"), "{stderr}");
        assert!(!out.exists());
    }
}
