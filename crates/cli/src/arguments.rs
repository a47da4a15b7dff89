//! crates/cli/src/arguments.rs
//!
//! Command-line grammar and its translation into typed invocations.

use std::ffi::OsString;
use std::num::{NonZeroU8, NonZeroUsize};
use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use logging::VerbosityConfig;
use matching::MatchOptions;
use signature::{SignatureAlgorithm, SignatureOptions};

use crate::error::CliError;

/// Operand meaning "standard output" for output paths.
pub(crate) const STDOUT_OPERAND: &str = "-";

/// Parsed command line.
#[derive(Debug)]
pub(crate) struct ParsedArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) verbosity: VerbosityConfig,
    pub(crate) command: Option<Invocation>,
}

/// One of the three operations the tool performs.
#[derive(Debug)]
pub(crate) enum Invocation {
    Signature {
        basis: PathBuf,
        output: Output,
        options: SignatureOptions,
    },
    Delta {
        signature: PathBuf,
        target: PathBuf,
        output: Output,
        options: MatchOptions,
    },
    Patch {
        basis: PathBuf,
        delta: PathBuf,
        destination: Destination,
    },
}

/// Where a command writes its product.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    fn from_operand(operand: PathBuf) -> Self {
        if operand.as_os_str() == STDOUT_OPERAND {
            Self::Stdout
        } else {
            Self::File(operand)
        }
    }
}

/// Where `patch` writes the reconstructed file.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Destination {
    InPlace,
    Fresh(Output),
}

fn flag(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(long)
        .help(help)
        .action(ArgAction::SetTrue)
}

fn operand(name: &'static str) -> Arg {
    Arg::new(name)
        .value_parser(value_parser!(PathBuf))
        .required(false)
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new("rdelta")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .disable_help_subcommand(true)
        .arg(
            flag("help", "help", "Show this help message and exit.")
                .short('h')
                .global(true),
        )
        .arg(flag("version", "version", "Output version information and exit.").short('V'))
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase verbosity; may be repeated.")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .value_name("FLAG[N]")
                .help("Raise the debug level of one subsystem.")
                .action(ArgAction::Append)
                .global(true),
        )
        .subcommand(
            Command::new("signature")
                .disable_help_flag(true)
                .arg(
                    Arg::new("block-size")
                        .long("block-size")
                        .short('B')
                        .value_name("SIZE")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("checksum")
                        .long("checksum")
                        .value_name("ALGORITHM"),
                )
                .arg(
                    Arg::new("sum-length")
                        .long("sum-length")
                        .value_name("BYTES")
                        .value_parser(value_parser!(u8)),
                )
                .arg(
                    Arg::new("checksum-seed")
                        .long("checksum-seed")
                        .value_name("NUM")
                        .value_parser(value_parser!(u32)),
                )
                .arg(operand("basis"))
                .arg(operand("output")),
        )
        .subcommand(
            Command::new("delta")
                .disable_help_flag(true)
                .arg(
                    Arg::new("max-literal")
                        .long("max-literal")
                        .value_name("BYTES")
                        .value_parser(value_parser!(u32)),
                )
                .arg(operand("signature"))
                .arg(operand("target"))
                .arg(operand("output")),
        )
        .subcommand(
            Command::new("patch")
                .disable_help_flag(true)
                .arg(flag(
                    "inplace",
                    "inplace",
                    "Rewrite BASIS instead of writing OUTPUT.",
                ))
                .arg(operand("basis"))
                .arg(operand("delta"))
                .arg(operand("output")),
        )
}

/// Parses `arguments`, the first of which is the program name.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from("rdelta"));
    }

    let matches = clap_command()
        .try_get_matches_from(args)
        .map_err(|error| CliError::Usage(error.to_string().trim_end().to_owned()))?;

    // Global arguments are propagated into the selected subcommand.
    let scoped = matches
        .subcommand()
        .map_or(&matches, |(_, sub_matches)| sub_matches);

    let mut verbosity = VerbosityConfig::from_verbose_level(scoped.get_count("verbose"));
    if let Some(tokens) = scoped.get_many::<String>("debug") {
        for token in tokens {
            verbosity
                .apply_debug_flag(token)
                .map_err(|message| CliError::Usage(format!("--debug={token}: {message}")))?;
        }
    }

    let show_help = scoped.get_flag("help");
    let show_version = matches.get_flag("version");
    let command = if show_help || show_version {
        None
    } else {
        match matches.subcommand() {
            Some(("signature", sub)) => Some(signature_invocation(sub)?),
            Some(("delta", sub)) => Some(delta_invocation(sub)?),
            Some(("patch", sub)) => Some(patch_invocation(sub)?),
            _ => None,
        }
    };

    Ok(ParsedArgs {
        show_help,
        show_version,
        verbosity,
        command,
    })
}

fn required_operand(
    matches: &ArgMatches,
    name: &'static str,
    command: &str,
) -> Result<PathBuf, CliError> {
    matches.get_one::<PathBuf>(name).cloned().ok_or_else(|| {
        CliError::Usage(format!(
            "missing {} operand for '{command}'",
            name.to_ascii_uppercase()
        ))
    })
}

fn signature_invocation(matches: &ArgMatches) -> Result<Invocation, CliError> {
    let basis = required_operand(matches, "basis", "signature")?;
    let output = Output::from_operand(required_operand(matches, "output", "signature")?);

    let algorithm = match matches.get_one::<String>("checksum") {
        Some(name) => name.parse::<SignatureAlgorithm>()?,
        None => SignatureAlgorithm::default(),
    };

    // A zero seed means "no seed", as with rsync's --checksum-seed.
    let seed = matches
        .get_one::<u32>("checksum-seed")
        .copied()
        .filter(|&seed| seed != 0);
    let (algorithm, seed_bytes) = match (algorithm, seed) {
        (SignatureAlgorithm::Xxh64 { .. }, Some(seed)) => {
            (algorithm.with_seed(u64::from(seed)), Vec::new())
        }
        (_, Some(seed)) => (algorithm, seed.to_le_bytes().to_vec()),
        (_, None) => (algorithm, Vec::new()),
    };

    let strong_len = match matches.get_one::<u8>("sum-length") {
        Some(&len) => Some(NonZeroU8::new(len).ok_or_else(|| {
            CliError::Usage("--sum-length must be at least 1".to_owned())
        })?),
        None => None,
    };

    let options = SignatureOptions::new()
        .with_block_length(matches.get_one::<u32>("block-size").copied())
        .with_algorithm(algorithm)
        .with_strong_len(strong_len)
        .with_checksum_seed(seed_bytes);

    Ok(Invocation::Signature {
        basis,
        output,
        options,
    })
}

fn delta_invocation(matches: &ArgMatches) -> Result<Invocation, CliError> {
    let signature = required_operand(matches, "signature", "delta")?;
    let target = required_operand(matches, "target", "delta")?;
    let output = Output::from_operand(required_operand(matches, "output", "delta")?);

    let mut options = MatchOptions::new();
    if let Some(&max_literal) = matches.get_one::<u32>("max-literal") {
        let max_literal = NonZeroUsize::new(max_literal as usize)
            .ok_or_else(|| CliError::Usage("--max-literal must be at least 1".to_owned()))?;
        options = options.with_max_literal(max_literal);
    }

    Ok(Invocation::Delta {
        signature,
        target,
        output,
        options,
    })
}

fn patch_invocation(matches: &ArgMatches) -> Result<Invocation, CliError> {
    let basis = required_operand(matches, "basis", "patch")?;
    let delta = required_operand(matches, "delta", "patch")?;
    let output = matches.get_one::<PathBuf>("output").cloned();

    let destination = match (matches.get_flag("inplace"), output) {
        (true, None) => Destination::InPlace,
        (true, Some(_)) => {
            return Err(CliError::Usage(
                "--inplace rewrites BASIS and takes no OUTPUT operand".to_owned(),
            ));
        }
        (false, Some(output)) => Destination::Fresh(Output::from_operand(output)),
        (false, None) => {
            return Err(CliError::Usage(
                "missing OUTPUT operand for 'patch' (or pass --inplace)".to_owned(),
            ));
        }
    };

    Ok(Invocation::Patch {
        basis,
        delta,
        destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ParsedArgs, CliError> {
        parse_args(std::iter::once("rdelta").chain(args.iter().copied()))
    }

    #[test]
    fn signature_options_reach_the_builder() {
        let parsed = parse(&[
            "signature",
            "--block-size=1024",
            "--checksum=md5",
            "--sum-length",
            "8",
            "basis",
            "basis.sig",
        ])
        .expect("parse");
        let Some(Invocation::Signature {
            basis,
            output,
            options,
        }) = parsed.command
        else {
            panic!("expected signature invocation");
        };
        assert_eq!(basis, PathBuf::from("basis"));
        assert_eq!(output, Output::File(PathBuf::from("basis.sig")));
        assert_eq!(options.algorithm(), SignatureAlgorithm::Md5);
        let spec = options.checksum_spec().expect("spec");
        assert_eq!(spec.strong_len().get(), 8);
        assert_eq!(
            options.generator(10).expect("generator").block_length().get(),
            1024
        );
    }

    #[test]
    fn checksum_seed_seeds_xxh64_directly() {
        let parsed = parse(&[
            "signature",
            "--checksum=xxh64",
            "--checksum-seed=7",
            "basis",
            "-",
        ])
        .expect("parse");
        let Some(Invocation::Signature {
            output, options, ..
        }) = parsed.command
        else {
            panic!("expected signature invocation");
        };
        assert_eq!(output, Output::Stdout);
        assert_eq!(options.algorithm(), SignatureAlgorithm::Xxh64 { seed: 7 });
        assert!(options.checksum_spec().expect("spec").seed().is_empty());
    }

    #[test]
    fn checksum_seed_is_mixed_into_digest_algorithms() {
        let parsed = parse(&["signature", "--checksum-seed=258", "b", "s"]).expect("parse");
        let Some(Invocation::Signature { options, .. }) = parsed.command else {
            panic!("expected signature invocation");
        };
        assert_eq!(
            options.checksum_spec().expect("spec").seed(),
            &[2, 1, 0, 0]
        );
    }

    #[test]
    fn unknown_checksum_is_a_configuration_error() {
        let err = parse(&["signature", "--checksum=crc32", "b", "s"]).expect_err("unknown");
        assert!(matches!(err, CliError::Algorithm(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn verbosity_is_accepted_on_either_side_of_the_command() {
        let parsed = parse(&["-vv", "delta", "s", "t", "d"]).expect("parse");
        assert_eq!(parsed.verbosity.verbose, 2);
        let parsed = parse(&["delta", "-v", "s", "t", "d"]).expect("parse");
        assert_eq!(parsed.verbosity.verbose, 1);
        let parsed = parse(&["delta", "--debug=io2", "s", "t", "d"]).expect("parse");
        assert_eq!(parsed.verbosity.debug.io, 2);
    }

    #[test]
    fn delta_max_literal_must_be_positive() {
        let err = parse(&["delta", "--max-literal=0", "s", "t", "d"]).expect_err("zero");
        assert!(matches!(err, CliError::Usage(_)));
        let parsed = parse(&["delta", "--max-literal=64", "s", "t", "d"]).expect("parse");
        let Some(Invocation::Delta { options, .. }) = parsed.command else {
            panic!("expected delta invocation");
        };
        assert_eq!(options.max_literal().get(), 64);
    }

    #[test]
    fn patch_destination_depends_on_inplace() {
        let parsed = parse(&["patch", "--inplace", "basis", "d"]).expect("parse");
        assert!(matches!(
            parsed.command,
            Some(Invocation::Patch {
                destination: Destination::InPlace,
                ..
            })
        ));
        assert!(parse(&["patch", "--inplace", "basis", "d", "out"]).is_err());
        assert!(parse(&["patch", "basis", "d"]).is_err());
    }

    #[test]
    fn missing_operands_are_reported_by_name() {
        let err = parse(&["delta", "sig"]).expect_err("missing target");
        assert!(err.to_string().contains("TARGET"), "{err}");
    }

    #[test]
    fn help_suppresses_operand_checks() {
        let parsed = parse(&["patch", "--help"]).expect("parse");
        assert!(parsed.show_help);
        assert!(parsed.command.is_none());
    }
}
