//! crates/cli/src/commands.rs
//!
//! Execution of the `signature`, `delta` and `patch` commands.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use engine::Rebuilder;
use matching::wire::{DeltaWriter, read_delta_script};
use matching::{BlockIndex, Delta, ListenerError, MatchOptions, StreamError, StreamMatcher};
use signature::wire::{read_signature, write_signature};
use signature::{Signature, SignatureGenerator, SignatureOptions};
use tracing::info;

use crate::arguments::{Destination, Output};
use crate::error::CliError;

/// An open output: a created file or the caller's stdout handle.
enum Sink<'a> {
    File(BufWriter<File>),
    Stdout(&'a mut dyn Write),
}

impl<'a> Sink<'a> {
    fn open(output: &Output, stdout: &'a mut dyn Write) -> Result<Self, CliError> {
        match output {
            Output::Stdout => Ok(Self::Stdout(stdout)),
            Output::File(path) => File::create(path)
                .map(|file| Self::File(BufWriter::new(file)))
                .map_err(CliError::io("create", path)),
        }
    }
}

impl Write for Sink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.write(buf),
            Self::Stdout(stdout) => stdout.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(file) => file.flush(),
            Self::Stdout(stdout) => stdout.flush(),
        }
    }
}

impl Output {
    fn path(&self) -> &Path {
        match self {
            Self::Stdout => Path::new("<stdout>"),
            Self::File(path) => path,
        }
    }
}

#[cfg(feature = "parallel")]
fn generate(generator: &SignatureGenerator, file: File, path: &Path) -> Result<Signature, CliError> {
    use std::io::Read;

    let mut data = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut data)
        .map_err(CliError::io("read", path))?;
    Ok(generator.generate_auto(&data, 0)?)
}

#[cfg(not(feature = "parallel"))]
fn generate(generator: &SignatureGenerator, file: File, _path: &Path) -> Result<Signature, CliError> {
    Ok(generator.generate_reader(BufReader::new(file))?)
}

/// `rdelta signature BASIS OUTPUT`
pub(crate) fn signature(
    basis: &Path,
    output: &Output,
    options: &SignatureOptions,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let file = File::open(basis).map_err(CliError::io("open", basis))?;
    let basis_len = file.metadata().map_err(CliError::io("stat", basis))?.len();
    let generator = options.generator(basis_len)?;
    let signature = generate(&generator, file, basis)?;

    let mut sink = Sink::open(output, stdout)?;
    write_signature(&mut sink, &signature)
        .and_then(|()| sink.flush())
        .map_err(CliError::io("write", output.path()))?;

    info!(
        blocks = signature.blocks().len(),
        block_length = signature.block_length(),
        algorithm = %signature.spec().algorithm(),
        "signature of {} ({} bytes)",
        basis.display(),
        basis_len
    );
    Ok(())
}

/// `rdelta delta SIGNATURE TARGET OUTPUT`
pub(crate) fn delta(
    signature_path: &Path,
    target: &Path,
    output: &Output,
    options: MatchOptions,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let signature_file = File::open(signature_path).map_err(CliError::io("open", signature_path))?;
    let signature = read_signature(BufReader::new(signature_file)).map_err(|source| {
        CliError::SignatureFormat {
            path: signature_path.to_path_buf(),
            source,
        }
    })?;
    let index = BlockIndex::build(&signature);
    let target_file = File::open(target).map_err(CliError::io("open", target))?;

    let sink = Sink::open(output, stdout)?;
    let mut writer = DeltaWriter::new(sink).map_err(CliError::io("write", output.path()))?;
    let summary = {
        let mut matcher = StreamMatcher::with_options(&index, options)?;
        matcher.add_listener(|delta: &Delta| -> Result<(), ListenerError> {
            writer.write_delta(delta).map_err(ListenerError::from)
        });
        matcher
            .consume_reader(target_file)
            .map_err(|error| match error {
                StreamError::Io(source) => CliError::io("read", target)(source),
                other => other.into(),
            })?;
        matcher.finalize()?
    };
    writer
        .finish(summary.target_len)
        .map_err(CliError::io("write", output.path()))?;

    info!(
        deltas = summary.deltas,
        literal_bytes = summary.literal_bytes,
        copy_bytes = summary.copy_bytes,
        "delta of {} ({} bytes)",
        target.display(),
        summary.target_len
    );
    Ok(())
}

/// `rdelta patch BASIS DELTA OUTPUT` or `rdelta patch --inplace BASIS DELTA`
pub(crate) fn patch(
    basis: &Path,
    delta_path: &Path,
    destination: &Destination,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let delta_file = File::open(delta_path).map_err(CliError::io("open", delta_path))?;
    let decoded =
        read_delta_script(BufReader::new(delta_file)).map_err(|source| CliError::DeltaFormat {
            path: delta_path.to_path_buf(),
            source,
        })?;
    let deltas = decoded.script.deltas();

    let rebuilder = Rebuilder::new();
    let report = match destination {
        Destination::InPlace => rebuilder.rebuild_in_place(basis, deltas)?,
        Destination::Fresh(Output::File(path)) => rebuilder.rebuild_file(basis, deltas, path)?,
        Destination::Fresh(Output::Stdout) => {
            let basis_file = File::open(basis).map_err(CliError::io("open", basis))?;
            rebuilder.rebuild_to(basis_file, deltas, stdout)?
        }
    };

    info!(
        copied_bytes = report.copied_bytes,
        literal_bytes = report.literal_bytes,
        fallback_copies = report.fallback_copies,
        "patched {} ({} bytes)",
        basis.display(),
        report.target_len
    );
    Ok(())
}
