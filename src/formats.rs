//! Support for the binary file formats used by the persistent structures.
//!
//! Each persistent structure is stored as a family of files sharing a base name.
//! A structure with base name `base` and suffix `-supergraph` uses files such as `base-supergraph.header`.
//!
//! ### Scalars and headers
//!
//! Headers and scalar values are stored as raw little-endian [`u64`] words without any framing.
//! The first header word is always the format version.
//! See [`write_words`], [`read_words`], and [`check_version`].
//!
//! ### Arrays
//!
//! Arrays are stored using [`simple_sds::serialize`], which prefixes the elements with their count.
//! See [`write_array`] and [`read_array`].
//!
//! ### Errors
//!
//! All functions report failures as [`FormatError`].
//! A missing file is always reported as [`FormatError::MissingFile`] and a version mismatch as [`FormatError::VersionMismatch`].

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use simple_sds::serialize::{self, Serialize};


//-----------------------------------------------------------------------------

/// An error encountered while reading or writing a persistent structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// The file does not exist or cannot be opened.
    MissingFile {
        /// Name of the file.
        filename: String,
    },
    /// The version stored in the header does not match the supported version.
    VersionMismatch {
        /// Name of the header file.
        filename: String,
        /// Supported version.
        expected: u64,
        /// Version found in the file.
        found: u64,
    },
    /// The file exists but its contents are inconsistent.
    Invalid {
        /// Name of the file.
        filename: String,
        /// Description of the problem.
        message: String,
    },
    /// Any other I/O error.
    Io {
        /// Name of the file.
        filename: String,
        /// Error message from the underlying I/O operation.
        message: String,
    },
}

impl FormatError {
    /// Creates an error for inconsistent file contents.
    pub fn invalid<P: AsRef<Path>>(filename: P, message: &str) -> Self {
        FormatError::Invalid { filename: display_name(filename), message: message.to_string() }
    }

    // Converts an I/O error for the given file.
    fn from_io<P: AsRef<Path>>(filename: P, error: io::Error) -> Self {
        let filename = display_name(filename);
        match error.kind() {
            ErrorKind::NotFound => FormatError::MissingFile { filename },
            _ => FormatError::Io { filename, message: error.to_string() },
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MissingFile { filename } => write!(f, "File {} not found", filename),
            FormatError::VersionMismatch { filename, expected, found } => {
                write!(f, "Version mismatch in {}: expected {}, found {}", filename, expected, found)
            },
            FormatError::Invalid { filename, message } => write!(f, "Invalid file {}: {}", filename, message),
            FormatError::Io { filename, message } => write!(f, "I/O error with {}: {}", filename, message),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<FormatError> for String {
    fn from(error: FormatError) -> Self {
        error.to_string()
    }
}

fn display_name<P: AsRef<Path>>(filename: P) -> String {
    filename.as_ref().display().to_string()
}

//-----------------------------------------------------------------------------

/// Returns the name of a component file: `base` + `suffix` + `.` + `component`.
pub fn component_name(base: &str, suffix: &str, component: &str) -> String {
    format!("{}{}.{}", base, suffix, component)
}

/// Writes the words as raw little-endian [`u64`] values.
pub fn write_words<P: AsRef<Path>>(filename: P, words: &[u64]) -> Result<(), FormatError> {
    let file = File::create(&filename).map_err(|x| FormatError::from_io(&filename, x))?;
    let mut writer = BufWriter::new(file);
    for word in words {
        writer.write_all(&word.to_le_bytes()).map_err(|x| FormatError::from_io(&filename, x))?;
    }
    writer.flush().map_err(|x| FormatError::from_io(&filename, x))?;
    Ok(())
}

/// Reads exactly `len` raw little-endian [`u64`] values from the start of the file.
pub fn read_words<P: AsRef<Path>>(filename: P, len: usize) -> Result<Vec<u64>, FormatError> {
    let file = File::open(&filename).map_err(|x| FormatError::from_io(&filename, x))?;
    let mut reader = BufReader::new(file);
    let mut result = Vec::with_capacity(len);
    let mut buf = [0u8; 8];
    for _ in 0..len {
        reader.read_exact(&mut buf).map_err(|x| {
            if x.kind() == ErrorKind::UnexpectedEof {
                FormatError::invalid(&filename, "File is too short")
            } else {
                FormatError::from_io(&filename, x)
            }
        })?;
        result.push(u64::from_le_bytes(buf));
    }
    Ok(result)
}

/// Writes a single raw [`u64`] value.
pub fn write_scalar<P: AsRef<Path>>(filename: P, value: u64) -> Result<(), FormatError> {
    write_words(filename, &[value])
}

/// Reads a single raw [`u64`] value.
pub fn read_scalar<P: AsRef<Path>>(filename: P) -> Result<u64, FormatError> {
    let words = read_words(filename, 1)?;
    Ok(words[0])
}

/// Reads a header of `len` words and checks that the first word is the expected version.
///
/// Returns the full header on success.
pub fn read_header<P: AsRef<Path>>(filename: P, expected_version: u64, len: usize) -> Result<Vec<u64>, FormatError> {
    let header = read_words(&filename, len.max(1))?;
    check_version(&filename, expected_version, header[0])?;
    Ok(header)
}

/// Returns an error if the versions differ.
pub fn check_version<P: AsRef<Path>>(filename: P, expected: u64, found: u64) -> Result<(), FormatError> {
    if expected != found {
        return Err(FormatError::VersionMismatch { filename: display_name(filename), expected, found });
    }
    Ok(())
}

/// Serializes the array to the file using [`simple_sds::serialize`].
pub fn write_array<T: Serialize, P: AsRef<Path>>(filename: P, array: &T) -> Result<(), FormatError> {
    serialize::serialize_to(array, &filename).map_err(|x| FormatError::from_io(&filename, x))
}

/// Loads an array serialized with [`write_array`].
pub fn read_array<T: Serialize, P: AsRef<Path>>(filename: P) -> Result<T, FormatError> {
    serialize::load_from(&filename).map_err(|x| FormatError::from_io(&filename, x))
}

//-----------------------------------------------------------------------------
