//! Utility functions for the binaries.

use std::fs::{self, File};
use std::path::Path;
use std::io::{BufRead, BufReader, Read};

use flate2::read::MultiGzDecoder;

//-----------------------------------------------------------------------------

// Utilities for working with files.

const SIZE_UNITS: [(f64, &str); 6] = [
    (1.0, "B"),
    (1024.0, "KiB"),
    (1024.0 * 1024.0, "MiB"),
    (1024.0 * 1024.0 * 1024.0, "GiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0, "TiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0, "PiB"),
];

/// Returns a human-readable representation of the given number of bytes.
pub fn human_readable_size(bytes: usize) -> String {
    let mut unit = 0;
    let value = bytes as f64;
    while unit + 1 < SIZE_UNITS.len() && value >= SIZE_UNITS[unit + 1].0 {
        unit += 1;
    }
    format!("{:.3} {}", value / SIZE_UNITS[unit].0, SIZE_UNITS[unit].1)
}

/// Returns a human-readable size of the file.
pub fn file_size<P: AsRef<Path>>(filename: P) -> Option<String> {
    let metadata = fs::metadata(filename).ok()?;
    Some(human_readable_size(metadata.len() as usize))
}

/// Returns `true` if the file exists.
pub fn file_exists<P: AsRef<Path>>(filename: P) -> bool {
    fs::metadata(filename).is_ok()
}

/// Returns `true` if the file appears to be gzip-compressed.
pub fn is_gzipped<P: AsRef<Path>>(filename: P) -> bool {
    let Ok(file) = File::open(filename) else {
        return false;
    };
    let mut reader = BufReader::new(file);
    let mut magic = [0; 2];
    let len = reader.read(&mut magic).ok();
    len == Some(2) && magic == [0x1F, 0x8B]
}

/// Returns a buffered reader for the file, which may be gzip-compressed.
pub fn open_file<P: AsRef<Path>>(filename: P) -> Result<Box<dyn BufRead>, String> {
    let file = File::open(&filename).map_err(|x| x.to_string())?;
    let inner = BufReader::new(file);
    if is_gzipped(&filename) {
        let inner = MultiGzDecoder::new(inner);
        Ok(Box::new(BufReader::new(inner)))
    } else {
        Ok(Box::new(inner))
    }
}

//-----------------------------------------------------------------------------

// Reading sequences.

/// Reads DNA sequences from the reader.
///
/// The input is FASTA if the first non-empty line starts with `>`.
/// Otherwise each non-empty line is a separate sequence.
/// Trailing whitespace is removed from each line.
/// Sequences are returned as they are; bases outside `ACGT` are handled by the consumer.
pub fn read_sequences<R: BufRead>(reader: R) -> Result<Vec<Vec<u8>>, String> {
    let mut result: Vec<Vec<u8>> = Vec::new();
    let mut fasta: Option<bool> = None;
    let mut current: Option<Vec<u8>> = None;

    for (line_num, line) in reader.split(b'\n').enumerate() {
        let line = line.map_err(|x| format!("Failed to read line {}: {}", line_num + 1, x))?;
        let line = line.trim_ascii_end();
        if line.is_empty() {
            continue;
        }
        let is_fasta = *fasta.get_or_insert(line[0] == b'>');
        if !is_fasta {
            result.push(line.to_vec());
            continue;
        }
        if line[0] == b'>' {
            if let Some(sequence) = current.take() {
                result.push(sequence);
            }
            current = Some(Vec::new());
        } else if let Some(sequence) = current.as_mut() {
            sequence.extend_from_slice(line);
        }
    }
    if let Some(sequence) = current {
        result.push(sequence);
    }

    Ok(result)
}

/// Reads DNA sequences from the file, which may be gzip-compressed.
///
/// See [`read_sequences`] for the supported formats.
pub fn read_sequence_file<P: AsRef<Path>>(filename: P) -> Result<Vec<Vec<u8>>, String> {
    let reader = open_file(&filename)?;
    read_sequences(reader).map_err(|x| format!("{}: {}", filename.as_ref().display(), x))
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
