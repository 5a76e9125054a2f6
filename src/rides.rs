//! Bus ridership loader.
//!
//! Reads a comma-separated file whose first line is a header and turns every
//! following row into a [`Ride`]. Columns are positional:
//! `route,date,daytype,rides`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::debug;

use crate::error::{FieldError, LoadError};
use crate::policy::{ErrorPolicy, Loaded};

const RIDE_FIELDS: usize = 4;

/// One row of the ridership file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ride {
    pub route: String,
    pub date: String,
    pub daytype: String,
    pub rides: u32,
}

impl Ride {
    /// Builds a ride from raw column text. Only `rides` is converted; the
    /// other fields are kept exactly as given.
    pub fn from_fields(
        route: &str,
        date: &str,
        daytype: &str,
        rides: &str,
    ) -> Result<Self, FieldError> {
        let count = rides
            .trim()
            .parse::<u32>()
            .map_err(|source| FieldError::InvalidInteger {
                field: "rides",
                value: rides.to_string(),
                source,
            })?;

        Ok(Ride {
            route: route.to_string(),
            date: date.to_string(),
            daytype: daytype.to_string(),
            rides: count,
        })
    }
}

/// Maps a CSV row onto a [`Ride`]. Columns past the fourth are ignored.
pub fn parse_ride(record: &StringRecord) -> Result<Ride, FieldError> {
    if record.len() < RIDE_FIELDS {
        return Err(FieldError::MissingFields {
            expected: RIDE_FIELDS,
            found: record.len(),
        });
    }
    Ride::from_fields(&record[0], &record[1], &record[2], &record[3])
}

/// Loads every ride in `path`, failing on the first malformed row.
pub fn load_rides<P: AsRef<Path>>(path: P) -> Result<Vec<Ride>, LoadError> {
    load_rides_with_policy(path, ErrorPolicy::Fatal).map(|loaded| loaded.records)
}

/// Loads every ride in `path`, treating malformed rows according to `policy`.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), ?policy))]
pub fn load_rides_with_policy<P: AsRef<Path>>(
    path: P,
    policy: ErrorPolicy,
) -> Result<Loaded<Ride>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let loaded = read_rides(file, policy)?;
    debug!(
        records = loaded.records.len(),
        skipped = loaded.skipped.len(),
        "Ridership file loaded"
    );
    Ok(loaded)
}

/// Reads rides from any reader.
///
/// Whatever sits on the first physical line is the header and is discarded
/// without inspection. If that line is blank, the next line is data. Blank
/// lines elsewhere are ignored. A row that is not valid UTF-8 is malformed and
/// handled by `policy`; read errors are always fatal.
pub fn read_rides<R: Read>(reader: R, policy: ErrorPolicy) -> Result<Loaded<Ride>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut loaded = Loaded::default();

    for result in rdr.byte_records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if line == 1 {
            continue;
        }

        let parsed = match StringRecord::from_byte_record(record) {
            Ok(fields) => {
                parse_ride(&fields).map_err(|err| (err, render_row(fields.as_byte_record())))
            }
            Err(e) => {
                let err = FieldError::InvalidEncoding {
                    valid_up_to: e.utf8_error().valid_up_to(),
                };
                Err((err, render_row(&e.into_byte_record())))
            }
        };

        match parsed {
            Ok(ride) => loaded.records.push(ride),
            Err((err, raw)) => policy.handle(line, &raw, err, &mut loaded.skipped)?,
        }
    }

    Ok(loaded)
}

/// Renders a row back to CSV text, quoting fields where needed. Undecodable
/// bytes are replaced with U+FFFD.
fn render_row(record: &ByteRecord) -> String {
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let bytes = match wtr.write_byte_record(record) {
        Ok(()) => wtr.into_inner().unwrap_or_default(),
        Err(_) => Vec::new(),
    };
    String::from_utf8_lossy(&bytes).trim_end_matches('\n').to_string()
}
