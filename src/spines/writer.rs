//! # Hedgehog and track exports
//!
//! Writers for the two files a tracking session leaves behind:
//!
//! - the **hedgehog dump**, every spine of one recording in the full schema, which can be
//!   loaded back with [`SpineCsvFormat::full`](crate::spines::csv_reader::SpineCsvFormat::full);
//! - the **track listing**, a tab-separated file accumulating the tracks of a session,
//!   one block per track.
//!
//! The analysis never writes anything by itself: these are called by the tools driving it.
//!
//! ## Track listing layout
//!
//! ```text
//! # Hedgehog cell track listing for <session>
//! # TIME	X	Y	Z	TRACK_ID	PARENT_TRACK_ID	SPOT	LABEL
//!
//!
//! # START OF TRACK 1, child of 0
//! 12	104.2	88.0	31.5	1	0	0	0
//! 11	104.9	87.1	31.5	1	0	0	0
//! ```
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
};

use camino::Utf8Path;
use csv::WriterBuilder;
use serde::Serialize;

use crate::{
    analysis::track::Track,
    constants::{Quat, Timepoint, Vec3, FULL_SEPARATOR, HEDGEHOG_HEADER},
    hedgehog_errors::HedgehogError,
    spines::Spine,
};

fn format_vector(v: &Vec3) -> String {
    format!("({} {} {})", v.x, v.y, v.z)
}

fn format_quaternion(q: &Quat) -> String {
    format!("({} {} {} {})", q.coords.x, q.coords.y, q.coords.z, q.coords.w)
}

/// Write `spines` in the full schema, header included.
///
/// Arguments
/// -----------------
/// * `writer`: destination of the dump.
/// * `spines`: the spines to write, in order.
///
/// Return
/// ----------
/// * `Ok(())`, or the first I/O or CSV error met.
pub fn write_hedgehog_csv<W: Write>(mut writer: W, spines: &[Spine]) -> Result<(), HedgehogError> {
    writeln!(writer, "{HEDGEHOG_HEADER}")?;

    let mut csv_writer = WriterBuilder::new()
        .delimiter(FULL_SEPARATOR)
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    for spine in spines {
        let mut record = vec![
            spine.timepoint.to_string(),
            format_vector(&spine.origin),
            format_vector(&spine.direction),
            format_vector(&spine.local_entry),
            format_vector(&spine.local_exit),
            format_vector(&spine.local_direction),
            format_vector(&spine.head_position),
            format_quaternion(&spine.head_orientation),
            format_vector(&spine.position),
            spine.confidence.to_string(),
        ];
        record.extend(spine.samples().iter().map(|s| s.to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Dump `spines` to a new file at `path`, replacing any existing one.
pub fn dump_hedgehog(path: &Utf8Path, spines: &[Spine]) -> Result<(), HedgehogError> {
    let file = File::create(path)?;
    write_hedgehog_csv(BufWriter::new(file), spines)
}

#[derive(Debug, Serialize)]
struct TrackListingRow {
    timepoint: Timepoint,
    x: f32,
    y: f32,
    z: f32,
    track_id: u32,
    parent_id: u32,
    spot: u8,
    label: u8,
}

/// Write the two comment lines opening a fresh track listing.
pub fn write_track_listing_header<W: Write>(
    mut writer: W,
    session: &str,
) -> Result<(), HedgehogError> {
    writeln!(writer, "# Hedgehog cell track listing for {session}")?;
    writeln!(
        writer,
        "# TIME\tX\tY\tZ\tTRACK_ID\tPARENT_TRACK_ID\tSPOT\tLABEL"
    )?;
    Ok(())
}

/// Append one track block to a listing.
///
/// Arguments
/// -----------------
/// * `writer`: destination of the block.
/// * `track`: the track to write, every point in order.
/// * `track_id`, `parent_id`: identifiers written in the block title and on every line.
/// * `scale`: multiplied component-wise with each position, typically the volume
///   dimensions to turn normalized positions into voxel coordinates.
pub fn write_track_listing<W: Write>(
    mut writer: W,
    track: &Track,
    track_id: u32,
    parent_id: u32,
    scale: &Vec3,
) -> Result<(), HedgehogError> {
    writeln!(writer)?;
    writeln!(writer)?;
    writeln!(writer, "# START OF TRACK {track_id}, child of {parent_id}")?;

    let mut csv_writer = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    for (position, vertex) in track.iter() {
        let p = position.component_mul(scale);
        csv_writer.serialize(TrackListingRow {
            timepoint: vertex.timepoint,
            x: p.x,
            y: p.y,
            z: p.z,
            track_id,
            parent_id,
            spot: 0,
            label: 0,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Append one track block to the listing file at `path`, creating it with its header
/// when missing or empty.
pub fn append_track_listing(
    path: &Utf8Path,
    session: &str,
    track: &Track,
    track_id: u32,
    parent_id: u32,
    scale: &Vec3,
) -> Result<(), HedgehogError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_new = file.metadata()?.len() == 0;

    let mut writer = BufWriter::new(file);
    if is_new {
        write_track_listing_header(&mut writer, session)?;
    }
    write_track_listing(&mut writer, track, track_id, parent_id, scale)?;
    writer.flush()?;
    Ok(())
}
