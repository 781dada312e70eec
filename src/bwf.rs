use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::metadata::MetadataRecord;
use crate::xmp;

/// Fixed part of the EBU Tech 3285 bext chunk; CodingHistory follows it.
const BEXT_FIXED_LEN: usize = 602;

/// Upper bound for metadata chunks read into memory. The `data` chunk is
/// never read at all, only seeked past.
const MAX_METADATA_CHUNK: u64 = 16 * 1024 * 1024;

/// Reads every metadata source embedded in a BWF file into one flat record:
/// bext fields, LIST-INFO tags, technical fields derived from `fmt `/`data`,
/// and the custom fields of an embedded XMP packet (`axml` or `_PMX` chunk).
/// Later sources win on key collision.
pub fn read_bwf_metadata(path: impl AsRef<Path>) -> Result<MetadataRecord> {
    let path = path.as_ref();
    log::info!("reading BWF metadata from {}", path.display());

    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .with_context(|| format!("failed to read RIFF header of {}", path.display()))?;
    if &magic != b"RIFF" {
        bail!("{} is not a RIFF file", path.display());
    }
    let _riff_size = read_u32(&mut reader)?;
    reader.read_exact(&mut magic)?;
    if &magic != b"WAVE" {
        bail!("{} is not a WAVE file", path.display());
    }

    let mut record = MetadataRecord::new();
    let mut byte_rate = 0u32;
    let mut data_len = 0u64;
    let mut xmp_packet: Option<String> = None;

    loop {
        let mut fourcc = [0u8; 4];
        match reader.read_exact(&mut fourcc) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read chunk header in {}", path.display()));
            }
        }
        let size = read_u32(&mut reader)? as u64;
        log::debug!(
            "chunk {:?} ({} bytes)",
            String::from_utf8_lossy(&fourcc),
            size
        );

        match &fourcc {
            b"bext" => parse_bext(&read_chunk(&mut reader, size, path)?, &mut record)?,
            b"LIST" => {
                if size < 4 {
                    bail!("truncated LIST chunk in {}", path.display());
                }
                let mut list_type = [0u8; 4];
                reader.read_exact(&mut list_type)?;
                let body = read_chunk(&mut reader, size - 4, path)?;
                if &list_type == b"INFO" {
                    parse_info(&body, &mut record);
                }
            }
            b"fmt " => {
                let body = read_chunk(&mut reader, size, path)?;
                byte_rate = parse_fmt(&body, &mut record)?;
            }
            b"data" => {
                data_len = size;
                reader.seek(SeekFrom::Current(size as i64))?;
            }
            b"axml" | b"_PMX" => {
                let body = read_chunk(&mut reader, size, path)?;
                xmp_packet = Some(String::from_utf8_lossy(&body).into_owned());
            }
            _ => {
                reader.seek(SeekFrom::Current(size as i64))?;
            }
        }

        // RIFF chunks are word-aligned; odd sizes are followed by a pad byte
        if size % 2 == 1 {
            reader.seek(SeekFrom::Current(1))?;
        }
    }

    if byte_rate > 0 && data_len > 0 {
        record.set("Duration", format_duration(data_len, byte_rate));
    }

    if let Some(packet) = xmp_packet {
        let fields = xmp::collect_fields(&packet)
            .with_context(|| format!("embedded XMP in {} is malformed", path.display()))?;
        record.merge(fields);
    }

    log::debug!("{} metadata fields in {}", record.len(), path.display());
    Ok(record)
}

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_chunk(reader: &mut impl Read, size: u64, path: &Path) -> Result<Vec<u8>> {
    if size > MAX_METADATA_CHUNK {
        bail!(
            "metadata chunk of {} bytes in {} is implausibly large",
            size,
            path.display()
        );
    }
    let mut body = vec![0u8; size as usize];
    reader
        .read_exact(&mut body)
        .with_context(|| format!("truncated chunk in {}", path.display()))?;
    Ok(body)
}

/// Null-padded fixed-width ASCII field.
fn fixed_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn parse_bext(body: &[u8], record: &mut MetadataRecord) -> Result<()> {
    if body.len() < BEXT_FIXED_LEN {
        bail!("bext chunk truncated at {} bytes", body.len());
    }
    record.set("Description", fixed_string(&body[0..256]));
    record.set("Originator", fixed_string(&body[256..288]));
    record.set("OriginatorReference", fixed_string(&body[288..320]));
    record.set("OriginationDate", fixed_string(&body[320..330]));
    record.set("OriginationTime", fixed_string(&body[330..338]));
    let time_reference = u64::from_le_bytes(
        body[338..346]
            .try_into()
            .context("bext TimeReference out of range")?,
    );
    record.set("TimeReference", time_reference.to_string());
    if body.len() > BEXT_FIXED_LEN {
        record.set("CodingHistory", fixed_string(&body[BEXT_FIXED_LEN..]));
    }
    Ok(())
}

/// Fourcc/value pairs of a LIST-INFO body: INAM, ICRD, ICOP, ISRC and
/// whatever else the writing tool put there. Keys are kept verbatim.
fn parse_info(body: &[u8], record: &mut MetadataRecord) {
    let mut pos = 0usize;
    while pos + 8 <= body.len() {
        let key = &body[pos..pos + 4];
        let size = u32::from_le_bytes([body[pos + 4], body[pos + 5], body[pos + 6], body[pos + 7]])
            as usize;
        pos += 8;
        if pos + size > body.len() {
            log::warn!("truncated INFO value, ignoring rest of list");
            return;
        }
        match std::str::from_utf8(key) {
            Ok(key) if key.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) => {
                record.set(key, fixed_string(&body[pos..pos + size]));
            }
            _ => log::warn!("skipping INFO item with malformed key {:?}", key),
        }
        pos += size + size % 2;
    }
}

/// Returns the byte rate; also records the basic technical fields.
fn parse_fmt(body: &[u8], record: &mut MetadataRecord) -> Result<u32> {
    if body.len() < 16 {
        bail!("fmt chunk truncated at {} bytes", body.len());
    }
    let channels = u16::from_le_bytes([body[2], body[3]]);
    let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
    let byte_rate = u32::from_le_bytes([body[8], body[9], body[10], body[11]]);
    let bits_per_sample = u16::from_le_bytes([body[14], body[15]]);
    record.set("Channels", channels.to_string());
    record.set("SampleRate", sample_rate.to_string());
    record.set("BitPerSample", bits_per_sample.to_string());
    Ok(byte_rate)
}

fn format_duration(data_len: u64, byte_rate: u32) -> String {
    let total_ms = data_len.saturating_mul(1000) / u64::from(byte_rate);
    let ms = total_ms % 1000;
    let seconds = (total_ms / 1000) % 60;
    let minutes = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, ms)
}
