//! Snapshot encoding.
//!
//! Layout: 4-byte magic, 1-byte format version, then a gzip stream holding the
//! bincode encoding of the full graph state.

use crate::error::{GraphError, Result};
use crate::graph::GraphState;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

const MAGIC: &[u8; 4] = b"EDGB";
const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1;

pub(crate) fn encode(state: &GraphState, compression_level: u32) -> Result<Vec<u8>> {
    let body = bincode::serialize(state)
        .map_err(|e| GraphError::serialization("Failed to encode snapshot", Some(e)))?;

    let mut out = Vec::with_capacity(HEADER_LEN + body.len() / 2);
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);

    let mut encoder = GzEncoder::new(out, Compression::new(compression_level));
    encoder
        .write_all(&body)
        .map_err(|e| GraphError::serialization("Failed to compress snapshot", Some(e)))?;
    encoder
        .finish()
        .map_err(|e| GraphError::serialization("Failed to compress snapshot", Some(e)))
}

pub(crate) fn decode(bytes: &[u8]) -> Result<GraphState> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(GraphError::serialization(
            "Not an edgeable snapshot",
            None::<std::io::Error>,
        ));
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(GraphError::serialization(
            format!("Unsupported snapshot version {version}"),
            None::<std::io::Error>,
        ));
    }

    let mut body = Vec::new();
    GzDecoder::new(&bytes[HEADER_LEN..])
        .read_to_end(&mut body)
        .map_err(|e| GraphError::serialization("Failed to decompress snapshot", Some(e)))?;

    let state: GraphState = bincode::deserialize(&body)
        .map_err(|e| GraphError::serialization("Failed to decode snapshot", Some(e)))?;

    state.validate().map_err(|e| {
        GraphError::serialization(
            format!("Structurally invalid snapshot: {e}"),
            None::<std::io::Error>,
        )
    })?;
    Ok(state)
}
