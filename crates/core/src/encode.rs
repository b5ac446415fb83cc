// CSV encoding of channel rows

use crate::error::{BridgeError, BridgeResult};
use crate::types::ChannelRow;

/// Serialize rows as CSV with a fixed header.
///
/// The header is always written, so an empty collection encodes to the
/// header line alone.
pub fn encode(rows: &[ChannelRow]) -> BridgeResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(ChannelRow::HEADER)
        .map_err(|e| BridgeError::Encoding(Box::new(e)))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| BridgeError::Encoding(Box::new(e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BridgeError::Encoding(Box::new(e.into_error())))?;
    String::from_utf8(bytes).map_err(|e| BridgeError::Encoding(Box::new(e)))
}
