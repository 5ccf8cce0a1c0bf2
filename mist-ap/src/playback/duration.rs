//! MP3 duration estimation from a byte-range prefix
//!
//! Only the first few kilobytes of a clip are fetched. The first valid
//! MPEG Layer III frame header in that prefix supplies the bitrate, and the
//! duration follows from the total resource size under a constant-bitrate
//! assumption. Variable-bitrate files therefore get an approximate figure;
//! no attempt is made to read Xing/VBRI headers.

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Bytes requested from the start of the resource
pub const DEFAULT_PREFIX_LEN: usize = 4096;

/// Length of an ID3v2 tag header
const ID3_HEADER_LEN: usize = 10;

/// MPEG-1 Layer III bitrates (kbps) by index
const MPEG1_L3_BITRATES: [u32; 16] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
];

/// MPEG-2 / MPEG-2.5 Layer III bitrates (kbps) by index
const MPEG2_L3_BITRATES: [u32; 16] = [
    0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0,
];

/// MPEG audio version from header bits 4-3 of the second byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
    Reserved,
}

impl MpegVersion {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b11 => MpegVersion::Mpeg1,
            0b10 => MpegVersion::Mpeg2,
            0b00 => MpegVersion::Mpeg25,
            _ => MpegVersion::Reserved,
        }
    }

    fn layer3_bitrates(self) -> &'static [u32; 16] {
        match self {
            MpegVersion::Mpeg1 => &MPEG1_L3_BITRATES,
            _ => &MPEG2_L3_BITRATES,
        }
    }
}

/// First Layer III frame found in a prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Byte offset of the sync word within the resource
    pub offset: usize,
    pub version: MpegVersion,
    pub bitrate_kbps: u32,
}

/// Offset where audio data starts, skipping a leading ID3v2 tag.
///
/// The tag size is a synchsafe integer: four bytes carrying seven bits each.
/// A tag header truncated by the prefix yields the prefix length, so nothing
/// is scanned.
pub fn audio_start_offset(prefix: &[u8]) -> usize {
    if prefix.len() < 3 || &prefix[..3] != b"ID3" {
        return 0;
    }
    if prefix.len() < ID3_HEADER_LEN {
        return prefix.len();
    }
    let size = (u32::from(prefix[6] & 0x7F) << 21)
        | (u32::from(prefix[7] & 0x7F) << 14)
        | (u32::from(prefix[8] & 0x7F) << 7)
        | u32::from(prefix[9] & 0x7F);
    ID3_HEADER_LEN + size as usize
}

/// Scan `prefix` from `start` for the first Layer III frame with a usable bitrate
pub fn find_first_frame(prefix: &[u8], start: usize) -> Option<FrameHeader> {
    let mut i = start;
    while i + 2 < prefix.len() {
        let b0 = prefix[i];
        let b1 = prefix[i + 1];
        if b0 != 0xFF || b1 & 0xE0 != 0xE0 {
            i += 1;
            continue;
        }

        let version = MpegVersion::from_bits(b1 >> 3);
        let layer = (b1 >> 1) & 0b11;
        if layer != 0b01 {
            i += 1;
            continue;
        }

        let index = (prefix[i + 2] >> 4) as usize;
        // Index 0 is "free format" and 15 is invalid; neither gives a rate
        let bitrate_kbps = version.layer3_bitrates()[index];
        if bitrate_kbps == 0 {
            i += 1;
            continue;
        }

        return Some(FrameHeader {
            offset: i,
            version,
            bitrate_kbps,
        });
    }
    None
}

/// Duration in seconds (one decimal) from a prefix and the total resource size
pub fn estimate_from_prefix(prefix: &[u8], total_size: u64) -> Option<f64> {
    if total_size == 0 {
        return None;
    }

    let start = audio_start_offset(prefix);
    let frame = find_first_frame(prefix, start)?;
    let offset = frame.offset as u64;
    if total_size <= offset {
        return None;
    }

    let seconds = (total_size - offset) as f64 * 8.0 / (f64::from(frame.bitrate_kbps) * 1000.0);
    Some((seconds * 10.0).round() / 10.0)
}

/// Total resource size from `Content-Range`, falling back to `Content-Length`.
///
/// `Content-Length` only counts as the total on a `200`, where the server
/// ignored the range and sent the whole resource. On a `206` it is the
/// length of the partial body.
pub fn total_size_from_headers(status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if let Some(range) = headers.get(CONTENT_RANGE) {
        // bytes start-end/total, where total may be "*"
        return range
            .to_str()
            .ok()
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.trim().parse::<u64>().ok());
    }

    if status != StatusCode::OK {
        return None;
    }

    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Estimates clip durations over HTTP
#[derive(Debug, Clone)]
pub struct DurationEstimator {
    client: reqwest::Client,
    prefix_len: usize,
}

impl DurationEstimator {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_prefix_len(client, DEFAULT_PREFIX_LEN)
    }

    pub fn with_prefix_len(client: reqwest::Client, prefix_len: usize) -> Self {
        Self {
            client,
            prefix_len: prefix_len.max(4),
        }
    }

    /// Estimated duration of the MP3 at `url`, or `None` when it cannot be told
    pub async fn estimate(&self, url: &str) -> Option<f64> {
        match self.fetch_prefix(url).await {
            Ok((prefix, Some(total))) => {
                let estimate = estimate_from_prefix(&prefix, total);
                debug!(
                    url = %url,
                    prefix_len = prefix.len(),
                    total,
                    ?estimate,
                    "Estimated clip duration"
                );
                estimate
            }
            Ok((_, None)) => {
                debug!(url = %url, "Server reported no total size");
                None
            }
            Err(e) => {
                warn!(url = %url, "Duration estimate failed: {}", e);
                None
            }
        }
    }

    /// Fetch up to `prefix_len` bytes plus the reported total size
    async fn fetch_prefix(&self, url: &str) -> Result<(Vec<u8>, Option<u64>)> {
        let mut response = self
            .client
            .get(url)
            .header(RANGE, format!("bytes=0-{}", self.prefix_len - 1))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let total = total_size_from_headers(status, response.headers());

        // Servers that ignore the range send the whole file; stop reading early
        let mut prefix = Vec::with_capacity(self.prefix_len);
        while prefix.len() < self.prefix_len {
            match response.chunk().await? {
                Some(chunk) => {
                    let take = (self.prefix_len - prefix.len()).min(chunk.len());
                    prefix.extend_from_slice(&chunk[..take]);
                }
                None => break,
            }
        }

        Ok((prefix, total))
    }
}
