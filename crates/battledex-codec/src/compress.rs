//! Optional compression stage for exported strings
//!
//! Dehydrated strings bound for quota-constrained or transport-constrained
//! destinations (persisted settings blobs, URL query parameters, QR codes)
//! pass through brotli and URL-safe base64. The output alphabet is safe to
//! embed in a URL without further escaping.
//!
//! The scheme marker prefix keeps the stage reversible and lets compression
//! degrade gracefully: a failed or counterproductive compression falls back
//! to the plain form rather than failing the export. Both schemes emit the
//! same URL-safe alphabet; the plain form is base64 of the raw text.

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::io::{Read, Write};
use tracing::warn;

/// Marker for a brotli+base64 payload.
const COMPRESSED_PREFIX: &str = "b.";
/// Marker for a base64-only payload.
const PLAIN_PREFIX: &str = "p.";

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 9;
const BROTLI_WINDOW: u32 = 20;

/// Compress an export string.
///
/// Never fails: when brotli errors or the compressed form comes out larger
/// than the base64 plain form, the plain form is returned instead.
pub fn compress_export(export: &str) -> String {
    let plain = format!("{}{}", PLAIN_PREFIX, URL_SAFE_NO_PAD.encode(export));
    match try_compress(export) {
        Ok(compressed) if COMPRESSED_PREFIX.len() + compressed.len() < plain.len() => {
            format!("{}{}", COMPRESSED_PREFIX, compressed)
        }
        Ok(_) => plain,
        Err(err) => {
            warn!(%err, "compression failed, storing plain");
            plain
        }
    }
}

/// Reverse [`compress_export`].
///
/// Returns `None` for an unknown scheme marker or an undecodable payload.
pub fn decompress_export(stored: &str) -> Option<String> {
    if let Some(plain) = stored.strip_prefix(PLAIN_PREFIX) {
        let bytes = URL_SAFE_NO_PAD.decode(plain).ok()?;
        return String::from_utf8(bytes).ok();
    }
    let compressed = stored.strip_prefix(COMPRESSED_PREFIX)?;
    let bytes = URL_SAFE_NO_PAD.decode(compressed).ok()?;
    let mut out = String::new();
    brotli::Decompressor::new(bytes.as_slice(), BROTLI_BUFFER)
        .read_to_string(&mut out)
        .ok()?;
    Some(out)
}

fn try_compress(export: &str) -> Result<String> {
    let mut compressed = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(
            &mut compressed,
            BROTLI_BUFFER,
            BROTLI_QUALITY,
            BROTLI_WINDOW,
        );
        writer
            .write_all(export.as_bytes())
            .map_err(|e| Error::Compression(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| Error::Compression(e.to_string()))?;
    }
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_compressed() {
        // Long, repetitive exports compress.
        let export = "SPC:Heatran|NME:Defensive Pivot|GEN:9|FMT:ou|".repeat(40);
        let stored = compress_export(&export);
        assert!(stored.starts_with(COMPRESSED_PREFIX));
        assert!(stored.len() < export.len());
        assert_eq!(decompress_export(&stored).unwrap(), export);
    }

    #[test]
    fn test_short_input_stays_plain() {
        let export = "SPC:Ditto";
        let stored = compress_export(export);
        assert!(stored.starts_with(PLAIN_PREFIX));
        assert_eq!(decompress_export(&stored).unwrap(), export);
    }

    #[test]
    fn test_both_schemes_share_the_url_safe_alphabet() {
        // The raw export carries `|`, `:`, `@` and spaces; neither stored
        // form may leak them.
        let export = "SPC:Heatran|ABA:Flash Fire@0.61,Flame Body@0.22";
        let url_safe =
            |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        let plain = compress_export(export);
        assert!(plain.starts_with(PLAIN_PREFIX));
        assert!(url_safe(&plain[PLAIN_PREFIX.len()..]));
        assert_eq!(decompress_export(&plain).unwrap(), export);

        let long = export.repeat(30);
        let compressed = compress_export(&long);
        assert!(compressed.starts_with(COMPRESSED_PREFIX));
        assert!(url_safe(&compressed[COMPRESSED_PREFIX.len()..]));
        assert_eq!(decompress_export(&compressed).unwrap(), long);
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        assert_eq!(decompress_export("x.whatever"), None);
        assert_eq!(decompress_export("b.!!!not-base64!!!"), None);
        assert_eq!(decompress_export("p.!!!not-base64!!!"), None);
    }
}
