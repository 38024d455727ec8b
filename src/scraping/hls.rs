// HLS master playlist inspection (variant enumeration only, no segment fetching)

// =============== Imports ================
use crate::error::{ResolveError, Result};

use m3u8_rs::parse_master_playlist_res;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RESOLUTION=(\d+)x(\d+)").expect("static regex"));
static CODECS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"CODECS="([^"]*)""#).expect("static regex"));

pub const STREAM_INF: &str = "#EXT-X-STREAM-INF";

/// One quality option of a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HlsVariant {
    /// `"{height}p"`, with the codecs in brackets when the playlist lists them.
    pub quality: String,
    pub url: String,
}

fn stream_inf_lines(body: &str) -> usize {
    body.lines()
        .filter(|line| line.trim_start().starts_with(STREAM_INF))
        .count()
}

pub fn is_master_playlist(body: &str) -> bool {
    stream_inf_lines(body) > 0
}

struct RawVariant {
    height: Option<u64>,
    codecs: Option<String>,
    uri: String,
}

// Lenient fallback: each stream-inf line pairs with the next uri line.
// A tag line right after a stream-inf is left for the loop to read.
fn scan_lines(body: &str) -> Vec<RawVariant> {
    let mut variants = Vec::new();
    let mut lines = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .peekable();

    while let Some(line) = lines.next() {
        if !line.starts_with(STREAM_INF) {
            continue;
        }
        let Some(uri) = lines.next_if(|next| !next.starts_with('#')) else {
            continue;
        };

        variants.push(RawVariant {
            height: RESOLUTION
                .captures(line)
                .and_then(|c| c[2].parse::<u64>().ok()),
            codecs: CODECS.captures(line).map(|c| c[1].to_string()),
            uri: uri.to_string(),
        });
    }

    variants
}

fn absolute_url(base: &Url, uri: &str) -> Result<String> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Ok(uri.to_string());
    }
    base.join(uri)
        .map(|u| u.to_string())
        .map_err(|e| ResolveError::decode("hls variant uri", e))
}

/// Parses a master playlist body fetched from `base_url`.
///
/// Returns `None` when the body is not a master playlist. Variants without a
/// `RESOLUTION` attribute, and I-frame streams, are left out.
pub fn parse_variants(body: &str, base_url: &str) -> Result<Option<Vec<HlsVariant>>> {
    if !is_master_playlist(body) {
        return Ok(None);
    }

    let base = Url::parse(base_url).map_err(|e| ResolveError::decode("hls playlist url", e))?;

    // m3u8-rs refuses a body without the header line
    let playlist = if body.trim_start().starts_with("#EXTM3U") {
        body.trim_start().to_string()
    } else {
        format!("#EXTM3U\n{}", body)
    };

    // m3u8-rs silently skips stream-inf entries it can't read (no BANDWIDTH),
    // so its result only counts when it kept every one of them
    let expected = stream_inf_lines(body);
    let raw = match parse_master_playlist_res(playlist.as_bytes()) {
        Ok(master) => {
            let strict: Vec<RawVariant> = master
                .variants
                .into_iter()
                .filter(|v| !v.is_i_frame)
                .map(|v| RawVariant {
                    height: v.resolution.map(|r| r.height),
                    codecs: v.codecs,
                    uri: v.uri,
                })
                .collect();
            if strict.len() == expected {
                strict
            } else {
                log::debug!(
                    "Strict playlist parse kept {} of {} variants, scanning lines",
                    strict.len(),
                    expected
                );
                scan_lines(body)
            }
        }
        Err(e) => {
            log::debug!("Strict playlist parse failed ({:?}), scanning lines", e);
            scan_lines(body)
        }
    };

    let mut variants = Vec::new();
    for variant in raw {
        let Some(height) = variant.height else {
            log::debug!("Skipping variant without resolution: {}", variant.uri);
            continue;
        };

        let mut quality = format!("{}p", height);
        if let Some(codecs) = variant.codecs.filter(|c| !c.trim().is_empty()) {
            quality = format!("{} [{}]", quality, codecs);
        }

        variants.push(HlsVariant {
            quality,
            url: absolute_url(&base, &variant.uri)?,
        });
    }

    Ok(Some(variants))
}
