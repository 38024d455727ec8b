// Media manifest extraction for the site's embed host
// iframe url -> media token -> decrypted manifest -> playable variants

// =============== Imports ================
use super::ResolverSettings;
use super::fragment;
use super::hls;
use super::oracle::{self, MediaResult};
use super::transport::{Transport, api_headers, media_headers};
use crate::error::{ResolveError, Result};
use crate::models::{MediaManifest, ResolvedLink, SubtitleTrack, VideoVariant};

use url::Url;

/// Quality marker for sources that are played as-is.
pub const AUTO_QUALITY: &str = "Auto";

const DIRECT_EXTENSIONS: [&str; 3] = [".mp4", ".mkv", ".webm"];

/// Splits an iframe url into its origin and the last non-empty path segment.
pub fn media_token(iframe_url: &str) -> Result<(String, String)> {
    let malformed = || ResolveError::MalformedIframeUrl(iframe_url.to_string());
    let parsed = Url::parse(iframe_url).map_err(|_| malformed())?;
    let host = parsed.host_str().ok_or_else(malformed)?;

    let origin = match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    };
    let token = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(malformed)?;

    Ok((origin, token.to_string()))
}

fn build_manifest(result: MediaResult) -> MediaManifest {
    let mut subtitle_tracks: Vec<SubtitleTrack> = result
        .tracks
        .into_iter()
        .filter(|t| (t.kind == "captions" || t.kind == "subtitles") && !t.file.trim().is_empty())
        .map(|t| SubtitleTrack {
            url: t.file,
            label: t
                .label
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            is_default: t.default,
        })
        .collect();
    // stable, so tracks keep their order within each group
    subtitle_tracks.sort_by_key(|t| !t.is_default);

    MediaManifest {
        sources: result
            .sources
            .into_iter()
            .map(|s| s.file)
            .filter(|f| !f.trim().is_empty())
            .collect(),
        subtitle_tracks,
    }
}

/// Hops from the iframe to the decrypted manifest. The media request is only
/// answered when the referer is the iframe url itself.
pub async fn fetch_manifest<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    iframe_url: &str,
) -> Result<MediaManifest> {
    let (origin, token) = media_token(iframe_url)?;
    let url = format!("{}/media/{}", origin, token);

    let body = transport
        .get(&url, &api_headers(iframe_url, &settings.user_agent))
        .await?;
    let media_token = fragment::result_string(&body, "media token")?
        .ok_or_else(|| ResolveError::MediaTokenUnavailable(iframe_url.to_string()))?;

    let result = oracle::decrypt_media(transport, settings, &media_token, iframe_url).await?;
    Ok(build_manifest(result))
}

fn is_direct_file(source: &str) -> bool {
    let path = Url::parse(source)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|_| source.to_ascii_lowercase());
    DIRECT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Expands one manifest source into variants. Master playlists give one
/// variant per stream with a resolution (possibly none at all), anything
/// else is a single `Auto` variant.
async fn source_variants<T: Transport + ?Sized>(
    transport: &T,
    source: &str,
    link: &ResolvedLink,
    manifest: &MediaManifest,
    user_agent: &str,
) -> Result<Vec<VideoVariant>> {
    let headers = media_headers(&link.iframe_url, user_agent);
    let variant = |stream_url: String, quality: &str| VideoVariant {
        stream_url,
        label: format!("{} | {}", link.label, quality),
        subtitle_tracks: manifest.subtitle_tracks.clone(),
        request_headers: headers.clone(),
        skip: link.skip.clone(),
    };

    if is_direct_file(source) {
        return Ok(vec![variant(source.to_string(), AUTO_QUALITY)]);
    }
    let body = transport.get(source, &headers).await?;
    match hls::parse_variants(&body, source)? {
        Some(variants) if variants.is_empty() => {
            log::info!("{} lists no variant with a resolution", source);
            Ok(Vec::new())
        }
        Some(variants) => Ok(variants
            .into_iter()
            .map(|v| variant(v.url, &v.quality))
            .collect()),
        None => Ok(vec![variant(source.to_string(), AUTO_QUALITY)]),
    }
}

/// Every playable variant behind one resolved server link.
pub async fn extract_videos<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    link: &ResolvedLink,
) -> Result<Vec<VideoVariant>> {
    let manifest = fetch_manifest(transport, settings, &link.iframe_url).await?;
    if manifest.sources.is_empty() {
        log::info!("{} has no sources", link.label);
        return Ok(Vec::new());
    }

    let mut videos = Vec::new();
    for source in &manifest.sources {
        videos.extend(source_variants(transport, source, link, &manifest, &settings.user_agent).await?);
    }
    Ok(videos)
}
