// =============== Imports ================
use kai_resolver::config::Config;
use kai_resolver::models::VideoVariant;

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Arguments for an mpv-compatible player: the stream only plays with the
/// headers it was resolved with.
pub fn player_args(config: &Config, variant: &VideoVariant, title: &str) -> Vec<String> {
    let mut args = vec![
        "--hwdec=auto".to_string(),
        "--quiet".to_string(),
        format!("--force-media-title={}", title),
    ];

    for (name, value) in &variant.request_headers {
        args.push(format!("--http-header-fields-append={}: {}", name, value));
    }
    for track in &variant.subtitle_tracks {
        args.push(format!("--sub-file={}", track.url));
    }

    args.extend(
        config
            .player_args
            .split(' ')
            .filter(|arg| !arg.is_empty())
            .map(str::to_string),
    );
    args.push(variant.stream_url.clone());
    args
}

pub fn play(config: &Config, variant: &VideoVariant, title: &str) -> Result<()> {
    let program = &config.player;
    log::info!("Starting {} with {}", program, variant.label);

    let status = Command::new(program)
        .args(player_args(config, variant, title))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("Failed to start player with program: {}", program))?;

    if !status.success() {
        log::warn!("{} exited with {}", program, status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kai_resolver::models::{Headers, SubtitleTrack};

    #[test]
    fn headers_subtitles_and_extra_args_are_passed() {
        let mut request_headers = Headers::new();
        request_headers.insert("Referer".into(), "https://megaup.cc/e/abc".into());
        let variant = VideoVariant {
            stream_url: "https://cdn.test/1080.m3u8".into(),
            label: "Hard Sub | Server 1 | 1080p".into(),
            subtitle_tracks: vec![SubtitleTrack {
                url: "https://cdn.test/en.vtt".into(),
                label: "English".into(),
                is_default: true,
            }],
            request_headers,
            skip: None,
        };
        let config = Config {
            player_args: "--fs  --volume=50".into(),
            ..Config::default()
        };

        let args = player_args(&config, &variant, "Frieren - Episode 1");

        assert!(args.contains(&"--force-media-title=Frieren - Episode 1".to_string()));
        assert!(args.contains(&"--http-header-fields-append=Referer: https://megaup.cc/e/abc".to_string()));
        assert!(args.contains(&"--sub-file=https://cdn.test/en.vtt".to_string()));
        assert!(args.contains(&"--fs".to_string()));
        assert_eq!(args.last().unwrap(), "https://cdn.test/1080.m3u8");
    }
}
