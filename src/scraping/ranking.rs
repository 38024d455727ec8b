// =============== Imports ================
use crate::models::{Preferences, VideoVariant};

use regex::Regex;
use std::cmp::Reverse;
use std::sync::LazyLock;

static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[\](){}]").expect("static regex"));

fn normalize(text: &str) -> String {
    BRACKETS.replace_all(text, "").trim().to_lowercase()
}

/// Orders variants by preferred quality, then server, then track type, all
/// matched as substrings of the label. Stable: ties keep their input order.
pub fn rank(variants: Vec<VideoVariant>, preferences: &Preferences) -> Vec<VideoVariant> {
    let quality = normalize(&preferences.quality);
    let server = normalize(&preferences.server);
    let track_type = normalize(&preferences.track_type);

    let mut keyed: Vec<_> = variants
        .into_iter()
        .map(|variant| {
            let label = normalize(&variant.label);
            let key = (
                label.contains(&quality),
                label.contains(&server),
                label.contains(&track_type),
            );
            (Reverse(key), variant)
        })
        .collect();

    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, variant)| variant).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Headers;

    fn variant(label: &str) -> VideoVariant {
        VideoVariant {
            stream_url: format!("https://cdn.test/{}", label.len()),
            label: label.to_string(),
            subtitle_tracks: Vec::new(),
            request_headers: Headers::new(),
            skip: None,
        }
    }

    fn labels(variants: &[VideoVariant]) -> Vec<&str> {
        variants.iter().map(|v| v.label.as_str()).collect()
    }

    fn prefs(quality: &str, server: &str, track_type: &str) -> Preferences {
        Preferences {
            quality: quality.into(),
            server: server.into(),
            track_type: track_type.into(),
        }
    }

    #[test]
    fn best_match_comes_first() {
        let variants = vec![
            variant("Hard Sub | Server 2 | 720p"),
            variant("Soft Sub | Server 2 | 480p"),
            variant("Soft Sub | Server 1 | 1080p"),
        ];

        let ranked = rank(variants, &prefs("1080p", "Server 1", "Soft Sub"));

        assert_eq!(ranked[0].label, "Soft Sub | Server 1 | 1080p");
        assert_eq!(ranked[1].label, "Soft Sub | Server 2 | 480p");
    }

    #[test]
    fn quality_outweighs_server_and_type() {
        let variants = vec![
            variant("Soft Sub | Server 1 | 720p"),
            variant("Dub | Server 2 | 1080p"),
        ];

        let ranked = rank(variants, &prefs("1080p", "Server 1", "Soft Sub"));

        assert_eq!(labels(&ranked), ["Dub | Server 2 | 1080p", "Soft Sub | Server 1 | 720p"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let variants = vec![
            variant("Hard Sub | Server 1 | 720p"),
            variant("Hard Sub | Server 2 | 720p"),
            variant("Hard Sub | Server 3 | 720p"),
        ];

        let ranked = rank(variants.clone(), &prefs("1080p", "", "Dub"));

        assert_eq!(ranked, variants);
    }

    #[test]
    fn brackets_do_not_hide_matches() {
        let variants = vec![
            variant("Hard Sub | Server 1 | 720p"),
            variant("[Soft Sub] | Server 1 | 720p [avc1]"),
        ];

        let ranked = rank(variants, &prefs("720p", "server 1", "(Soft Sub)"));

        assert_eq!(ranked[0].label, "[Soft Sub] | Server 1 | 720p [avc1]");
    }
}
