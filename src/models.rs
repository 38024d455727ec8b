// =============== Imports ================
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Header name -> value, sorted so output is deterministic.
pub type Headers = BTreeMap<String, String>;

// * Audio/subtitle flavour of a server group, as the site labels it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Sub,
    Dub,
    Softsub,
}

impl TrackType {
    pub const ALL: [TrackType; 3] = [TrackType::Sub, TrackType::Softsub, TrackType::Dub];

    /// The token the site uses in `data-id` attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackType::Sub => "sub",
            TrackType::Dub => "dub",
            TrackType::Softsub => "softsub",
        }
    }

    /// Human-readable name used in labels and for preference matching.
    pub fn display_name(&self) -> &'static str {
        match self {
            TrackType::Sub => "Hard Sub",
            TrackType::Dub => "Dub",
            TrackType::Softsub => "Soft Sub",
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TrackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sub" | "hardsub" | "hard sub" => Ok(TrackType::Sub),
            "dub" => Ok(TrackType::Dub),
            "softsub" | "soft sub" => Ok(TrackType::Softsub),
            other => Err(format!("unknown track type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub number: u32,
    pub token: String,
    pub title: String,
    pub is_filler: bool,
}

/// One advertised server for an episode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ServerEntry {
    pub track_type: TrackType,
    pub server_id: String,
    pub server_name: String,
}

impl ServerEntry {
    pub fn label(&self) -> String {
        format!("{} | {}", self.track_type.display_name(), self.server_name)
    }
}

/// Intro/outro markers in seconds, as `[start, end]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTimes {
    #[serde(default)]
    pub intro: Option<[u32; 2]>,
    #[serde(default)]
    pub outro: Option<[u32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub iframe_url: String,
    pub label: String,
    pub skip: Option<SkipTimes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub url: String,
    pub label: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaManifest {
    pub sources: Vec<String>,
    pub subtitle_tracks: Vec<SubtitleTrack>,
}

/// A single playable stream, ready to hand to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoVariant {
    pub stream_url: String,
    pub label: String,
    pub subtitle_tracks: Vec<SubtitleTrack>,
    pub request_headers: Headers,
    pub skip: Option<SkipTimes>,
}

/// What the user would rather watch. Empty strings match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub quality: String,
    pub server: String,
    pub track_type: String,
}
