// Episode -> ranked playable streams
//
// anime page -> anime id -> episode list -> episode token -> server list
//   -> (per server) token -> encoded link -> iframe url
//   -> (per iframe) media token -> manifest -> HLS variants -> ranking

pub mod catalog;
pub mod fragment;
pub mod hls;
pub mod links;
pub mod megaup;
pub mod oracle;
pub mod ranking;
pub mod transport;

// =============== Imports ================
use crate::error::Result;
use crate::models::{Episode, Preferences, ResolvedLink, ServerEntry, TrackType, VideoVariant};
use transport::Transport;

use futures::{StreamExt, stream};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Read-only knobs for one resolver. Built from the user config, never read
/// from global state inside the pipeline.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub site_url: String,
    pub oracle_url: String,
    pub encode_path: String,
    pub decode_path: String,
    pub decode_media_path: String,
    pub user_agent: String,
    /// Ceiling on in-flight server chains, to stay under upstream rate limits.
    pub concurrency: usize,
    pub enabled_types: Vec<TrackType>,
    /// Empty means every hoster.
    pub enabled_hosters: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            site_url: "https://animekai.to".to_string(),
            oracle_url: "https://enc-dec.app/api".to_string(),
            encode_path: "enc-kai".to_string(),
            decode_path: "dec-kai".to_string(),
            decode_media_path: "dec-mega".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 3,
            enabled_types: TrackType::ALL.to_vec(),
            enabled_hosters: Vec::new(),
        }
    }
}

impl ResolverSettings {
    pub fn site(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    pub fn oracle_endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.oracle_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub struct Resolver<T: Transport> {
    transport: T,
    settings: ResolverSettings,
}

impl<T: Transport> Resolver<T> {
    pub fn new(transport: T, settings: ResolverSettings) -> Self {
        Self { transport, settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub async fn fetch_anime_id(&self, page_url: &str) -> Result<String> {
        catalog::fetch_anime_id(&self.transport, &self.settings, page_url).await
    }

    pub async fn list_episodes(&self, anime_id: &str, referer: &str) -> Result<Vec<Episode>> {
        catalog::list_episodes(&self.transport, &self.settings, anime_id, referer).await
    }

    pub async fn list_servers(&self, episode_token: &str, referer: &str) -> Result<Vec<ServerEntry>> {
        catalog::list_servers(&self.transport, &self.settings, episode_token, referer).await
    }

    pub async fn resolve_links(&self, entries: &[ServerEntry], referer: &str) -> Vec<ResolvedLink> {
        links::resolve_links(&self.transport, &self.settings, entries, referer).await
    }

    /// Variants of every link, in link order. A link that fails contributes
    /// nothing.
    pub async fn extract_videos(&self, links: &[ResolvedLink]) -> Vec<VideoVariant> {
        stream::iter(links)
            .map(|link| async move {
                match megaup::extract_videos(&self.transport, &self.settings, link).await {
                    Ok(videos) => videos,
                    Err(e) => {
                        log::warn!("No videos from {}: {}", link.label, e);
                        Vec::new()
                    }
                }
            })
            .buffered(self.settings.concurrency.max(1))
            .concat()
            .await
    }

    /// Full resolution of one episode. Only the server listing can fail the
    /// call; an empty list means no playable sources.
    pub async fn resolve_episode(
        &self,
        episode_token: &str,
        referer: &str,
        preferences: &Preferences,
    ) -> Result<Vec<VideoVariant>> {
        let servers = self.list_servers(episode_token, referer).await?;
        let links = self.resolve_links(&servers, referer).await;
        log::info!("Resolved {} of {} servers", links.len(), servers.len());

        let videos = self.extract_videos(&links).await;
        log::info!("Found {} videos", videos.len());
        Ok(ranking::rank(videos, preferences))
    }
}
