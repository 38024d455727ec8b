// Anime page, episode list and server list scraping

// =============== Imports ================
use super::ResolverSettings;
use super::fragment;
use super::oracle;
use super::transport::{Transport, api_headers};
use crate::error::{ResolveError, Result};
use crate::models::{Episode, ServerEntry, TrackType};

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static ANIME_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.rate-box[data-id], #anime-rating[data-id]").expect("static selector"));
static EPISODE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".eplist a[token]").expect("static selector"));
static EPISODE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("static selector"));
static SERVER_GROUP: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".server-items[data-id]").expect("static selector"));
static SERVER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".server[data-lid]").expect("static selector"));

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

// ================ Parsers ================

/// Reads the site's internal anime id off the anime page.
pub fn parse_anime_id(page_html: &str) -> Option<String> {
    let document = Html::parse_document(page_html);
    document
        .select(&ANIME_ID)
        .filter_map(|el| el.value().attr("data-id"))
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// Episodes in ascending number order. Entries without a usable number are
/// skipped.
pub fn parse_episodes(fragment_html: &str) -> Vec<Episode> {
    let fragment = Html::parse_fragment(fragment_html);
    let mut episodes: Vec<Episode> = fragment
        .select(&EPISODE)
        .filter_map(|el| {
            let token = el.value().attr("token")?.trim();
            let number = el.value().attr("num")?.trim().parse::<u32>().ok()?;
            if token.is_empty() {
                return None;
            }
            let title = el
                .select(&EPISODE_TITLE)
                .next()
                .map(text_of)
                .filter(|t| !t.is_empty())
                .or_else(|| el.value().attr("title").map(|t| t.trim().to_string()))
                .unwrap_or_else(|| format!("Episode {}", number));

            Some(Episode {
                number,
                token: token.to_string(),
                title,
                is_filler: el.value().classes().any(|c| c == "filler"),
            })
        })
        .collect();

    episodes.sort_by_key(|ep| ep.number);
    episodes
}

/// Walks the server groups of a links fragment in document order.
///
/// Filtering happens here so that disabled servers never cost a token
/// exchange. An empty `enabled_hosters` list means every hoster.
pub fn parse_servers(
    fragment_html: &str,
    enabled_types: &[TrackType],
    enabled_hosters: &[String],
) -> Vec<ServerEntry> {
    let fragment = Html::parse_fragment(fragment_html);
    let mut entries = Vec::new();

    for group in fragment.select(&SERVER_GROUP) {
        let raw_type = group.value().attr("data-id").unwrap_or_default();
        let track_type = match raw_type.parse::<TrackType>() {
            Ok(track_type) => track_type,
            Err(e) => {
                log::debug!("Skipping server group: {}", e);
                continue;
            }
        };
        if !enabled_types.contains(&track_type) {
            continue;
        }

        for server in group.select(&SERVER) {
            let server_id = server.value().attr("data-lid").unwrap_or_default().trim();
            let server_name = text_of(server);
            if server_id.is_empty() || server_name.is_empty() {
                continue;
            }
            if !enabled_hosters.is_empty()
                && !enabled_hosters
                    .iter()
                    .any(|h| h.trim().eq_ignore_ascii_case(&server_name))
            {
                continue;
            }

            entries.push(ServerEntry {
                track_type,
                server_id: server_id.to_string(),
                server_name,
            });
        }
    }

    entries
}

// ================ Fetchers ================

pub async fn fetch_anime_id<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    page_url: &str,
) -> Result<String> {
    log::info!("Fetching anime id from {}", page_url);
    let html = transport
        .get(page_url, &api_headers(page_url, &settings.user_agent))
        .await?;

    parse_anime_id(&html).ok_or_else(|| ResolveError::AnimeIdNotFound(page_url.to_string()))
}

pub async fn list_episodes<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    anime_id: &str,
    referer: &str,
) -> Result<Vec<Episode>> {
    let token = oracle::exchange(transport, settings, anime_id, referer).await?;
    let url = format!(
        "{}/ajax/episodes/list?ani_id={}&_={}",
        settings.site(),
        urlencoding::encode(anime_id),
        urlencoding::encode(&token)
    );

    let body = transport
        .get(&url, &api_headers(referer, &settings.user_agent))
        .await?;
    let episodes = parse_episodes(&fragment::html_fragment(&body, "episode list")?);
    log::info!("Found {} episodes for anime id {}", episodes.len(), anime_id);
    Ok(episodes)
}

pub async fn list_servers<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    episode_token: &str,
    referer: &str,
) -> Result<Vec<ServerEntry>> {
    let token = oracle::exchange(transport, settings, episode_token, referer).await?;
    let url = format!(
        "{}/ajax/links/list?token={}&_={}",
        settings.site(),
        urlencoding::encode(episode_token),
        urlencoding::encode(&token)
    );

    let body = transport
        .get(&url, &api_headers(referer, &settings.user_agent))
        .await?;
    let servers = parse_servers(
        &fragment::html_fragment(&body, "server list")?,
        &settings.enabled_types,
        &settings.enabled_hosters,
    );
    log::info!("{} enabled servers for episode token {}", servers.len(), episode_token);
    Ok(servers)
}
