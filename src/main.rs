// * Meaning of the comment signs (better-comments style):
// ! - Important
// * - Plain documentation, like what the function does
// Without the signs, it's just a plain comment

// =============== Imports ================
mod args;
mod player;
mod theme;
mod utils;

use kai_resolver::config;
use kai_resolver::models::{Episode, VideoVariant};
use kai_resolver::scraping::{Resolver, transport::HttpTransport};

use anyhow::{Context, Result};
use console::style;
use dialoguer::FuzzySelect;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = args::command().get_matches();
    utils::init_log(matches.get_flag("verbose"))?;
    log::info!("Application started");

    let mut config = config::load_config()?;
    config::test(&config)?; // Testing if the config file is valid
    args::apply_overrides(&mut config, &matches)?;
    log::debug!("Configuration: {:#?}", config);

    let client = utils::build_client(&config)?;
    let resolver = Resolver::new(HttpTransport::new(client), config.resolver_settings());

    let page_url = matches
        .get_one::<String>("anime")
        .context("No anime url given")?;

    // ! Without the anime id and its episode list there is nothing to resolve
    let anime_id = resolver
        .fetch_anime_id(page_url)
        .await
        .with_context(|| format!("Failed to find the anime on {}", page_url))?;
    let episodes = resolver
        .list_episodes(&anime_id, page_url)
        .await
        .with_context(|| format!("Failed to fetch the episode list for {}", anime_id))?;
    if episodes.is_empty() {
        eprintln!("No episodes found for the given anime.");
        return Err(anyhow::anyhow!("No episodes found"));
    }

    let episode = match matches.get_one::<u32>("number") {
        Some(number) => episodes
            .iter()
            .find(|ep| ep.number == *number)
            .ok_or_else(|| anyhow::anyhow!("Episode {} not found", number))?,
        None => pick_episode(&episodes)?,
    };

    println!("Loading - episode {}: {}", episode.number, episode.title);
    let videos = resolver
        .resolve_episode(&episode.token, page_url, &config.preferences())
        .await
        .with_context(|| format!("Failed to list servers for episode {}", episode.number))?;

    // * Every server failing is not an error, there is just nothing to play
    if videos.is_empty() {
        println!("No playable sources for episode {}.", episode.number);
        log::info!("No playable sources for episode {}", episode.number);
        return Ok(());
    }

    if matches.get_flag("json") {
        let json = serde_json::to_string_pretty(&videos).context("Failed to serialize streams")?;
        println!("{}", json);
    } else {
        print_videos(&videos);
    }

    if matches.get_flag("play") {
        let title = format!("{} - Episode {}", episode.title, episode.number);
        player::play(&config, &videos[0], &title)?;
    }

    log::info!("Application exiting");
    Ok(())
}

fn pick_episode(episodes: &[Episode]) -> Result<&Episode> {
    let items: Vec<String> = episodes
        .iter()
        .map(|ep| {
            let filler = if ep.is_filler { " (filler)" } else { "" };
            format!("{:>4}. {}{}", ep.number, ep.title, filler)
        })
        .collect();

    let theme = theme::CustomTheme {};
    let selection = FuzzySelect::with_theme(&theme)
        .with_prompt("Choose an episode:")
        .items(&items)
        .default(0)
        .interact_opt()
        .context("Failed to read episode selection")?;
    utils::clear();

    match selection {
        Some(index) => Ok(&episodes[index]),
        None => Err(anyhow::anyhow!("No selection was made")),
    }
}

fn print_videos(videos: &[VideoVariant]) {
    for (index, video) in videos.iter().enumerate() {
        let label = if index == 0 {
            style(&video.label).green().bold().to_string()
        } else {
            video.label.clone()
        };
        println!("{:>3}. {}", index + 1, label);
        println!("     {}", style(&video.stream_url).dim());
        if !video.subtitle_tracks.is_empty() {
            let subtitles: Vec<&str> = video.subtitle_tracks.iter().map(|t| t.label.as_str()).collect();
            println!("     subtitles: {}", subtitles.join(", "));
        }
    }
}
