// =============== Imports ================
use kai_resolver::config::Config;
use kai_resolver::models::TrackType;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

pub fn command() -> Command {
    Command::new("kai")
        .about("Resolve an anime episode into ranked, playable streams")
        .arg(
            Arg::new("anime")
                .help("Anime page url, e.g. https://animekai.to/watch/frieren-x1")
                .required(true),
        )
        .arg(
            Arg::new("number")
                .short('e')
                .long("episode")
                .help("Episode number (asks when omitted)")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("quality")
                .short('q')
                .long("quality")
                .help("Preferred quality, e.g. 1080p"),
        )
        .arg(
            Arg::new("server")
                .short('s')
                .long("server")
                .help("Preferred server name, e.g. \"Server 1\""),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .help("Preferred track type")
                .value_parser(["sub", "dub", "softsub"]),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the ranked streams as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("play")
                .short('p')
                .long("play")
                .help("Play the top ranked stream with the configured player")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Also log to the terminal")
                .action(ArgAction::SetTrue),
        )
}

// Command line preferences win over the config file for this run
pub fn apply_overrides(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    if let Some(quality) = matches.get_one::<String>("quality") {
        config.quality = quality.clone();
    }
    if let Some(server) = matches.get_one::<String>("server") {
        config.server = server.clone();
    }
    if let Some(track_type) = matches.get_one::<String>("type") {
        let track_type = track_type
            .parse::<TrackType>()
            .map_err(|e| anyhow::anyhow!(e))?;
        config.track_type = track_type.as_str().to_string();
    }
    Ok(())
}
