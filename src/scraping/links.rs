// Per-server chain: server id -> token -> encoded link -> iframe url

// =============== Imports ================
use super::ResolverSettings;
use super::fragment;
use super::oracle;
use super::transport::{Transport, api_headers};
use crate::error::{ResolveError, Result};
use crate::models::{ResolvedLink, ServerEntry};

use futures::{StreamExt, future, stream};

/// Resolves every entry with at most `settings.concurrency` chains in
/// flight. A failing hop drops its entry and nothing else; the result keeps
/// input order.
pub async fn resolve_links<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    entries: &[ServerEntry],
    referer: &str,
) -> Vec<ResolvedLink> {
    stream::iter(entries)
        .map(|entry| async move {
            match resolve_one(transport, settings, entry, referer).await {
                Ok(link) => Some(link),
                Err(e) => {
                    log::warn!("Dropping server {}: {}", entry.label(), e);
                    None
                }
            }
        })
        .buffered(settings.concurrency.max(1))
        .filter_map(future::ready)
        .collect()
        .await
}

pub async fn resolve_one<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    entry: &ServerEntry,
    referer: &str,
) -> Result<ResolvedLink> {
    let token = oracle::exchange(transport, settings, &entry.server_id, referer).await?;

    let url = format!(
        "{}/ajax/links/view?id={}&_={}",
        settings.site(),
        urlencoding::encode(&entry.server_id),
        urlencoding::encode(&token)
    );
    let body = transport
        .get(&url, &api_headers(referer, &settings.user_agent))
        .await?;
    let encoded = fragment::result_string(&body, "link view")?
        .ok_or_else(|| ResolveError::decode("link view", "null or blank result"))?;

    let iframe = oracle::decrypt_link(transport, settings, &encoded, referer).await?;
    log::debug!("{} -> {}", entry.label(), iframe.url);

    Ok(ResolvedLink {
        iframe_url: iframe.url,
        label: entry.label(),
        skip: iframe.skip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackType;
    use crate::scraping::transport::stub::{InFlightTransport, StubTransport};
    use std::time::Duration;

    const ENC: &str = "https://enc-dec.app/api/enc-kai";
    const DEC: &str = "https://enc-dec.app/api/dec-kai";
    const VIEW: &str = "https://animekai.to/ajax/links/view";
    const REF: &str = "https://animekai.to/watch/frieren-x1";

    fn entry(id: &str, name: &str) -> ServerEntry {
        ServerEntry {
            track_type: TrackType::Sub,
            server_id: id.to_string(),
            server_name: name.to_string(),
        }
    }

    fn chain(stub: StubTransport, id: &str) -> StubTransport {
        stub.on_get(&format!("{ENC}?text={id}"), &format!(r#"{{"result":"tok-{id}"}}"#))
            .on_get(
                &format!("{VIEW}?id={id}&_=tok-{id}"),
                &format!(r#"{{"result":"enc-{id}"}}"#),
            )
            .on_post(
                DEC,
                &format!("enc-{id}"),
                &format!(r#"{{"result":{{"url":"https://megaup.cc/e/{id}"}}}}"#),
            )
    }

    #[tokio::test]
    async fn resolves_each_entry_through_three_hops() {
        let stub = chain(chain(StubTransport::new(), "a"), "b");
        let settings = ResolverSettings::default();
        let entries = [entry("a", "Server 1"), entry("b", "Server 2")];

        let links = resolve_links(&stub, &settings, &entries, REF).await;

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].iframe_url, "https://megaup.cc/e/a");
        assert_eq!(links[0].label, "Hard Sub | Server 1");
        assert_eq!(links[1].iframe_url, "https://megaup.cc/e/b");
        assert!(stub.calls().iter().all(|c| c.referer.as_deref() == Some(REF)));
    }

    #[tokio::test]
    async fn null_link_view_drops_only_that_entry() {
        let stub = chain(chain(StubTransport::new(), "a"), "c")
            .on_get(&format!("{ENC}?text=b"), r#"{"result":"tok-b"}"#)
            .on_get(&format!("{VIEW}?id=b&_=tok-b"), r#"{"result":null}"#);
        let settings = ResolverSettings::default();
        let entries = [entry("a", "Server 1"), entry("b", "Server 2"), entry("c", "Server 3")];

        let links = resolve_links(&stub, &settings, &entries, REF).await;

        let mut urls: Vec<_> = links.iter().map(|l| l.iframe_url.as_str()).collect();
        urls.sort();
        assert_eq!(urls, ["https://megaup.cc/e/a", "https://megaup.cc/e/c"]);
        // nothing after the failed hop was attempted for "b"
        assert!(!stub.calls().iter().any(|c| c.text.as_deref() == Some("enc-b")));
    }

    #[tokio::test]
    async fn failed_token_never_reaches_link_view() {
        let stub = StubTransport::new();
        let settings = ResolverSettings::default();

        let links = resolve_links(&stub, &settings, &[entry("a", "Server 1")], REF).await;

        assert!(links.is_empty());
        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "GET");
        assert!(calls[0].url.starts_with(ENC));
    }

    #[tokio::test]
    async fn chains_in_flight_stay_under_the_limit() {
        let mut stub = StubTransport::new();
        let ids = ["a", "b", "c", "d", "e"];
        for id in ids {
            stub = chain(stub, id);
        }
        let transport = InFlightTransport::new(stub, Duration::from_millis(20));
        let settings = ResolverSettings {
            concurrency: 2,
            ..ResolverSettings::default()
        };
        let entries: Vec<_> = ids.iter().map(|id| entry(id, "Server 1")).collect();

        let links = resolve_links(&transport, &settings, &entries, REF).await;

        assert_eq!(links.len(), 5);
        assert_eq!(links[4].iframe_url, "https://megaup.cc/e/e");
        assert!(transport.peak() <= settings.concurrency);
        assert_eq!(transport.peak(), 2);
    }

    #[tokio::test]
    async fn identical_responses_give_identical_links() {
        let stub = chain(StubTransport::new(), "a");
        let settings = ResolverSettings::default();
        let entries = [entry("a", "Server 1")];

        let first = resolve_links(&stub, &settings, &entries, REF).await;
        let second = resolve_links(&stub, &settings, &entries, REF).await;

        assert_eq!(first, second);
    }
}
