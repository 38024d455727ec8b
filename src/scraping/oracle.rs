// Client for the external encode/decode service. Its algorithm is none of our
// business, we only send ids/blobs in and read results out.

// =============== Imports ================
use super::ResolverSettings;
use super::fragment;
use super::transport::{Transport, api_headers};
use crate::error::{ResolveError, Result};
use crate::models::SkipTimes;

use serde::Deserialize;
use serde_json::json;

/// Stage-1 decrypt result: the embed iframe for one server.
#[derive(Debug, Deserialize)]
pub struct IframeResult {
    pub url: String,
    #[serde(default)]
    pub skip: Option<SkipTimes>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaSource {
    pub file: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaTrack {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub default: bool,
}

/// Stage-2 decrypt result: raw sources and subtitle tracks.
#[derive(Debug, Default, Deserialize)]
pub struct MediaResult {
    #[serde(default)]
    pub sources: Vec<MediaSource>,
    #[serde(default)]
    pub tracks: Vec<MediaTrack>,
}

/// Exchanges a site id for a short-lived token. Every failure, including a
/// transport error, is reported as `TokenUnavailable` for that id.
pub async fn exchange<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    id: &str,
    referer: &str,
) -> Result<String> {
    let url = format!(
        "{}?text={}",
        settings.oracle_endpoint(&settings.encode_path),
        urlencoding::encode(id)
    );
    let unavailable = |reason: String| ResolveError::TokenUnavailable {
        id: id.to_string(),
        reason,
    };

    let body = transport
        .get(&url, &api_headers(referer, &settings.user_agent))
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    match fragment::result_string(&body, "token exchange") {
        Ok(Some(token)) => Ok(token),
        Ok(None) => Err(unavailable("null or blank result".to_string())),
        Err(e) => Err(unavailable(e.to_string())),
    }
}

/// Turns an encoded link from `links/view` into the embed iframe url.
pub async fn decrypt_link<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    encoded: &str,
    referer: &str,
) -> Result<IframeResult> {
    let url = settings.oracle_endpoint(&settings.decode_path);
    let body = transport
        .post_json(
            &url,
            &api_headers(referer, &settings.user_agent),
            &json!({ "text": encoded }),
        )
        .await?;

    let iframe: IframeResult = fragment::oracle_payload(&body, "decrypted link")?;
    if iframe.url.trim().is_empty() {
        return Err(ResolveError::decode("decrypted link", "empty iframe url"));
    }
    Ok(iframe)
}

/// Decodes the media token into the manifest. The user agent has to be the
/// same one used for the media request.
pub async fn decrypt_media<T: Transport + ?Sized>(
    transport: &T,
    settings: &ResolverSettings,
    media_token: &str,
    iframe_url: &str,
) -> Result<MediaResult> {
    let url = settings.oracle_endpoint(&settings.decode_media_path);
    let body = transport
        .post_json(
            &url,
            &api_headers(iframe_url, &settings.user_agent),
            &json!({ "text": media_token, "agent": settings.user_agent }),
        )
        .await?;

    fragment::oracle_payload(&body, "media manifest")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::transport::stub::StubTransport;

    const ENC: &str = "https://enc-dec.app/api/enc-kai";
    const DEC: &str = "https://enc-dec.app/api/dec-kai";
    const REF: &str = "https://animekai.to/watch/frieren-x1";

    #[tokio::test]
    async fn exchange_returns_token_and_sends_referer() {
        let stub = StubTransport::new().on_get(&format!("{}?text=lid%2F1", ENC), r#"{"result":"tok"}"#);
        let settings = ResolverSettings::default();

        let token = exchange(&stub, &settings, "lid/1", REF).await.unwrap();

        assert_eq!(token, "tok");
        assert_eq!(stub.calls()[0].referer.as_deref(), Some(REF));
    }

    #[tokio::test]
    async fn exchange_maps_every_failure_to_token_unavailable() {
        let stub = StubTransport::new().on_get(&format!("{}?text=empty", ENC), r#"{"result":null}"#);
        let settings = ResolverSettings::default();

        for id in ["empty", "unrouted"] {
            let err = exchange(&stub, &settings, id, REF).await.unwrap_err();
            assert!(matches!(err, ResolveError::TokenUnavailable { .. }), "{id}: {err}");
        }
    }

    #[tokio::test]
    async fn decrypt_link_reads_skip_markers() {
        let stub = StubTransport::new().on_post(
            DEC,
            "blob",
            r#"{"result":{"url":"https://megaup.cc/e/xyz","skip":{"intro":[10,95],"outro":[1300,1390]}}}"#,
        );
        let settings = ResolverSettings::default();

        let iframe = decrypt_link(&stub, &settings, "blob", REF).await.unwrap();

        assert_eq!(iframe.url, "https://megaup.cc/e/xyz");
        let skip = iframe.skip.unwrap();
        assert_eq!(skip.intro, Some([10, 95]));
        assert_eq!(skip.outro, Some([1300, 1390]));
    }

    #[tokio::test]
    async fn decrypt_link_rejects_blank_url() {
        let stub = StubTransport::new().on_post(DEC, "blob", r#"{"result":{"url":""}}"#);
        let settings = ResolverSettings::default();

        assert!(decrypt_link(&stub, &settings, "blob", REF).await.is_err());
    }
}
