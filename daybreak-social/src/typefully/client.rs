//! Minimal wrapper around the Typefully v2 API with Daybreak defaults.
//!
//! Handles auth and request shaping before delegating to the shared HTTP
//! client. The media upload is a three-step dance (reserve slot, PUT bytes,
//! poll status); [`TypefullyClient::upload_media`] runs all three.

use crate::typefully::types::{
    DraftPost, DraftRequest, DraftResponse, MediaReadiness, MediaSlot, MediaStatus,
    MediaStatusResponse, Platforms, SocialSet, SocialSetsResponse, XPlatform,
};
use daybreak_common::{DaybreakError, Result};
use daybreak_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

const TYPEFULLY_API_BASE: &str = "https://api.typefully.com/";

/// Processing rarely takes more than a few seconds; ten one-second polls is
/// plenty of margin for a scheduled run.
const MEDIA_POLL_ATTEMPTS: usize = 10;
const MEDIA_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MEDIA_TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct TypefullyClient {
    http: HttpClient,
    api_key: String,
    poll_attempts: usize,
    poll_interval: Duration,
}

impl TypefullyClient {
    /// Create a new client. `endpoint` overrides the public API base
    /// (gateways, tests); `None` uses the real one.
    pub fn new(api_key: String, endpoint: Option<&str>) -> Result<Self> {
        let http = HttpClient::new(endpoint.unwrap_or(TYPEFULLY_API_BASE))
            .map_err(http_to_publisher)?;
        Ok(Self {
            http,
            api_key,
            poll_attempts: MEDIA_POLL_ATTEMPTS,
            poll_interval: MEDIA_POLL_INTERVAL,
        })
    }

    /// Override the media poll budget set by [`TypefullyClient::new`].
    pub fn with_media_polling(mut self, attempts: usize, interval: Duration) -> Self {
        self.poll_attempts = attempts;
        self.poll_interval = interval;
        self
    }

    fn auth_opts(&self) -> RequestOpts<'_> {
        RequestOpts {
            auth: Some(Auth::Bearer(&self.api_key)),
            ..Default::default()
        }
    }

    /// All social sets (posting accounts) visible to this API key.
    pub async fn social_sets(&self) -> Result<Vec<SocialSet>> {
        let resp: SocialSetsResponse = self
            .http
            .get_json("v2/social-sets", self.auth_opts())
            .await
            .map_err(http_to_publisher)?;
        Ok(resp.results)
    }

    /// The account everything gets posted to: the first social set the API
    /// returns. No sets at all means the key cannot publish anywhere.
    pub async fn first_social_set(&self) -> Result<SocialSet> {
        let mut sets = self.social_sets().await?;
        if sets.is_empty() {
            return Err(DaybreakError::Publisher(
                "no social sets available for this API key".to_string(),
            ));
        }
        let set = sets.remove(0);
        tracing::debug!(set_id = %set.id, name = set.name.as_deref().unwrap_or("-"), "using social set");
        Ok(set)
    }

    /// Reserve an upload slot: returns the media id and a presigned URL to
    /// PUT the file bytes to.
    pub async fn request_upload(&self, set_id: &str, file_name: &str) -> Result<MediaSlot> {
        let path = format!("v2/social-sets/{set_id}/media/upload");
        self.http
            .post_json_opts(&path, &json!({ "file_name": file_name }), self.auth_opts())
            .await
            .map_err(http_to_publisher)
    }

    /// PUT the file bytes to the presigned URL. The URL is absolute and
    /// carries its own auth; no bearer header here.
    pub async fn transfer_media(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.http
            .put_bytes(
                upload_url,
                bytes,
                content_type,
                RequestOpts {
                    allow_absolute: true,
                    timeout: Some(MEDIA_TRANSFER_TIMEOUT),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_publisher)
    }

    pub async fn media_status(&self, set_id: &str, media_id: &str) -> Result<MediaStatus> {
        let path = format!("v2/social-sets/{set_id}/media/{media_id}");
        let resp: MediaStatusResponse = self
            .http
            .get_json(
                &path,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_publisher)?;
        Ok(resp.status)
    }

    /// Fixed-interval status polling: no backoff, no jitter. A poll that
    /// errors burns its attempt and the loop keeps going; only an explicit
    /// `failed` status aborts early. Exhausting the budget is `TimedOut`,
    /// which callers must treat as "do not attach this media".
    pub async fn await_media_ready(&self, set_id: &str, media_id: &str) -> MediaReadiness {
        let attempts = self.poll_attempts;
        let interval = self.poll_interval;
        for attempt in 1..=attempts {
            match self.media_status(set_id, media_id).await {
                Ok(MediaStatus::Ready) => {
                    tracing::info!(media_id, attempt, "media ready");
                    return MediaReadiness::Ready(media_id.to_string());
                }
                Ok(MediaStatus::Failed) => {
                    tracing::warn!(media_id, attempt, "media processing failed");
                    return MediaReadiness::Failed;
                }
                Ok(status) => {
                    tracing::debug!(media_id, attempt, ?status, "media not ready yet");
                }
                Err(err) => {
                    tracing::warn!(media_id, attempt, %err, "media status poll failed");
                }
            }
            if attempt < attempts {
                sleep(interval).await;
            }
        }
        tracing::warn!(media_id, attempts, "media never became ready");
        MediaReadiness::TimedOut
    }

    /// Reserve, transfer, and wait: the full upload flow for one file.
    pub async fn upload_media(
        &self,
        set_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<MediaReadiness> {
        let slot = self.request_upload(set_id, file_name).await?;
        tracing::debug!(media_id = %slot.media_id, file_name, "upload slot reserved");
        self.transfer_media(&slot.upload_url, bytes, content_type)
            .await?;
        Ok(self.await_media_ready(set_id, &slot.media_id).await)
    }

    /// Create a draft on the X platform and publish it immediately.
    pub async fn create_draft(
        &self,
        set_id: &str,
        text: &str,
        media_ids: Option<Vec<String>>,
    ) -> Result<DraftResponse> {
        let req = DraftRequest {
            platforms: Platforms {
                x: XPlatform {
                    enabled: true,
                    posts: vec![DraftPost {
                        text: text.to_string(),
                        media_ids,
                    }],
                },
            },
            publish_at: "now".to_string(),
        };

        // Single attempt: a retry after an ambiguous failure could publish
        // the same post twice.
        let path = format!("v2/social-sets/{set_id}/drafts");
        let resp: DraftResponse = self
            .http
            .post_json_opts(
                &path,
                &req,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_publisher)?;
        tracing::info!(
            set_id,
            draft_id = resp.id.as_deref().unwrap_or("-"),
            "draft submitted"
        );
        Ok(resp)
    }
}

fn http_to_publisher(e: HttpError) -> DaybreakError {
    DaybreakError::Publisher(format!("{e}"))
}
