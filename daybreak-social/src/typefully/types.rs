use serde::{Deserialize, Deserializer, Serialize};

/// Identifiers arrive as numbers or strings depending on the resource; the
/// client only ever splices them into URL paths, so normalize to `String`.
fn de_id_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(u64),
        Str(String),
    }
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => n.to_string(),
        IdRepr::Str(s) => s,
    })
}

fn de_opt_id_to_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(u64),
        Str(String),
    }
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(|id| match id {
        IdRepr::Num(n) => n.to_string(),
        IdRepr::Str(s) => s,
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialSetsResponse {
    #[serde(default)]
    pub results: Vec<SocialSet>,
}

/// A posting account (profile group) on the publisher side.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialSet {
    #[serde(deserialize_with = "de_id_to_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Reserved upload slot: where to PUT the bytes and the id to poll after.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaSlot {
    #[serde(deserialize_with = "de_id_to_string")]
    pub media_id: String,
    pub upload_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaStatusResponse {
    pub status: MediaStatus,
}

/// Server-side processing state of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaStatus {
    Ready,
    Failed,
    Processing,
    /// Unrecognized status; the poll loop keeps waiting on these.
    Other(String),
}

impl<'de> Deserialize<'de> for MediaStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_ascii_lowercase().as_str() {
            "ready" => MediaStatus::Ready,
            "failed" => MediaStatus::Failed,
            "processing" => MediaStatus::Processing,
            _ => MediaStatus::Other(raw),
        })
    }
}

/// Outcome of waiting for an upload to finish processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaReadiness {
    /// Processing confirmed; the id is safe to attach to a draft.
    Ready(String),
    Failed,
    /// Never reached `ready` within the poll budget.
    TimedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftRequest {
    pub platforms: Platforms,
    pub publish_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Platforms {
    pub x: XPlatform,
}

#[derive(Debug, Clone, Serialize)]
pub struct XPlatform {
    pub enabled: bool,
    pub posts: Vec<DraftPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftPost {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftResponse {
    #[serde(default, deserialize_with = "de_opt_id_to_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub share_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn social_set_id_accepts_numbers_and_strings() {
        let numeric: SocialSet = serde_json::from_str(r#"{"id": 42, "name": "main"}"#).unwrap();
        assert_eq!(numeric.id, "42");

        let string: SocialSet = serde_json::from_str(r#"{"id": "ss_abc"}"#).unwrap();
        assert_eq!(string.id, "ss_abc");
        assert!(string.name.is_none());
    }

    #[test]
    fn media_status_decodes_case_insensitively() {
        let ready: MediaStatusResponse = serde_json::from_str(r#"{"status": "READY"}"#).unwrap();
        assert_eq!(ready.status, MediaStatus::Ready);

        let odd: MediaStatusResponse = serde_json::from_str(r#"{"status": "queued"}"#).unwrap();
        assert_eq!(odd.status, MediaStatus::Other("queued".to_string()));
    }

    #[test]
    fn draft_post_omits_media_ids_when_absent() {
        let bare = DraftPost {
            text: "gm".to_string(),
            media_ids: None,
        };
        let json = serde_json::to_string(&bare).unwrap();
        assert_eq!(json, r#"{"text":"gm"}"#);

        let with_media = DraftPost {
            text: "gm".to_string(),
            media_ids: Some(vec!["m-1".to_string()]),
        };
        let json = serde_json::to_string(&with_media).unwrap();
        assert!(json.contains(r#""media_ids":["m-1"]"#));
    }

    #[test]
    fn draft_response_id_normalizes_to_string() {
        let resp: DraftResponse =
            serde_json::from_str(r#"{"id": 9000, "share_url": "https://typefully.com/t/x"}"#)
                .unwrap();
        assert_eq!(resp.id.as_deref(), Some("9000"));
    }
}
