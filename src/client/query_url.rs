//! Avatar URL validation and deep-link parsing.

use reqwest::Url;

use crate::models::RenderDirection;

/// A validated avatar URL.
///
/// Only absolute http/https URLs qualify; query and fragment are stripped so
/// the remaining URL addresses the collection itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryUrl {
    avatar_url: String,
}

impl QueryUrl {
    /// Parse a candidate avatar URL. Returns `None` for anything that is not
    /// an absolute http(s) URL.
    pub fn try_parse(candidate: &str) -> Option<Self> {
        let mut url = Url::parse(candidate).ok()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }
        url.set_query(None);
        url.set_fragment(None);
        let mut avatar_url = url.to_string();
        while avatar_url.ends_with('/') {
            avatar_url.pop();
        }
        Some(Self { avatar_url })
    }

    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }
}

/// Session-start parameters carried in a deep link.
///
/// An invalid or non-http(s) `avatarUrl` value is ignored, leaving
/// `avatar_url` unset (and the tree unpopulated).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLink {
    pub direction: Option<RenderDirection>,
    pub avatar_url: Option<String>,
    pub region_id: Option<String>,
    pub postsynaptic: Vec<String>,
}

impl DeepLink {
    /// Parse the recognized query parameters out of a link. Parameter names are
    /// matched case-insensitively; unknown parameters are ignored.
    pub fn parse(link: &str) -> Self {
        let mut deep_link = Self::default();
        let Ok(url) = Url::parse(link) else {
            return deep_link;
        };
        for (key, value) in url.query_pairs() {
            match key.to_ascii_lowercase().as_str() {
                "direction" => deep_link.direction = RenderDirection::from_str(&value),
                "avatarurl" => {
                    deep_link.avatar_url =
                        QueryUrl::try_parse(&value).map(|q| q.avatar_url().to_string());
                }
                "regionid" => deep_link.region_id = Some(value.into_owned()),
                "postsynaptic" => deep_link.postsynaptic.push(value.into_owned()),
                _ => {}
            }
        }
        deep_link
    }
}

/// Re-encode an avatar URL as a shareable link on `base_url`.
pub fn build_avatar_link(base_url: &str, avatar_url: &str) -> Option<String> {
    let mut url = Url::parse(base_url).ok()?;
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair("avatarUrl", avatar_url);
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_only() {
        assert!(QueryUrl::try_parse("http://avatar.example/cortex").is_some());
        assert!(QueryUrl::try_parse("https://avatar.example/cortex").is_some());
        assert!(QueryUrl::try_parse("ftp://avatar.example/cortex").is_none());
        assert!(QueryUrl::try_parse("not a url").is_none());
    }

    #[test]
    fn strips_query_and_trailing_slash() {
        let parsed = QueryUrl::try_parse("https://avatar.example/cortex/?x=1").expect("valid");
        assert_eq!(parsed.avatar_url(), "https://avatar.example/cortex");
    }

    #[test]
    fn parses_deep_link_parameters() {
        let link = "https://app.example/tree?direction=BottomToTop\
                    &avatarUrl=https%3A%2F%2Favatar.example%2Fcortex\
                    &regionId=r1&postsynaptic=p1&postsynaptic=p2";
        let deep_link = DeepLink::parse(link);
        assert_eq!(deep_link.direction, Some(RenderDirection::BottomToTop));
        assert_eq!(
            deep_link.avatar_url.as_deref(),
            Some("https://avatar.example/cortex")
        );
        assert_eq!(deep_link.region_id.as_deref(), Some("r1"));
        assert_eq!(deep_link.postsynaptic, vec!["p1", "p2"]);
    }

    #[test]
    fn ignores_invalid_avatar_url_parameter() {
        let deep_link = DeepLink::parse("https://app.example/tree?avatarUrl=file%3A%2F%2Fetc");
        assert!(deep_link.avatar_url.is_none());
    }

    #[test]
    fn builds_shareable_link() {
        let link = build_avatar_link("https://app.example/tree?old=1", "https://avatar.example/cortex")
            .expect("valid base");
        assert_eq!(
            link,
            "https://app.example/tree?avatarUrl=https%3A%2F%2Favatar.example%2Fcortex"
        );
    }
}
