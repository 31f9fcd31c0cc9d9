use futures_util::StreamExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("body is larger than {limit} bytes")]
    TooLarge { limit: u64 },
}

/// Where a story or avatar URL points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSource<'a> {
    /// http(s), fetched with reqwest.
    Remote(&'a str),
    /// Anything GIO can open directly (file:// and friends).
    Local(&'a str),
}

impl<'a> MediaSource<'a> {
    pub fn classify(url: &'a str) -> Self {
        let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            MediaSource::Remote(url)
        } else {
            MediaSource::Local(url)
        }
    }
}

/// Download `url` into memory, giving up once the body grows past `limit`.
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    limit: u64,
) -> Result<Vec<u8>, MediaError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(MediaError::Status(response.status()));
    }
    if response.content_length().is_some_and(|len| len > limit) {
        return Err(MediaError::TooLarge { limit });
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(MediaError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    log::debug!("fetched {} ({} bytes)", url, body.len());
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_urls() {
        assert_eq!(
            MediaSource::classify("https://example.com/a.jpg"),
            MediaSource::Remote("https://example.com/a.jpg")
        );
        assert_eq!(
            MediaSource::classify("HTTP://example.com/a.jpg"),
            MediaSource::Remote("HTTP://example.com/a.jpg")
        );
        assert_eq!(
            MediaSource::classify("file:///home/me/a.png"),
            MediaSource::Local("file:///home/me/a.png")
        );
        assert_eq!(MediaSource::classify("http"), MediaSource::Local("http"));
    }

    #[test]
    fn video_story_urls_split_like_images() {
        let remote = "https://cdn.example.com/clips/story.mp4";
        assert_eq!(MediaSource::classify(remote), MediaSource::Remote(remote));
        let picked = "file:///home/me/Videos/story.mp4";
        assert_eq!(MediaSource::classify(picked), MediaSource::Local(picked));
    }
}
