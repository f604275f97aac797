//! Promotion of inline base64 images into stored files.
//!
//! Rich-text editors embed pasted images as `<img src="data:image/png;base64,...">`.
//! Before content is persisted each such image is stored as a [`File`] and the `src`
//! attribute is rewritten to the file's URL. Everything else in the content is left
//! byte-for-byte untouched.
//!
//! [`File`]: crate::features::files::models::File

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::FileSource;

lazy_static! {
    static ref IMG_TAG: Regex = Regex::new(r"(?i)<img\b[^>]*>").unwrap();
    // The attribute name must start after whitespace, so `data-src` is skipped
    static ref SRC_ATTR: Regex =
        Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
    static ref DATA_URI: Regex = Regex::new(r"(?s)^data:(image/[\w.+-]+);base64,(.*)$").unwrap();
}

/// A base64 image found in content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Byte range of the `src` attribute value (without quotes)
    pub start: usize,
    pub end: usize,
    pub mime_type: String,
    /// Base64 payload as written in the content
    pub data: String,
}

/// Find every `<img>` whose `src` is a base64 `data:image/*` URI
pub fn find_inline_images(content: &str) -> Vec<InlineImage> {
    let mut images = Vec::new();

    for tag in IMG_TAG.find_iter(content) {
        let Some(captures) = SRC_ATTR.captures(tag.as_str()) else {
            continue;
        };
        let Some(value) = captures.get(1).or_else(|| captures.get(2)) else {
            continue;
        };
        let Some(uri) = DATA_URI.captures(value.as_str()) else {
            continue;
        };

        images.push(InlineImage {
            start: tag.start() + value.start(),
            end: tag.start() + value.end(),
            mime_type: uri[1].to_ascii_lowercase(),
            data: uri[2].to_string(),
        });
    }

    images
}

/// Decode a base64 payload, ignoring embedded whitespace
pub fn decode_data_uri(data: &str) -> Result<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 image data: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Empty image data".to_string()));
    }

    Ok(bytes)
}

/// Destination for promoted images
#[async_trait]
pub trait InlineImageSink: Send + Sync {
    /// Store the image and return the URL that replaces the data URI
    async fn store_inline_image(
        &self,
        owner_id: Uuid,
        mime_type: &str,
        data: Vec<u8>,
        source: &FileSource,
    ) -> Result<String>;
}

/// Outcome of a promotion pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotedContent {
    pub content: String,
    pub promoted: usize,
    pub failed: usize,
}

/// Replace every inline base64 image in `content` with a stored file URL.
///
/// An image that fails to decode or store keeps its original data URI; the
/// remaining images are still promoted.
pub async fn promote_inline_images(
    content: &str,
    owner_id: Uuid,
    source: &FileSource,
    sink: &dyn InlineImageSink,
) -> PromotedContent {
    let images = find_inline_images(content);
    if images.is_empty() {
        return PromotedContent {
            content: content.to_string(),
            promoted: 0,
            failed: 0,
        };
    }

    let mut output = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut promoted = 0;
    let mut failed = 0;

    for (index, image) in images.iter().enumerate() {
        output.push_str(&content[cursor..image.start]);

        let stored = match decode_data_uri(&image.data) {
            Ok(bytes) => {
                sink.store_inline_image(owner_id, &image.mime_type, bytes, source)
                    .await
            }
            Err(e) => Err(e),
        };

        match stored {
            Ok(url) => {
                output.push_str(&url);
                promoted += 1;
            }
            Err(e) => {
                warn!(
                    "Failed to promote inline image #{} ({}) for {:?}: {}",
                    index + 1,
                    image.mime_type,
                    source.kind,
                    e
                );
                output.push_str(&content[image.start..image.end]);
                failed += 1;
            }
        }

        cursor = image.end;
    }
    output.push_str(&content[cursor..]);

    debug!(
        "Inline image promotion: {} promoted, {} failed",
        promoted, failed
    );

    PromotedContent {
        content: output,
        promoted,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    use crate::features::files::models::FileSourceType;

    /// Stores nothing; fails on the calls listed in `fail_on` (1-based)
    struct FakeSink {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
        received: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl FakeSink {
        fn new(fail_on: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InlineImageSink for FakeSink {
        async fn store_inline_image(
            &self,
            _owner_id: Uuid,
            mime_type: &str,
            data: Vec<u8>,
            _source: &FileSource,
        ) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&call) {
                return Err(AppError::Internal("disk full".to_string()));
            }
            self.received.lock().await.push((mime_type.to_string(), data));
            Ok(format!("http://localhost:5001/uploads/u/{}.png", call))
        }
    }

    fn source() -> FileSource {
        FileSource::for_entity(FileSourceType::NewsContent, Uuid::from_u128(9), "Launch")
    }

    fn png(payload: &[u8]) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(payload))
    }

    #[test]
    fn test_find_inline_images_single_and_double_quotes() {
        let content = format!(
            r#"<p>a</p><img class="x" src="{}"><IMG alt='b' SRC='{}' />"#,
            png(b"one"),
            png(b"two")
        );

        let images = find_inline_images(&content);
        assert_eq!(images.len(), 2);
        assert_eq!(&content[images[0].start..images[0].end], png(b"one"));
        assert_eq!(&content[images[1].start..images[1].end], png(b"two"));
        assert_eq!(images[0].mime_type, "image/png");
    }

    #[test]
    fn test_find_inline_images_ignores_urls_and_non_images() {
        let content = r#"<img src="https://cdn.example.com/a.png"><img src="data:text/plain;base64,aGk="><img alt="no src">"#;
        assert!(find_inline_images(content).is_empty());
    }

    #[test]
    fn test_find_inline_images_skips_data_src_attribute() {
        let content = format!(
            r#"<img data-src="https://cdn.example.com/x.png" src="{}">"#,
            png(b"hello")
        );

        let images = find_inline_images(&content);
        assert_eq!(images.len(), 1);
        assert_eq!(&content[images[0].start..images[0].end], png(b"hello"));

        let lazy_only = r#"<img data-src="data:image/png;base64,aGVsbG8=" src="/x.png">"#;
        assert!(find_inline_images(lazy_only).is_empty());
    }

    #[tokio::test]
    async fn test_promotion_after_data_src_leaves_no_base64_source() {
        let content = format!(
            r#"<img data-src="https://cdn.example.com/x.png" src="{}">"#,
            png(b"hello")
        );
        let sink = FakeSink::new(vec![]);

        let result = promote_inline_images(&content, Uuid::from_u128(1), &source(), &sink).await;

        assert_eq!(result.promoted, 1);
        assert_eq!(
            result.content,
            r#"<img data-src="https://cdn.example.com/x.png" src="http://localhost:5001/uploads/u/1.png">"#
        );
    }

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(decode_data_uri("aGVs\nbG8=").unwrap(), b"hello");
        assert!(decode_data_uri("not base64!").is_err());
        assert!(decode_data_uri("").is_err());
    }

    #[tokio::test]
    async fn test_promotes_every_image_and_preserves_attributes() {
        let content = format!(
            r#"<h1>Title</h1><img width="300" src="{}" alt="first"><p>middle</p><img src='{}'>"#,
            png(b"first"),
            png(b"second")
        );
        let sink = FakeSink::new(vec![]);

        let result = promote_inline_images(&content, Uuid::from_u128(1), &source(), &sink).await;

        assert_eq!(result.promoted, 2);
        assert_eq!(result.failed, 0);
        assert_eq!(
            result.content,
            r#"<h1>Title</h1><img width="300" src="http://localhost:5001/uploads/u/1.png" alt="first"><p>middle</p><img src='http://localhost:5001/uploads/u/2.png'>"#
        );
        assert!(!result.content.contains("base64"));

        let received = sink.received.lock().await;
        assert_eq!(received[0], ("image/png".to_string(), b"first".to_vec()));
        assert_eq!(received[1].1, b"second".to_vec());
    }

    #[tokio::test]
    async fn test_failed_images_keep_their_data_uri() {
        let images: Vec<String> = (0..4).map(|i| png(format!("img{}", i).as_bytes())).collect();
        let content: String = images
            .iter()
            .map(|uri| format!(r#"<img src="{}">"#, uri))
            .collect();
        let sink = FakeSink::new(vec![2, 4]);

        let result = promote_inline_images(&content, Uuid::from_u128(1), &source(), &sink).await;

        assert_eq!(result.promoted, 2);
        assert_eq!(result.failed, 2);
        assert!(result.content.contains("uploads/u/1.png"));
        assert!(result.content.contains("uploads/u/3.png"));
        assert!(result.content.contains(&images[1]));
        assert!(result.content.contains(&images[3]));
    }

    #[tokio::test]
    async fn test_undecodable_image_is_left_in_place() {
        let content = r#"<img src="data:image/png;base64,@@@@">"#;
        let sink = FakeSink::new(vec![]);

        let result = promote_inline_images(content, Uuid::from_u128(1), &source(), &sink).await;

        assert_eq!(result.content, content);
        assert_eq!(result.failed, 1);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_content_without_images_is_unchanged() {
        let content = "plain **markdown** with ![alt](http://x/y.png)";
        let sink = FakeSink::new(vec![]);

        let result = promote_inline_images(content, Uuid::from_u128(1), &source(), &sink).await;

        assert_eq!(result.content, content);
        assert_eq!(result.promoted, 0);
    }
}
