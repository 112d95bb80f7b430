//! Exercise detail pages: media and written content fetched side by side.
//!
//! Media (images, demo video) and content (description, cues) live in
//! separate services. Both lookups run concurrently. A failed lookup
//! degrades to `None` for its half and is logged; it never fails the
//! other half.

use crate::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseMedia {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Everything known about one exercise beyond its catalog entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDetails {
    pub exercise_id: String,
    pub media: Option<ExerciseMedia>,
    pub content: Option<ExerciseContent>,
}

impl ExerciseDetails {
    pub fn is_empty(&self) -> bool {
        self.media.is_none() && self.content.is_none()
    }
}

/// Media service; `Ok(None)` when it has nothing for the exercise
pub trait MediaLookup: Send + Sync {
    fn media(&self, exercise_id: String) -> BoxFuture<'static, Result<Option<ExerciseMedia>>>;
}

/// Content service; `Ok(None)` when it has nothing for the exercise
pub trait ContentLookup: Send + Sync {
    fn content(&self, exercise_id: String) -> BoxFuture<'static, Result<Option<ExerciseContent>>>;
}

/// Fetch media and content for `exercise_id` concurrently
pub async fn enrich_exercise<M, C>(exercise_id: &str, media: &M, content: &C) -> ExerciseDetails
where
    M: MediaLookup + ?Sized,
    C: ContentLookup + ?Sized,
{
    let (media_result, content_result) = tokio::join!(
        media.media(exercise_id.to_string()),
        content.content(exercise_id.to_string()),
    );

    ExerciseDetails {
        exercise_id: exercise_id.to_string(),
        media: media_result.unwrap_or_else(|e| {
            tracing::warn!("Media lookup for {} failed: {}", exercise_id, e);
            None
        }),
        content: content_result.unwrap_or_else(|e| {
            tracing::warn!("Content lookup for {} failed: {}", exercise_id, e);
            None
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::time::Duration;

    struct FakeMedia {
        latency: Duration,
        fail: bool,
    }

    impl MediaLookup for FakeMedia {
        fn media(&self, exercise_id: String) -> BoxFuture<'static, Result<Option<ExerciseMedia>>> {
            let (latency, fail) = (self.latency, self.fail);
            Box::pin(async move {
                tokio::time::sleep(latency).await;
                if fail {
                    return Err(Error::Other("media service down".into()));
                }
                Ok(Some(ExerciseMedia {
                    image_url: Some(format!("https://cdn.example.com/{}.jpg", exercise_id)),
                    ..ExerciseMedia::default()
                }))
            })
        }
    }

    struct FakeContent {
        latency: Duration,
        fail: bool,
    }

    impl ContentLookup for FakeContent {
        fn content(&self, _exercise_id: String) -> BoxFuture<'static, Result<Option<ExerciseContent>>> {
            let (latency, fail) = (self.latency, self.fail);
            Box::pin(async move {
                tokio::time::sleep(latency).await;
                if fail {
                    return Err(Error::Other("cms timeout".into()));
                }
                Ok(Some(ExerciseContent {
                    description: Some("Press the bar from chest to lockout.".into()),
                    tips: vec!["Keep shoulder blades pinned".into()],
                    ..ExerciseContent::default()
                }))
            })
        }
    }

    fn media(fail: bool) -> FakeMedia {
        FakeMedia {
            latency: Duration::from_secs(1),
            fail,
        }
    }

    fn content(fail: bool) -> FakeContent {
        FakeContent {
            latency: Duration::from_secs(1),
            fail,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_run_concurrently() {
        let started = tokio::time::Instant::now();
        let details = enrich_exercise("bench", &media(false), &content(false)).await;

        assert!(started.elapsed() < Duration::from_millis(1500));
        assert_eq!(details.exercise_id, "bench");
        assert_eq!(
            details.media.unwrap().image_url.as_deref(),
            Some("https://cdn.example.com/bench.jpg")
        );
        assert_eq!(details.content.unwrap().tips.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_media_failure_keeps_content() {
        let details = enrich_exercise("bench", &media(true), &content(false)).await;
        assert!(details.media.is_none());
        assert!(details.content.is_some());
        assert!(!details.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_content_failure_keeps_media() {
        let details = enrich_exercise("bench", &media(false), &content(true)).await;
        assert!(details.media.is_some());
        assert!(details.content.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_failures_give_empty_details() {
        let details = enrich_exercise("bench", &media(true), &content(true)).await;
        assert!(details.is_empty());
    }
}
