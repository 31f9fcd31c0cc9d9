use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};

/// Default on-screen time for a story.
pub const DEFAULT_STORY_DURATION: Duration = Duration::from_millis(5000);

/// Whether a story shows a still image or plays a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Anything that is not `image/*` is treated as video.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }
}

/// Who posted a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    /// Avatar image URL (http(s) or file URI).
    pub avatar: String,
}

/// A single media item. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: String,
    pub url: String,
    pub kind: MediaKind,
    pub duration: Duration,
    pub author: Author,
    pub timestamp: DateTime<Local>,
}

impl Story {
    /// Build a story for a freshly accepted upload.
    pub fn from_upload(
        uri: String,
        mime: &str,
        author: Author,
        duration: Duration,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            url: uri,
            kind: MediaKind::from_mime(mime),
            duration,
            author,
            timestamp: now,
        }
    }

    /// Age label shown in the viewer header, e.g. "15 minutes ago".
    pub fn age_label(&self, now: DateTime<Local>) -> String {
        relative_label(self.timestamp, now)
    }
}

/// Ordered story list owned by the shell. Display order is insertion order,
/// new uploads go to the front.
///
/// The backing storage is an immutable snapshot, so a viewer that was handed
/// `snapshot()` keeps seeing the same items even if the list changes later.
#[derive(Debug, Clone)]
pub struct StoryList {
    stories: Rc<[Story]>,
}

impl StoryList {
    pub fn new(stories: Vec<Story>) -> Self {
        Self {
            stories: stories.into(),
        }
    }

    pub fn prepend(&mut self, story: Story) {
        let mut items = Vec::with_capacity(self.stories.len() + 1);
        items.push(story);
        items.extend(self.stories.iter().cloned());
        self.stories = items.into();
    }

    pub fn snapshot(&self) -> Rc<[Story]> {
        self.stories.clone()
    }

    pub fn get(&self, index: usize) -> Option<&Story> {
        self.stories.get(index)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.stories.iter()
    }
}

const SAMPLES: [(&str, &str, &str, &str, i64); 4] = [
    (
        "1",
        "Ameni",
        "https://www.teewinek.com/wp-content/uploads/2024/10/pull-avec-impression-en-tunisie-pas-cher-avec-impression-en-tunisie-teewinek-d.jpg",
        "https://www.teewinek.com/wp-content/uploads/2024/10/pull-avec-impression-en-tunisie-pas-cher-avec-impression-en-tunisie-teewinek-d.jpg",
        15,
    ),
    (
        "2",
        "Sarah",
        "https://www.teewinek.com/wp-content/uploads/2024/02/tablier-de-cuisine-personnalise-Impression-et-Personnalisation-des-tablier-de-cuisine-en-ligne-en-Tunisie-teewinek-MOBILE-2024.jpg",
        "https://www.teewinek.com/wp-content/uploads/2024/02/tablier-de-cuisine-personnalise-Impression-et-Personnalisation-des-tablier-de-cuisine-en-ligne-en-Tunisie-teewinek-MOBILE-2024.jpg",
        30,
    ),
    (
        "3",
        "Yassine",
        "https://www.teewinek.com/wp-content/uploads/2024/10/pull-avec-impression-en-tunisie-pas-cher-avec-impression-en-tunisie-teewinek-b.jpg",
        "https://www.teewinek.com/wp-content/uploads/2023/09/banner-teewinek-produit-en-ligne-en-tunisie-capuche-et-tshirt-avec-impression-V2.gif",
        45,
    ),
    (
        "4",
        "Mariem",
        "https://www.teewinek.com/wp-content/uploads/2024/10/t-shirt-teewinek-couple-2024-CAPUCHE-AVEC-LOGO-EN-TUNISIE-capuche-avec-impression-en-tunisie-teewinek.jpg",
        "https://www.teewinek.com/wp-content/uploads/2024/10/t-shirt-teewinek-couple-2024-CAPUCHE-AVEC-LOGO-EN-TUNISIE-capuche-avec-impression-en-tunisie-teewinek.jpg",
        60,
    ),
];

/// The seed list shown at startup.
pub fn sample_stories(now: DateTime<Local>) -> Vec<Story> {
    SAMPLES
        .iter()
        .map(|&(id, name, url, avatar, minutes_ago)| Story {
            id: id.into(),
            url: url.into(),
            kind: MediaKind::Image,
            duration: DEFAULT_STORY_DURATION,
            author: Author {
                name: name.into(),
                avatar: avatar.into(),
            },
            timestamp: now - chrono::Duration::minutes(minutes_ago),
        })
        .collect()
}

/// Human distance between two instants, with an "ago"/"in" suffix.
pub fn relative_label(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let (earlier, later) = if timestamp <= now {
        (timestamp, now)
    } else {
        (now, timestamp)
    };
    let distance = describe_distance(earlier, later);
    if timestamp > now {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

/// Whole calendar months from `earlier` to `later`.
fn calendar_months(earlier: DateTime<Local>, later: DateTime<Local>) -> i64 {
    let (a, b) = (earlier.naive_local(), later.naive_local());
    let mut months =
        i64::from(b.year() - a.year()) * 12 + i64::from(b.month()) - i64::from(a.month());
    if (b.day(), b.time()) < (a.day(), a.time()) {
        months -= 1;
    }
    months.max(0)
}

fn describe_distance(earlier: DateTime<Local>, later: DateTime<Local>) -> String {
    const HOUR: f64 = 60.0;
    const DAY: f64 = 1440.0;
    const MONTH: f64 = 43200.0;

    let seconds = later.signed_duration_since(earlier).num_seconds();
    if seconds < 30 {
        return "less than a minute".into();
    }

    let minutes = (seconds as f64 / 60.0).round() as i64;
    let per = |unit: f64| (minutes as f64 / unit).round() as i64;
    match minutes {
        0..=1 => return "1 minute".into(),
        2..=44 => return format!("{minutes} minutes"),
        45..=89 => return "about 1 hour".into(),
        90..=1439 => return format!("about {} hours", per(HOUR)),
        1440..=2519 => return "1 day".into(),
        2520..=43199 => return format!("{} days", per(DAY)),
        43200..=86399 => {
            return match per(MONTH) {
                1 => "about 1 month".into(),
                months => format!("about {months} months"),
            }
        }
        _ => {}
    }

    let months = calendar_months(earlier, later);
    if months < 12 {
        return format!("{} months", per(MONTH).max(2));
    }

    let years = months / 12;
    let plural = |n: i64| {
        if n == 1 {
            "1 year".to_string()
        } else {
            format!("{n} years")
        }
    };
    match months % 12 {
        0..=2 => format!("about {}", plural(years)),
        3..=8 => format!("over {}", plural(years)),
        _ => format!("almost {}", plural(years + 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str) -> Story {
        Story {
            id: id.into(),
            url: format!("file:///tmp/{id}.png"),
            kind: MediaKind::Image,
            duration: DEFAULT_STORY_DURATION,
            author: Author {
                name: "tester".into(),
                avatar: String::new(),
            },
            timestamp: Local::now(),
        }
    }

    #[test]
    fn sample_list_has_four_stories_in_age_order() {
        let now = Local::now();
        let samples = sample_stories(now);
        assert_eq!(samples.len(), 4);
        let names: Vec<_> = samples.iter().map(|s| s.author.name.as_str()).collect();
        assert_eq!(names, ["Ameni", "Sarah", "Yassine", "Mariem"]);
        assert!(samples.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert_eq!(samples[0].age_label(now), "15 minutes ago");
        assert_eq!(samples[3].age_label(now), "about 1 hour ago");
    }

    #[test]
    fn prepend_puts_new_story_first() {
        let mut list = StoryList::new(vec![story("a"), story("b")]);
        list.prepend(story("c"));
        let ids: Vec<_> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_prepend() {
        let mut list = StoryList::new(vec![story("a")]);
        let snapshot = list.snapshot();
        list.prepend(story("b"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "a");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn upload_kind_follows_mime_prefix() {
        let author = Author {
            name: "me".into(),
            avatar: String::new(),
        };
        let now = Local::now();
        let image = Story::from_upload(
            "file:///a.png".into(),
            "image/png",
            author.clone(),
            DEFAULT_STORY_DURATION,
            now,
        );
        let video = Story::from_upload(
            "file:///a.mp4".into(),
            "video/mp4",
            author,
            DEFAULT_STORY_DURATION,
            now,
        );
        assert_eq!(image.kind, MediaKind::Image);
        assert_eq!(video.kind, MediaKind::Video);
        assert_eq!(image.id, now.timestamp_millis().to_string());
    }

    #[test]
    fn relative_labels() {
        let now = Local::now();
        let ago = |secs: i64| relative_label(now - chrono::Duration::seconds(secs), now);
        assert_eq!(ago(10), "less than a minute ago");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(30 * 60), "30 minutes ago");
        assert_eq!(ago(60 * 60), "about 1 hour ago");
        assert_eq!(ago(5 * 3600), "about 5 hours ago");
        assert_eq!(ago(30 * 3600), "1 day ago");
        assert_eq!(ago(10 * 86400), "10 days ago");
        assert_eq!(ago(35 * 86400), "about 1 month ago");
        assert_eq!(ago(50 * 86400), "about 2 months ago");
        assert_eq!(ago(150 * 86400), "5 months ago");
        assert_eq!(ago(380 * 86400), "about 1 year ago");
        assert_eq!(ago(550 * 86400), "over 1 year ago");
        assert_eq!(ago(700 * 86400), "almost 2 years ago");
        assert_eq!(ago(1100 * 86400), "about 3 years ago");
        assert_eq!(
            relative_label(now + chrono::Duration::minutes(5), now),
            "in 5 minutes"
        );
    }
}
