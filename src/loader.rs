//! Feed loading.
//!
//! Each feed is fetched on its own and rendered into its own container. A
//! failed or slow feed never holds up another one, and every load replaces the
//! container wholesale, so a periodic refresh racing the initial load is
//! harmless.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::client::BackendClient;
use crate::errors::FeedError;
use crate::view::Node;
use crate::widgets;

pub const SCHEDULE_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    Schedule,
    TimeSlots,
    Testimonials,
    Facilities,
    Gallery,
}

impl Feed {
    pub const ALL: [Feed; 5] = [
        Feed::Schedule,
        Feed::TimeSlots,
        Feed::Testimonials,
        Feed::Facilities,
        Feed::Gallery,
    ];

    /// Name used for the feed in URLs and container ids.
    pub fn slug(self) -> &'static str {
        match self {
            Feed::Schedule => "jadwal",
            Feed::TimeSlots => "jam",
            Feed::Testimonials => "testimoni",
            Feed::Facilities => "fasilitas",
            Feed::Gallery => "galeri",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feed| feed.slug() == slug)
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Rendered markup for every widget container on the page. Containers start
/// out holding their feed's placeholder until the first load settles.
#[derive(Debug)]
pub struct Containers {
    fragments: RwLock<BTreeMap<Feed, String>>,
}

impl Containers {
    pub fn new() -> Self {
        let fragments: BTreeMap<Feed, String> = Feed::ALL
            .into_iter()
            .map(|feed| (feed, initial_fragment(feed).render()))
            .collect();
        Self {
            fragments: RwLock::new(fragments),
        }
    }

    pub async fn replace(&self, feed: Feed, html: String) {
        self.fragments.write().await.insert(feed, html);
    }

    pub async fn get(&self, feed: Feed) -> String {
        self.fragments
            .read()
            .await
            .get(&feed)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn snapshot(&self) -> BTreeMap<Feed, String> {
        self.fragments.read().await.clone()
    }
}

impl Default for Containers {
    fn default() -> Self {
        Self::new()
    }
}

fn initial_fragment(feed: Feed) -> Node {
    match feed {
        Feed::Schedule => widgets::schedule_placeholder(),
        Feed::TimeSlots => widgets::time_slot_placeholder(),
        Feed::Testimonials => widgets::testimonial_placeholder(),
        Feed::Facilities => widgets::facility_placeholder(false),
        Feed::Gallery => widgets::gallery_placeholder(false),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadOutcome {
    Rendered { items: usize },
    Empty,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub feed: Feed,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

pub struct DataLoader {
    client: BackendClient,
    containers: Arc<Containers>,
}

impl DataLoader {
    pub fn new(client: BackendClient, containers: Arc<Containers>) -> Self {
        Self { client, containers }
    }

    pub fn containers(&self) -> &Arc<Containers> {
        &self.containers
    }

    pub async fn load(&self, feed: Feed) -> LoadReport {
        match feed {
            Feed::Schedule => self.load_schedule().await,
            Feed::TimeSlots => self.load_time_slots().await,
            Feed::Testimonials => self.load_testimonials().await,
            Feed::Facilities => self.load_facilities().await,
            Feed::Gallery => self.load_gallery().await,
        }
    }

    pub async fn load_schedule(&self) -> LoadReport {
        let result = self.client.fetch_schedule().await;
        self.settle(Feed::Schedule, result, widgets::schedule_rows, |err| {
            if is_no_data(err) {
                widgets::schedule_placeholder()
            } else {
                widgets::schedule_error(&err.to_string())
            }
        })
        .await
    }

    pub async fn load_time_slots(&self) -> LoadReport {
        let result = self.client.fetch_time_slots().await;
        self.settle(Feed::TimeSlots, result, widgets::time_slot_options, |_| {
            widgets::time_slot_placeholder()
        })
        .await
    }

    pub async fn load_testimonials(&self) -> LoadReport {
        let result = self.client.fetch_testimonials().await;
        self.settle(Feed::Testimonials, result, widgets::testimonial_slides, |_| {
            widgets::testimonial_placeholder()
        })
        .await
    }

    pub async fn load_facilities(&self) -> LoadReport {
        let result = self.client.fetch_facilities().await;
        self.settle(Feed::Facilities, result, widgets::facility_slides, |err| {
            widgets::facility_placeholder(!is_no_data(err))
        })
        .await
    }

    pub async fn load_gallery(&self) -> LoadReport {
        let result = self.client.fetch_gallery().await;
        self.settle(Feed::Gallery, result, widgets::gallery_slides, |err| {
            widgets::gallery_placeholder(!is_no_data(err))
        })
        .await
    }

    /// Loads every feed concurrently and waits for all of them.
    pub async fn load_all(&self) -> Vec<LoadReport> {
        let (schedule, slots, testimonials, facilities, gallery) = tokio::join!(
            self.load_schedule(),
            self.load_time_slots(),
            self.load_testimonials(),
            self.load_facilities(),
            self.load_gallery(),
        );
        vec![schedule, slots, testimonials, facilities, gallery]
    }

    /// Fires one independent task per feed and returns immediately.
    pub fn spawn_all(self: &Arc<Self>) -> Vec<JoinHandle<LoadReport>> {
        Feed::ALL
            .into_iter()
            .map(|feed| {
                let loader = Arc::clone(self);
                tokio::spawn(async move { loader.load(feed).await })
            })
            .collect()
    }

    async fn settle<T>(
        &self,
        feed: Feed,
        result: Result<Vec<T>, FeedError>,
        render: impl FnOnce(&[T]) -> Node,
        placeholder: impl FnOnce(&FeedError) -> Node,
    ) -> LoadReport {
        let (node, outcome) = match result {
            Ok(items) => {
                info!(feed = %feed, items = items.len(), "rendered feed");
                (render(items.as_slice()), LoadOutcome::Rendered { items: items.len() })
            }
            Err(err) if is_no_data(&err) => {
                warn!(feed = %feed, reason = %err, "no data, showing placeholder");
                (placeholder(&err), LoadOutcome::Empty)
            }
            Err(err) => {
                error!(feed = %feed, error = %err, "feed failed, showing placeholder");
                let node = placeholder(&err);
                (node, LoadOutcome::Failed { error: err.to_string() })
            }
        };

        self.containers.replace(feed, node.render()).await;
        LoadReport { feed, outcome }
    }
}

fn is_no_data(err: &FeedError) -> bool {
    matches!(err, FeedError::Empty | FeedError::Rejected(_))
}

/// Periodic schedule reload. Owns its task; stopping or dropping it cancels
/// the timer.
#[derive(Debug)]
pub struct ScheduleRefresh {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl ScheduleRefresh {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn start(&mut self, loader: Arc<DataLoader>) {
        if self.is_running() {
            return;
        }

        let period = self.period;
        info!(period_secs = period.as_secs(), "starting schedule refresh");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                loader.load_schedule().await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for ScheduleRefresh {
    fn default() -> Self {
        Self::new(SCHEDULE_REFRESH_INTERVAL)
    }
}

impl Drop for ScheduleRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}
