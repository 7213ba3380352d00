//! Sliding testimonial carousel.
//!
//! [`CarouselState`] holds the index math and is driven synchronously.
//! [`Carousel`] wraps it as an owned component with an autoplay timer and a
//! frame channel the page listens on.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::debug;

use crate::polish::Key;
use crate::throttle::{Throttle, Throttled};

pub const DRAG_THRESHOLD_PX: f64 = 40.0;
pub const AUTOPLAY_INTERVAL: Duration = Duration::from_secs(5);
pub const RESIZE_THROTTLE: Duration = Duration::from_millis(150);

const SINGLE_MAX_WIDTH: u32 = 768;
const DOUBLE_MAX_WIDTH: u32 = 1199;

/// Slides visible at once for a viewport width.
pub fn per_view_for_width(width: u32) -> usize {
    if width <= SINGLE_MAX_WIDTH {
        1
    } else if width <= DOUBLE_MAX_WIDTH {
        2
    } else {
        3
    }
}

/// Measured card width and track gap, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarouselLayout {
    pub card_width: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CarouselFrame {
    pub index: usize,
    pub offset_px: f64,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl CarouselFrame {
    pub fn transform(&self) -> String {
        format!("translateX({}px)", self.offset_px)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Prev,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start_x: f64,
    current_x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeResult {
    Applied(CarouselFrame),
    Deferred(Instant),
    Coalesced,
}

#[derive(Debug, Clone)]
pub struct CarouselState {
    index: usize,
    per_view: usize,
    slide_count: usize,
    layout: CarouselLayout,
    drag: Option<Drag>,
    resize: Throttle,
    pending_width: Option<u32>,
}

impl CarouselState {
    pub fn new(slide_count: usize, viewport_width: u32, layout: CarouselLayout) -> Self {
        let mut state = Self {
            index: 0,
            per_view: per_view_for_width(viewport_width),
            slide_count,
            layout,
            drag: None,
            resize: Throttle::new(RESIZE_THROTTLE),
            pending_width: None,
        };
        state.update();
        state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn per_view(&self) -> usize {
        self.per_view
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn max_index(&self) -> usize {
        self.slide_count.saturating_sub(self.per_view)
    }

    /// Clamps the index and derives everything the page shows from it.
    pub fn update(&mut self) -> CarouselFrame {
        let max_index = self.max_index();
        self.index = self.index.min(max_index);
        self.frame()
    }

    pub fn frame(&self) -> CarouselFrame {
        let step = self.layout.card_width + self.layout.gap;
        CarouselFrame {
            index: self.index,
            offset_px: -(self.index as f64 * step),
            prev_disabled: self.index == 0,
            next_disabled: self.index >= self.max_index(),
        }
    }

    pub fn step(&mut self, delta: isize) -> CarouselFrame {
        self.index = self.index.saturating_add_signed(delta);
        self.update()
    }

    pub fn next(&mut self) -> CarouselFrame {
        self.step(1)
    }

    pub fn prev(&mut self) -> CarouselFrame {
        self.step(-1)
    }

    pub fn click(&mut self, control: Control) -> CarouselFrame {
        match control {
            Control::Prev => self.prev(),
            Control::Next => self.next(),
        }
    }

    /// Arrow keys pressed while one of the controls has focus.
    pub fn key(&mut self, key: Key) -> Option<CarouselFrame> {
        match key {
            Key::ArrowLeft => Some(self.prev()),
            Key::ArrowRight => Some(self.next()),
            _ => None,
        }
    }

    pub fn drag_start(&mut self, x: f64) {
        self.drag = Some(Drag {
            start_x: x,
            current_x: x,
        });
    }

    pub fn drag_move(&mut self, x: f64) {
        if let Some(drag) = self.drag.as_mut() {
            drag.current_x = x;
        }
    }

    /// Ends a gesture. Moves one step when the release is past the threshold,
    /// left swipes advancing and right swipes going back.
    pub fn drag_end(&mut self) -> Option<CarouselFrame> {
        let drag = self.drag.take()?;
        let dx = drag.current_x - drag.start_x;
        if dx.abs() <= DRAG_THRESHOLD_PX {
            return None;
        }
        Some(if dx < 0.0 { self.next() } else { self.prev() })
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_layout(&mut self, layout: CarouselLayout) -> CarouselFrame {
        self.layout = layout;
        self.update()
    }

    pub fn set_slide_count(&mut self, slide_count: usize) -> CarouselFrame {
        self.slide_count = slide_count;
        self.update()
    }

    pub fn set_viewport_width(&mut self, width: u32) -> CarouselFrame {
        self.per_view = per_view_for_width(width);
        self.update()
    }

    /// Throttled resize. The latest width always wins once the window closes.
    pub fn resize(&mut self, width: u32, now: Instant) -> ResizeResult {
        match self.resize.call(now) {
            Throttled::Run => {
                self.pending_width = None;
                ResizeResult::Applied(self.set_viewport_width(width))
            }
            Throttled::Deferred(at) => {
                self.pending_width = Some(width);
                ResizeResult::Deferred(at)
            }
            Throttled::Coalesced => {
                self.pending_width = Some(width);
                ResizeResult::Coalesced
            }
        }
    }

    pub fn flush_resize(&mut self, now: Instant) -> Option<CarouselFrame> {
        if !self.resize.take_due(now) {
            return None;
        }
        let width = self.pending_width.take()?;
        Some(self.set_viewport_width(width))
    }
}

/// Owned carousel component. Autoplay runs as one task at most; dropping the
/// carousel stops it.
#[derive(Debug)]
pub struct Carousel {
    state: Arc<Mutex<CarouselState>>,
    frames: Arc<watch::Sender<CarouselFrame>>,
    autoplay: Option<JoinHandle<()>>,
    period: Duration,
}

impl Carousel {
    pub fn new(mut state: CarouselState) -> Self {
        let (frames, _) = watch::channel(state.update());
        Self {
            state: Arc::new(Mutex::new(state)),
            frames: Arc::new(frames),
            autoplay: None,
            period: AUTOPLAY_INTERVAL,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<CarouselFrame> {
        self.frames.subscribe()
    }

    pub fn frame(&self) -> CarouselFrame {
        *self.frames.borrow()
    }

    pub async fn click(&self, control: Control) -> CarouselFrame {
        let mut state = self.state.lock().await;
        self.publish(state.click(control))
    }

    pub async fn key(&self, key: Key) -> Option<CarouselFrame> {
        let mut state = self.state.lock().await;
        state.key(key).map(|frame| self.publish(frame))
    }

    pub async fn drag_start(&self, x: f64) {
        self.state.lock().await.drag_start(x);
    }

    pub async fn drag_move(&self, x: f64) {
        self.state.lock().await.drag_move(x);
    }

    pub async fn drag_end(&self) -> Option<CarouselFrame> {
        let mut state = self.state.lock().await;
        state.drag_end().map(|frame| self.publish(frame))
    }

    pub async fn set_slide_count(&self, slide_count: usize) -> CarouselFrame {
        let mut state = self.state.lock().await;
        self.publish(state.set_slide_count(slide_count))
    }

    pub async fn set_layout(&self, layout: CarouselLayout) -> CarouselFrame {
        let mut state = self.state.lock().await;
        self.publish(state.set_layout(layout))
    }

    /// Applies the resize now or schedules the trailing update.
    pub async fn resize(&self, width: u32) -> Option<CarouselFrame> {
        let mut state = self.state.lock().await;
        match state.resize(width, Instant::now()) {
            ResizeResult::Applied(frame) => Some(self.publish(frame)),
            ResizeResult::Deferred(at) => {
                let state = Arc::clone(&self.state);
                let frames = Arc::clone(&self.frames);
                tokio::spawn(async move {
                    sleep_until(at).await;
                    if let Some(frame) = state.lock().await.flush_resize(Instant::now()) {
                        frames.send_replace(frame);
                    }
                });
                None
            }
            ResizeResult::Coalesced => None,
        }
    }

    /// Starts autoplay. A running timer is left alone rather than doubled.
    pub fn start(&mut self) {
        if self.is_autoplaying() {
            return;
        }

        let state = Arc::clone(&self.state);
        let frames = Arc::clone(&self.frames);
        let period = self.period;
        debug!(period_ms = period.as_millis() as u64, "carousel autoplay started");
        self.autoplay = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let frame = state.lock().await.next();
                frames.send_replace(frame);
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.autoplay.take() {
            handle.abort();
            debug!("carousel autoplay stopped");
        }
    }

    pub fn pointer_enter(&mut self) {
        self.stop();
    }

    pub fn pointer_leave(&mut self) {
        self.start();
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn publish(&self, frame: CarouselFrame) -> CarouselFrame {
        self.frames.send_replace(frame);
        frame
    }
}

impl Drop for Carousel {
    fn drop(&mut self) {
        self.stop();
    }
}
