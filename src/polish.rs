//! Page polish: smooth anchor scrolling, the scrolled navbar state,
//! reveal-on-view and the mobile navigation toggle.
//!
//! The controller holds no handles to a real page. It is initialized from a
//! [`PageLayout`] describing what the page contains and answers each input
//! event with the state change the page should apply.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::throttle::{Throttle, Throttled};
use crate::view::{el, Node};

pub const SCROLL_THROTTLE: Duration = Duration::from_millis(100);
pub const ANCHOR_PADDING_PX: f64 = 8.0;
pub const NAVBAR_TRIGGER_RATIO: f64 = 0.6;
pub const DEFAULT_HERO_HEIGHT: f64 = 120.0;
pub const REVEAL_THRESHOLD: f64 = 0.15;
pub const REVEAL_BOTTOM_INSET_PX: f64 = 40.0;

pub const SCROLLED_CLASS: &str = "scrolled";
pub const REVEALED_CLASS: &str = "is-visible";
pub const NAV_OPEN_CLASS: &str = "nav-open";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// Element geometry in document coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementBox {
    pub top: f64,
    pub height: f64,
}

/// Everything the controller needs to know about the page at start-up.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub header_height: Option<f64>,
    pub hero_height: Option<f64>,
    pub has_navbar: bool,
    pub has_nav_links: bool,
    pub has_hamburger: bool,
    pub prefers_reduced_motion: bool,
    pub intersection_supported: bool,
    /// Anchor targets by element id.
    pub anchors: BTreeMap<String, ElementBox>,
    /// Elements marked for reveal, by id.
    pub reveal: BTreeMap<String, ElementBox>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

// ---- smooth scroll --------------------------------------------------------

/// Resolves a same-page anchor click to a scroll request. Bare `#`, external
/// links and unknown targets are left to the browser.
pub fn anchor_scroll(
    href: &str,
    anchors: &BTreeMap<String, ElementBox>,
    header_height: f64,
    reduced_motion: bool,
) -> Option<ScrollRequest> {
    let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
    let target = anchors.get(id)?;

    Some(ScrollRequest {
        top: target.top - (header_height + ANCHOR_PADDING_PX),
        behavior: if reduced_motion {
            ScrollBehavior::Instant
        } else {
            ScrollBehavior::Smooth
        },
    })
}

// ---- navbar ---------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NavbarTracker {
    trigger: f64,
    scrolled: bool,
    latest_y: f64,
    throttle: Throttle,
}

impl NavbarTracker {
    pub fn new(hero_height: Option<f64>, scroll_y: f64) -> Self {
        let mut tracker = Self {
            trigger: hero_height.unwrap_or(DEFAULT_HERO_HEIGHT) * NAVBAR_TRIGGER_RATIO,
            scrolled: false,
            latest_y: scroll_y,
            throttle: Throttle::new(SCROLL_THROTTLE),
        };
        tracker.evaluate();
        tracker
    }

    pub fn on_scroll(&mut self, scroll_y: f64, now: Instant) -> Throttled {
        self.latest_y = scroll_y;
        let decision = self.throttle.call(now);
        if decision == Throttled::Run {
            self.evaluate();
        }
        decision
    }

    /// Runs a pending trailing evaluation. Returns whether one ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self.throttle.take_due(now);
        if due {
            self.evaluate();
        }
        due
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    fn evaluate(&mut self) {
        self.scrolled = self.latest_y > self.trigger;
    }
}

// ---- reveal ---------------------------------------------------------------

/// One-shot reveal: an element is revealed the first time enough of it is on
/// screen and is never observed again.
#[derive(Debug, Clone, Default)]
pub struct RevealObserver {
    observed: BTreeMap<String, ElementBox>,
    revealed: BTreeSet<String>,
}

impl RevealObserver {
    pub fn new(elements: BTreeMap<String, ElementBox>, supported: bool) -> Self {
        if supported {
            Self {
                observed: elements,
                revealed: BTreeSet::new(),
            }
        } else {
            Self {
                observed: BTreeMap::new(),
                revealed: elements.into_keys().collect(),
            }
        }
    }

    /// Checks every still-observed element against the viewport and returns
    /// the ids revealed by this pass.
    pub fn check(&mut self, scroll_y: f64, viewport_height: f64) -> Vec<String> {
        let newly: Vec<String> = self
            .observed
            .iter()
            .filter(|(_, bounds)| {
                intersection_ratio(**bounds, scroll_y, viewport_height) >= REVEAL_THRESHOLD
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &newly {
            self.observed.remove(id);
            self.revealed.insert(id.clone());
        }
        newly
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed.contains(id)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }
}

/// Fraction of `bounds` inside the viewport after the bottom inset.
pub fn intersection_ratio(bounds: ElementBox, scroll_y: f64, viewport_height: f64) -> f64 {
    let view_top = scroll_y;
    let view_bottom = scroll_y + (viewport_height - REVEAL_BOTTOM_INSET_PX).max(0.0);
    let bottom = bounds.top + bounds.height;

    if bounds.height <= 0.0 {
        return if bounds.top >= view_top && bounds.top <= view_bottom {
            1.0
        } else {
            0.0
        };
    }

    let visible = (bottom.min(view_bottom) - bounds.top.max(view_top)).max(0.0);
    visible / bounds.height
}

// ---- mobile nav -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MobileNav {
    open: bool,
    injected: bool,
}

impl MobileNav {
    /// `None` when the page has neither a toggle nor links to toggle.
    pub fn init(has_hamburger: bool, has_nav_links: bool, has_navbar: bool) -> Option<Self> {
        if has_hamburger {
            return Some(Self {
                open: false,
                injected: false,
            });
        }
        (has_nav_links && has_navbar).then_some(Self {
            open: false,
            injected: true,
        })
    }

    /// Markup for a toggle the page did not ship with.
    pub fn hamburger_markup() -> Node {
        el("button")
            .class("hamburger")
            .attr("aria-label", "Toggle navigation")
            .attr("aria-expanded", "false")
            .child(el("span").class("bar").attr("aria-hidden", "true"))
            .into()
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn on_key(&mut self, key: Key) {
        if key == Key::Escape {
            self.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn was_injected(&self) -> bool {
        self.injected
    }

    pub fn aria_expanded(&self) -> &'static str {
        if self.open { "true" } else { "false" }
    }
}

// ---- controller -----------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PageController {
    header_height: f64,
    reduced_motion: bool,
    anchors: BTreeMap<String, ElementBox>,
    navbar: NavbarTracker,
    reveal: RevealObserver,
    nav: Option<MobileNav>,
}

impl PageController {
    pub fn init(layout: PageLayout, scroll_y: f64) -> Self {
        let nav = MobileNav::init(layout.has_hamburger, layout.has_nav_links, layout.has_navbar);
        debug!(
            anchors = layout.anchors.len(),
            reveal = layout.reveal.len(),
            nav_toggle = nav.is_some(),
            "page controller initialized"
        );

        Self {
            header_height: layout.header_height.unwrap_or_default(),
            reduced_motion: layout.prefers_reduced_motion,
            anchors: layout.anchors,
            navbar: NavbarTracker::new(layout.hero_height, scroll_y),
            reveal: RevealObserver::new(layout.reveal, layout.intersection_supported),
            nav,
        }
    }

    pub fn anchor_click(&mut self, href: &str) -> Option<ScrollRequest> {
        let request = anchor_scroll(href, &self.anchors, self.header_height, self.reduced_motion)?;
        if let Some(nav) = self.nav.as_mut() {
            nav.close();
        }
        Some(request)
    }

    pub fn on_scroll(&mut self, scroll_y: f64, now: Instant) -> Throttled {
        self.navbar.on_scroll(scroll_y, now)
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        self.navbar.poll(now)
    }

    pub fn on_viewport(&mut self, scroll_y: f64, viewport_height: f64) -> Vec<String> {
        self.reveal.check(scroll_y, viewport_height)
    }

    pub fn hamburger_click(&mut self) -> Option<bool> {
        self.nav.as_mut().map(MobileNav::toggle)
    }

    pub fn on_key(&mut self, key: Key) {
        if let Some(nav) = self.nav.as_mut() {
            nav.on_key(key);
        }
    }

    pub fn navbar(&self) -> &NavbarTracker {
        &self.navbar
    }

    pub fn reveal(&self) -> &RevealObserver {
        &self.reveal
    }

    pub fn nav(&self) -> Option<&MobileNav> {
        self.nav.as_ref()
    }

    /// Classes the header and navbar should carry right now.
    pub fn header_classes(&self) -> Vec<&'static str> {
        if self.navbar.is_scrolled() {
            vec![SCROLLED_CLASS]
        } else {
            Vec::new()
        }
    }

    /// Classes the body should carry right now.
    pub fn body_classes(&self) -> Vec<&'static str> {
        match &self.nav {
            Some(nav) if nav.is_open() => vec![NAV_OPEN_CLASS],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PageLayout {
        PageLayout {
            header_height: Some(72.0),
            hero_height: Some(600.0),
            has_navbar: true,
            has_nav_links: true,
            has_hamburger: false,
            prefers_reduced_motion: false,
            intersection_supported: true,
            anchors: BTreeMap::from([(
                "reservasi".to_string(),
                ElementBox { top: 2400.0, height: 500.0 },
            )]),
            reveal: BTreeMap::from([
                ("about".to_string(), ElementBox { top: 900.0, height: 400.0 }),
                ("galeri".to_string(), ElementBox { top: 3000.0, height: 400.0 }),
            ]),
        }
    }

    #[test]
    fn anchor_offsets_by_header_and_padding() {
        let mut page = PageController::init(layout(), 0.0);
        let request = page.anchor_click("#reservasi").unwrap();
        assert_eq!(request.top, 2400.0 - 80.0);
        assert_eq!(request.behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn reduced_motion_scrolls_instantly() {
        let mut layout = layout();
        layout.prefers_reduced_motion = true;
        let mut page = PageController::init(layout, 0.0);
        assert_eq!(
            page.anchor_click("#reservasi").unwrap().behavior,
            ScrollBehavior::Instant
        );
    }

    #[test]
    fn bare_hash_and_unknown_targets_are_ignored() {
        let mut page = PageController::init(layout(), 0.0);
        assert!(page.anchor_click("#").is_none());
        assert!(page.anchor_click("#missing").is_none());
        assert!(page.anchor_click("https://example.com").is_none());
    }

    #[test]
    fn anchor_click_closes_mobile_nav() {
        let mut page = PageController::init(layout(), 0.0);
        assert_eq!(page.hamburger_click(), Some(true));
        assert_eq!(page.body_classes(), [NAV_OPEN_CLASS]);

        page.anchor_click("#reservasi");
        assert!(page.body_classes().is_empty());
    }

    #[test]
    fn navbar_switches_past_sixty_percent_of_hero() {
        let start = Instant::now();
        let mut page = PageController::init(layout(), 0.0);
        assert!(!page.navbar().is_scrolled());

        assert_eq!(page.on_scroll(361.0, start), Throttled::Run);
        assert_eq!(page.header_classes(), [SCROLLED_CLASS]);

        let later = start + Duration::from_millis(200);
        page.on_scroll(360.0, later);
        assert!(!page.navbar().is_scrolled());
    }

    #[test]
    fn navbar_state_evaluated_at_init() {
        let page = PageController::init(layout(), 1000.0);
        assert!(page.navbar().is_scrolled());
    }

    #[test]
    fn missing_hero_uses_default_trigger() {
        let tracker = NavbarTracker::new(None, 73.0);
        assert!(tracker.is_scrolled());
        let tracker = NavbarTracker::new(None, 72.0);
        assert!(!tracker.is_scrolled());
    }

    #[test]
    fn throttled_scroll_catches_up_on_trailing_run() {
        let start = Instant::now();
        let mut page = PageController::init(layout(), 0.0);
        page.on_scroll(10.0, start);

        let soon = start + Duration::from_millis(20);
        assert!(matches!(page.on_scroll(900.0, soon), Throttled::Deferred(_)));
        assert!(!page.navbar().is_scrolled());

        assert!(page.poll(start + SCROLL_THROTTLE));
        assert!(page.navbar().is_scrolled());
    }

    #[test]
    fn reveal_is_one_shot() {
        let mut page = PageController::init(layout(), 0.0);
        assert!(page.on_viewport(0.0, 800.0).is_empty());

        // 900..1300 vs viewport 600..1360 after the inset.
        assert_eq!(page.on_viewport(600.0, 800.0), ["about"]);
        assert!(page.reveal().is_revealed("about"));
        assert_eq!(page.reveal().observed_count(), 1);

        assert!(page.on_viewport(600.0, 800.0).is_empty());
        assert!(page.on_viewport(0.0, 800.0).is_empty());
        assert!(page.reveal().is_revealed("about"));
    }

    #[test]
    fn reveal_waits_for_fifteen_percent() {
        let bounds = ElementBox { top: 1000.0, height: 400.0 };
        // Viewport bottom after inset: 1000 + 50.
        assert!(intersection_ratio(bounds, 250.0, 840.0) < REVEAL_THRESHOLD);
        // Viewport bottom after inset: 1000 + 60.
        assert!(intersection_ratio(bounds, 260.0, 840.0) >= REVEAL_THRESHOLD);
    }

    #[test]
    fn unsupported_observer_reveals_everything() {
        let mut layout = layout();
        layout.intersection_supported = false;
        let page = PageController::init(layout, 0.0);
        assert!(page.reveal().is_revealed("about"));
        assert!(page.reveal().is_revealed("galeri"));
        assert_eq!(page.reveal().observed_count(), 0);
    }

    #[test]
    fn hamburger_injected_only_when_links_exist() {
        assert!(MobileNav::init(false, true, true).unwrap().was_injected());
        assert!(!MobileNav::init(true, false, false).unwrap().was_injected());
        assert!(MobileNav::init(false, false, true).is_none());

        let markup = MobileNav::hamburger_markup().render();
        assert!(markup.contains("aria-expanded=\"false\""));
        assert!(markup.contains("class=\"hamburger\""));
    }

    #[test]
    fn escape_forces_nav_closed() {
        let mut nav = MobileNav::init(true, true, true).unwrap();
        nav.toggle();
        assert_eq!(nav.aria_expanded(), "true");

        nav.on_key(Key::Other);
        assert!(nav.is_open());
        nav.on_key(Key::from_name("Escape"));
        assert!(!nav.is_open());
        assert_eq!(nav.aria_expanded(), "false");

        nav.on_key(Key::Escape);
        assert!(!nav.is_open());
    }
}
