use std::{cell::Cell, rc::Rc};

use crate::dom::{LockHolder, Node, ScrollLock};

pub const ACTIVE_CLASS: &str = "active";
pub const NAVBAR_FIXED_CLASS: &str = "fixed";
pub const BODY_NAVBAR_FIXED_CLASS: &str = "navbar-fixed";
pub const HOME_SECTION: &str = "home";

/// Hamburger menu for narrow viewports.
pub struct MobileMenu<N> {
    menu: N,
    hamburger: N,
    lock: Rc<ScrollLock<N>>,
    open: Cell<bool>,
}

impl<N: Node> MobileMenu<N> {
    pub fn new(menu: N, hamburger: N, lock: Rc<ScrollLock<N>>) -> Self {
        Self {
            menu,
            hamburger,
            lock,
            open: Cell::new(false),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn toggle(&self) {
        let open = !self.open.get();
        self.open.set(open);

        self.menu.set_class(ACTIVE_CLASS, open);
        self.hamburger.set_class(ACTIVE_CLASS, open);

        if open {
            self.lock.acquire(LockHolder::Menu);
        } else {
            self.lock.release(LockHolder::Menu);
        }
    }

    pub fn close(&self) {
        if self.open.get() {
            self.toggle();
        }
    }

    /// Document-level click. `inside` is true when the target lies within the menu or
    /// the hamburger, whose own handlers deal with it.
    pub fn handle_document_click(&self, inside: bool) {
        if !inside {
            self.close();
        }
    }

    pub fn handle_key(&self, key: &str) {
        if key == "Escape" {
            self.close();
        }
    }

    pub fn handle_resize(&self, viewport_width: f64, desktop_breakpoint: f64) {
        if viewport_width > desktop_breakpoint {
            self.close();
        }
    }
}

/// Edge-triggered tracker for the navbar's fixed state.
#[derive(Debug, Default)]
pub struct NavbarPin {
    fixed: Cell<bool>,
}

impl NavbarPin {
    pub fn is_fixed(&self) -> bool {
        self.fixed.get()
    }

    /// Returns the new state only when the scroll offset crosses the navbar height.
    pub fn observe(&self, scroll_y: f64, navbar_height: f64) -> Option<bool> {
        let fixed = self.fixed.get();

        if scroll_y > navbar_height && !fixed {
            self.fixed.set(true);
            Some(true)
        } else if scroll_y <= navbar_height && fixed {
            self.fixed.set(false);
            Some(false)
        } else {
            None
        }
    }
}

pub struct Navbar<N> {
    navbar: N,
    body: N,
    pin: NavbarPin,
}

impl<N: Node> Navbar<N> {
    pub fn new(navbar: N, body: N) -> Self {
        Self {
            navbar,
            body,
            pin: NavbarPin::default(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.pin.is_fixed()
    }

    pub fn handle_scroll(&self, scroll_y: f64) {
        if let Some(fixed) = self.pin.observe(scroll_y, self.navbar.offset_height()) {
            self.navbar.set_class(NAVBAR_FIXED_CLASS, fixed);
            self.body.set_class(BODY_NAVBAR_FIXED_CLASS, fixed);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionSpan {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionSpan {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    pub fn measure<N: Node>(section: &N) -> Option<Self> {
        let id = section.attribute("id").filter(|id| !id.is_empty())?;
        Some(Self::new(id, section.offset_top(), section.offset_height()))
    }

    fn contains(&self, position: f64) -> bool {
        position >= self.top && position < self.top + self.height
    }
}

/// The section under `scroll_y + lookahead`; later sections win overlaps. Near the top
/// of the page the home section is forced.
pub fn active_section(
    sections: &[SectionSpan],
    scroll_y: f64,
    lookahead: f64,
    home_threshold: f64,
) -> Option<&str> {
    if scroll_y < home_threshold {
        return Some(HOME_SECTION);
    }

    let position = scroll_y + lookahead;
    sections
        .iter()
        .rev()
        .find(|section| section.contains(position))
        .map(|section| section.id.as_str())
}

/// Marks the link pointing at `current` active and clears the rest.
pub fn highlight_links<N: Node>(links: &[N], current: Option<&str>) {
    for link in links {
        let is_current = match (current, link.attribute("href")) {
            (Some(id), Some(href)) => href.strip_prefix('#') == Some(id),
            _ => false,
        };
        link.set_class(ACTIVE_CLASS, is_current);
    }
}

/// The element id an in-page anchor points at, if any.
pub fn anchor_target_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Scroll offset that leaves `clearance` units above the target for the fixed navbar.
pub fn anchor_scroll_top(target_offset_top: f64, clearance: f64) -> f64 {
    target_offset_top - clearance
}
