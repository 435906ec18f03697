use crate::dom::Node;

pub const KEYBOARD_NAVIGATION_CLASS: &str = "keyboard-navigation";
pub const MAIN_CONTENT_ID: &str = "main-content";
pub const HERO_SELECTOR: &str = ".hero";
pub const SKIP_LINK_CLASS: &str = "skip-link";
pub const SKIP_LINK_LABEL: &str = "Skip to main content";

pub const SKIP_LINK_STYLES: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("top", "-40px"),
    ("left", "6px"),
    ("background", "#000"),
    ("color", "#fff"),
    ("padding", "8px"),
    ("text-decoration", "none"),
    ("z-index", "10000"),
    ("transition", "top 0.3s"),
];

/// Shows focus outlines only while the visitor is navigating with the keyboard.
pub struct FocusRing<N> {
    body: N,
}

impl<N: Node> FocusRing<N> {
    pub fn new(body: N) -> Self {
        Self { body }
    }

    pub fn handle_key(&self, key: &str) {
        if key == "Tab" {
            self.body.set_class(KEYBOARD_NAVIGATION_CLASS, true);
        }
    }

    pub fn handle_pointer_down(&self) {
        self.body.set_class(KEYBOARD_NAVIGATION_CLASS, false);
    }
}

pub fn style_skip_link<N: Node>(link: &N) {
    link.set_attribute("href", &format!("#{MAIN_CONTENT_ID}"));
    link.set_class(SKIP_LINK_CLASS, true);
    link.set_text(SKIP_LINK_LABEL);
    for (property, value) in SKIP_LINK_STYLES {
        link.set_style(property, value);
    }
}

/// The skip link sits off-screen until it receives focus.
pub fn set_skip_link_focused<N: Node>(link: &N, focused: bool) {
    link.set_style("top", if focused { "6px" } else { "-40px" });
}

pub fn mark_main_landmark<N: Node>(hero: &N) {
    hero.set_attribute("id", MAIN_CONTENT_ID);
    hero.set_attribute("role", "main");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::FakeNode;

    #[test]
    fn tab_enables_focus_ring_until_pointer_down() {
        let body = FakeNode::new();
        let ring = FocusRing::new(body.clone());

        ring.handle_key("a");
        assert!(!body.has_class("keyboard-navigation"));

        ring.handle_key("Tab");
        assert!(body.has_class("keyboard-navigation"));

        ring.handle_pointer_down();
        assert!(!body.has_class("keyboard-navigation"));
    }

    #[test]
    fn skip_link_targets_main_content_and_slides_in_on_focus() {
        let link = FakeNode::new();
        let hero = FakeNode::new();

        style_skip_link(&link);
        mark_main_landmark(&hero);

        assert_eq!(link.attribute("href").as_deref(), Some("#main-content"));
        assert_eq!(link.text(), "Skip to main content");
        assert_eq!(link.style("top").as_deref(), Some("-40px"));
        assert_eq!(hero.attribute("id").as_deref(), Some("main-content"));
        assert_eq!(hero.attribute("role").as_deref(), Some("main"));

        set_skip_link_focused(&link, true);
        assert_eq!(link.style("top").as_deref(), Some("6px"));
        set_skip_link_focused(&link, false);
        assert_eq!(link.style("top").as_deref(), Some("-40px"));
    }
}
