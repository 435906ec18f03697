use std::cell::Cell;

use crate::dom::Node;

pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const VIEWER_SELECTOR: &str = "spline-viewer";
pub const HERO_VIEWER_SELECTOR: &str = "body > spline-viewer";
pub const SKILLS_VIEWER_SELECTOR: &str = ".skills spline-viewer";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// The toggle shows the theme it switches to.
    pub fn icon_class(self) -> &'static str {
        match self {
            Self::Light => "fas fa-moon",
            Self::Dark => "fas fa-sun",
        }
    }
}

/// Persistence for the chosen theme; local storage in the browser.
pub trait ThemeStore {
    fn load(&self) -> Option<String>;
    fn save(&self, value: &str);
}

pub struct ThemeController<S, N> {
    store: S,
    current: Cell<Theme>,
    root: N,
    icon: Option<N>,
}

impl<S: ThemeStore, N: Node> ThemeController<S, N> {
    /// Reads the stored theme (light when absent or unrecognised) and applies it.
    pub fn load(store: S, root: N, icon: Option<N>) -> Self {
        let current = store
            .load()
            .as_deref()
            .and_then(Theme::from_str)
            .unwrap_or(Theme::Light);

        let controller = Self {
            store,
            current: Cell::new(current),
            root,
            icon,
        };
        controller.apply();
        controller
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current.get().toggled();
        self.current.set(next);
        self.apply();
        self.store.save(next.as_str());
        next
    }

    fn apply(&self) {
        let theme = self.current.get();
        self.root.set_attribute(THEME_ATTRIBUTE, theme.as_str());

        if let Some(icon) = self.icon.as_ref() {
            icon.set_attribute("class", theme.icon_class());
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerPlacement {
    Hero,
    Skills,
    Inline,
}

/// The hero and skills slots each style only the first viewer matching their selector;
/// every other viewer is inline.
pub fn viewer_placement<N: PartialEq>(
    viewer: &N,
    hero: Option<&N>,
    skills: Option<&N>,
) -> ViewerPlacement {
    if hero == Some(viewer) {
        ViewerPlacement::Hero
    } else if skills == Some(viewer) {
        ViewerPlacement::Skills
    } else {
        ViewerPlacement::Inline
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: &'static str,
    pub important: bool,
}

const fn decl(property: &'static str, value: &'static str) -> Declaration {
    Declaration {
        property,
        value,
        important: false,
    }
}

const fn forced(property: &'static str, value: &'static str) -> Declaration {
    Declaration {
        property,
        value,
        important: true,
    }
}

const DARK_GRADIENT: &str = "linear-gradient(135deg, #0f172a 0%, #1e293b 100%)";
const LIGHT_GRADIENT: &str = "linear-gradient(135deg, #ffffff 0%, #f8fafc 100%)";

/// Background for any viewer surface (the element and the canvas inside it).
pub fn surface_backdrop(theme: Theme) -> [Declaration; 2] {
    match theme {
        Theme::Dark => [
            forced("background", DARK_GRADIENT),
            forced("background-color", "#0f172a"),
        ],
        Theme::Light => [
            forced("background", LIGHT_GRADIENT),
            forced("background-color", "#ffffff"),
        ],
    }
}

/// Declarations laid over the surface backdrop for viewers in a specific slot.
pub fn placement_overrides(theme: Theme, placement: ViewerPlacement) -> &'static [Declaration] {
    const HERO_DARK: &[Declaration] = &[
        decl(
            "background",
            "linear-gradient(135deg, rgba(15, 23, 42, 0.1) 0%, rgba(30, 41, 59, 0.1) 100%)",
        ),
        decl("background-color", "rgba(15, 23, 42, 0.1)"),
    ];
    const HERO_LIGHT: &[Declaration] = &[
        decl(
            "background",
            "linear-gradient(135deg, rgba(255, 255, 255, 0.1) 0%, rgba(248, 250, 252, 0.1) 100%)",
        ),
        decl("background-color", "rgba(255, 255, 255, 0.1)"),
    ];
    const SKILLS_DARK: &[Declaration] = &[
        decl("background", "#0f172a"),
        decl("background-color", "#0f172a"),
        decl("border", "1px solid #334155"),
        decl("border-radius", "0.5rem"),
        decl("box-shadow", "0 2px 10px rgba(0, 0, 0, 0.4)"),
    ];
    const SKILLS_LIGHT: &[Declaration] = &[
        decl("background", "#ffffff"),
        decl("background-color", "#ffffff"),
        decl("border", "1px solid #e2e8f0"),
        decl("border-radius", "0.5rem"),
        decl("box-shadow", "0 2px 10px rgba(0, 0, 0, 0.1)"),
    ];

    match (placement, theme) {
        (ViewerPlacement::Hero, Theme::Dark) => HERO_DARK,
        (ViewerPlacement::Hero, Theme::Light) => HERO_LIGHT,
        (ViewerPlacement::Skills, Theme::Dark) => SKILLS_DARK,
        (ViewerPlacement::Skills, Theme::Light) => SKILLS_LIGHT,
        (ViewerPlacement::Inline, _) => &[],
    }
}

fn write<N: Node>(node: &N, declaration: &Declaration) {
    if declaration.important {
        node.set_style_important(declaration.property, declaration.value);
    } else {
        node.set_style(declaration.property, declaration.value);
    }
}

/// Matches an embedded 3D viewer's background to `theme`.
pub fn patch_viewer<N: Node>(theme: Theme, viewer: &N, canvas: Option<&N>, placement: ViewerPlacement) {
    let backdrop = surface_backdrop(theme);

    for declaration in &backdrop {
        write(viewer, declaration);
    }
    if let Some(canvas) = canvas {
        for declaration in &backdrop {
            write(canvas, declaration);
        }
    }
    for declaration in placement_overrides(theme, placement) {
        write(viewer, declaration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::FakeNode;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Clone, Default)]
    struct MemoryStore(Rc<RefCell<Option<String>>>);

    impl MemoryStore {
        fn holding(value: &str) -> Self {
            Self(Rc::new(RefCell::new(Some(value.to_string()))))
        }

        fn stored(&self) -> Option<String> {
            self.0.borrow().clone()
        }
    }

    impl ThemeStore for MemoryStore {
        fn load(&self) -> Option<String> {
            self.0.borrow().clone()
        }

        fn save(&self, value: &str) {
            *self.0.borrow_mut() = Some(value.to_string());
        }
    }

    #[test]
    fn missing_stored_theme_defaults_to_light() {
        let root = FakeNode::new();
        let icon = FakeNode::new();
        let controller = ThemeController::load(MemoryStore::default(), root.clone(), Some(icon.clone()));

        assert_eq!(controller.current(), Theme::Light);
        assert_eq!(root.attribute("data-theme").as_deref(), Some("light"));
        assert_eq!(icon.attribute("class").as_deref(), Some("fas fa-moon"));
    }

    #[test]
    fn unrecognised_stored_theme_defaults_to_light() {
        let root = FakeNode::new();
        let controller = ThemeController::load(MemoryStore::holding("sepia"), root.clone(), None);

        assert_eq!(controller.current(), Theme::Light);
    }

    #[test]
    fn toggle_applies_and_persists() {
        let store = MemoryStore::holding("light");
        let root = FakeNode::new();
        let icon = FakeNode::new();
        let controller = ThemeController::load(store.clone(), root.clone(), Some(icon.clone()));

        assert_eq!(controller.toggle(), Theme::Dark);
        assert_eq!(root.attribute("data-theme").as_deref(), Some("dark"));
        assert_eq!(icon.attribute("class").as_deref(), Some("fas fa-sun"));
        assert_eq!(store.stored().as_deref(), Some("dark"));
    }

    #[test]
    fn toggling_twice_restores_attribute_and_stored_value() {
        let store = MemoryStore::holding("dark");
        let root = FakeNode::new();
        let controller = ThemeController::load(store.clone(), root.clone(), None);

        controller.toggle();
        controller.toggle();

        assert_eq!(controller.current(), Theme::Dark);
        assert_eq!(root.attribute("data-theme").as_deref(), Some("dark"));
        assert_eq!(store.stored().as_deref(), Some("dark"));
    }

    #[test]
    fn inline_viewer_and_canvas_get_forced_gradient() {
        let viewer = FakeNode::new();
        let canvas = FakeNode::new();

        patch_viewer(Theme::Dark, &viewer, Some(&canvas), ViewerPlacement::Inline);

        for node in [&viewer, &canvas] {
            assert_eq!(node.style("background").as_deref(), Some(DARK_GRADIENT));
            assert_eq!(node.style("background-color").as_deref(), Some("#0f172a"));
            assert!(node.is_important("background"));
        }
    }

    #[test]
    fn hero_viewer_ends_translucent() {
        let viewer = FakeNode::new();

        patch_viewer(Theme::Light, &viewer, None, ViewerPlacement::Hero);

        assert_eq!(
            viewer.style("background-color").as_deref(),
            Some("rgba(255, 255, 255, 0.1)")
        );
        assert!(!viewer.is_important("background-color"));
    }

    #[test]
    fn skills_viewer_gets_card_chrome_per_theme() {
        let viewer = FakeNode::new();

        patch_viewer(Theme::Dark, &viewer, None, ViewerPlacement::Skills);
        assert_eq!(viewer.style("border").as_deref(), Some("1px solid #334155"));
        assert_eq!(viewer.style("box-shadow").as_deref(), Some("0 2px 10px rgba(0, 0, 0, 0.4)"));

        patch_viewer(Theme::Light, &viewer, None, ViewerPlacement::Skills);
        assert_eq!(viewer.style("border").as_deref(), Some("1px solid #e2e8f0"));
        assert_eq!(viewer.style("background").as_deref(), Some("#ffffff"));
        assert_eq!(viewer.style("border-radius").as_deref(), Some("0.5rem"));
    }

    #[test]
    fn only_first_matching_viewer_takes_each_slot() {
        let hero = FakeNode::new();
        let second_hero = FakeNode::new();
        let skills = FakeNode::new();

        assert_eq!(viewer_placement(&hero, Some(&hero), Some(&skills)), ViewerPlacement::Hero);
        assert_eq!(viewer_placement(&skills, Some(&hero), Some(&skills)), ViewerPlacement::Skills);
        assert_eq!(
            viewer_placement(&second_hero, Some(&hero), Some(&skills)),
            ViewerPlacement::Inline
        );
        assert_eq!(viewer_placement(&hero, None, None), ViewerPlacement::Inline);
    }
}
