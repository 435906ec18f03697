use js_sys::{Array, Reflect};
use serde_json::json;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    window, Document, Element, ErrorEvent, Event, EventTarget,
    HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlTextAreaElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, ScrollBehavior,
    ScrollToOptions, ServiceWorkerRegistration, Storage, Window,
};

use crate::{
    a11y::{self, FocusRing, HERO_SELECTOR},
    config::{SiteConfig, CONFIG_ELEMENT_ID},
    dom::{Node, ScrollLock},
    error::SiteError,
    forms::{
        ContactForm, FieldGroup, CONTACT_FORM_ID, EMAIL_FIELD_SELECTOR, FORM_GROUP_SELECTOR,
        REPLY_TO_FIELD_SELECTOR, SUBMIT_SELECTOR,
    },
    logging::Logger,
    modal::{apply_embed_support, ModalController, ModalSpec, CERTIFICATE_MODAL, PDF_MODAL},
    navigation::{
        active_section, anchor_scroll_top, anchor_target_id, highlight_links, MobileMenu, Navbar,
        SectionSpan,
    },
    perf::{animation_profile, LazyImageLoader, LAZY_IMAGE_SELECTOR},
    reveal::{RevealAnimator, REVEAL_ROOT_MARGIN, REVEAL_SELECTOR, REVEAL_THRESHOLD},
    startup::{wire_features, WiringStep},
    theme::{
        patch_viewer, viewer_placement, Theme, ThemeController, ThemeStore, HERO_VIEWER_SELECTOR,
        SKILLS_VIEWER_SELECTOR, VIEWER_SELECTOR,
    },
    utils::{is_element_in_viewport, throttle, Rect, Scheduler, TimerHandle, Viewport},
};

const LOADED_CLASS: &str = "loaded";

/// Wiring order. Keyboard and resize handling read the menu wired before them.
const FEATURES: &[WiringStep<SiteContext, SiteError>] = &[
    WiringStep::new("menu", SiteContext::wire_menu),
    WiringStep::new("active_section", SiteContext::wire_active_section),
    WiringStep::new("keyboard", SiteContext::wire_keyboard),
    WiringStep::new("resize", SiteContext::wire_resize),
    WiringStep::new("theme", SiteContext::wire_theme),
    WiringStep::new("smooth_scroll", SiteContext::wire_smooth_scroll),
    WiringStep::new("reveal", SiteContext::wire_reveal),
    WiringStep::new("forms", SiteContext::wire_forms),
    WiringStep::new("skip_link", SiteContext::wire_skip_link),
    WiringStep::new("navbar", SiteContext::wire_navbar),
    WiringStep::new("performance", SiteContext::wire_performance),
    WiringStep::new("pdf_modal", |site: &mut SiteContext| site.wire_modal(PDF_MODAL)),
    WiringStep::new("certificate_modal", |site: &mut SiteContext| {
        site.wire_modal(CERTIFICATE_MODAL)
    }),
];

thread_local! {
    static SITE: RefCell<Option<SiteContext>> = const { RefCell::new(None) };
}

/// An `HTMLElement` seen through the [`Node`] capability trait.
#[derive(Clone, PartialEq)]
pub struct DomNode(HtmlElement);

impl DomNode {
    fn from_element(element: Element) -> Option<Self> {
        element.dyn_into::<HtmlElement>().ok().map(Self)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.0
    }

    fn target(&self) -> &EventTarget {
        self.0.as_ref()
    }
}

impl Node for DomNode {
    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn set_class(&self, class: &str, enabled: bool) {
        let _ = self.0.class_list().toggle_with_force(class, enabled);
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.0.set_attribute(name, value);
    }

    fn set_style(&self, property: &str, value: &str) {
        let _ = self.0.style().set_property(property, value);
    }

    fn set_style_important(&self, property: &str, value: &str) {
        let _ = self
            .0
            .style()
            .set_property_with_priority(property, value, "important");
    }

    fn value(&self) -> Option<String> {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            return Some(input.value());
        }
        self.0
            .dyn_ref::<HtmlTextAreaElement>()
            .map(HtmlTextAreaElement::value)
    }

    fn set_value(&self, value: &str) {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        }
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn set_disabled(&self, disabled: bool) {
        if let Some(button) = self.0.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if disabled {
            let _ = self.0.set_attribute("disabled", "");
        } else {
            let _ = self.0.remove_attribute("disabled");
        }
    }

    fn focus(&self) {
        let _ = self.0.focus();
    }

    fn offset_top(&self) -> f64 {
        f64::from(self.0.offset_top())
    }

    fn offset_height(&self) -> f64 {
        f64::from(self.0.offset_height())
    }
}

fn by_id(document: &Document, id: &str) -> Option<DomNode> {
    document.get_element_by_id(id).and_then(DomNode::from_element)
}

fn query(document: &Document, selector: &str) -> Option<DomNode> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(DomNode::from_element)
}

fn query_within(element: &Element, selector: &str) -> Option<DomNode> {
    element
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(DomNode::from_element)
}

fn query_all(document: &Document, selector: &str) -> Vec<DomNode> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .map(DomNode)
        .collect()
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

struct LocalStorageTheme {
    key: String,
}

impl ThemeStore for LocalStorageTheme {
    fn load(&self) -> Option<String> {
        local_storage()?.get_item(&self.key).ok().flatten()
    }

    fn save(&self, value: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(&self.key, value);
        }
    }
}

struct BrowserScheduler {
    window: Window,
}

impl Scheduler for BrowserScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TimerHandle {
        let callback = Closure::once_into_js(move || task());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
            .unwrap_or(0);
        TimerHandle(id)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.window.clear_timeout_with_handle(handle.0);
    }
}

fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

fn supports(target: &JsValue, property: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(property)).unwrap_or(false)
}

fn browser_renders_pdf(window: &Window) -> bool {
    let navigator = window.navigator();

    if let Some(enabled) = Reflect::get(&navigator, &JsValue::from_str("pdfViewerEnabled"))
        .ok()
        .and_then(|value| value.as_bool())
    {
        return enabled;
    }

    navigator
        .mime_types()
        .ok()
        .and_then(|types| types.named_item("application/pdf"))
        .is_some()
}

fn viewport(window: &Window) -> Viewport {
    let client = window.document().and_then(|d| d.document_element());
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .or_else(|| client.as_ref().map(|root| f64::from(root.client_width())))
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .or_else(|| client.as_ref().map(|root| f64::from(root.client_height())))
        .unwrap_or(0.0);

    Viewport { width, height }
}

pub fn is_in_viewport(window: &Window, element: &Element) -> bool {
    let bounds = element.get_bounding_client_rect();
    let rect = Rect {
        top: bounds.top(),
        left: bounds.left(),
        bottom: bounds.bottom(),
        right: bounds.right(),
    };
    is_element_in_viewport(rect, viewport(window))
}

fn keyboard_key(event: &Event) -> Option<String> {
    event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key)
}

/// An attached event listener; detached again when dropped.
struct Listener {
    target: EventTarget,
    kind: String,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, SiteError> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;

        Ok(Self {
            target: target.clone(),
            kind: kind.to_string(),
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// An intersection observer together with the closure it calls.
struct Observer {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Observer {
    /// Observes `nodes`, unobserving each one once `handle` reports it done.
    fn watch(
        nodes: &[DomNode],
        init: Option<&IntersectionObserverInit>,
        mut handle: impl FnMut(&DomNode, bool) -> bool + 'static,
    ) -> Result<Self, SiteError> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let Some(target) = DomNode::from_element(entry.target()) else {
                        continue;
                    };
                    if handle(&target, entry.is_intersecting()) {
                        observer.unobserve(target.element());
                    }
                }
            },
        );

        let observer = match init {
            Some(init) => {
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), init)?
            }
            None => IntersectionObserver::new(callback.as_ref().unchecked_ref())?,
        };
        for node in nodes {
            observer.observe(node.element());
        }

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Re-themes embedded 3D viewers, which style themselves once their runtime loads.
struct ViewerPatcher {
    document: Document,
    scheduler: Rc<dyn Scheduler>,
}

impl ViewerPatcher {
    fn patch_now(&self, theme: Theme) {
        let hero = query(&self.document, HERO_VIEWER_SELECTOR);
        let skills = query(&self.document, SKILLS_VIEWER_SELECTOR);
        for viewer in query_all(&self.document, VIEWER_SELECTOR) {
            let canvas = query_within(viewer.element(), "canvas");
            let placement = viewer_placement(&viewer, hero.as_ref(), skills.as_ref());
            patch_viewer(theme, &viewer, canvas.as_ref(), placement);
        }
    }

    /// Best-effort fallback for viewers that never announce readiness.
    fn patch_later(self: &Rc<Self>, theme: Theme, delay_ms: u32) {
        let patcher = Rc::clone(self);
        self.scheduler
            .set_timeout(delay_ms, Box::new(move || patcher.patch_now(theme)));
    }
}

/// Everything the page wires up at startup. Dropping it detaches every listener and
/// observer and removes the global viewer functions.
pub struct SiteContext {
    window: Window,
    document: Document,
    body: DomNode,
    root: DomNode,
    config: SiteConfig,
    logger: Logger,
    scheduler: Rc<dyn Scheduler>,
    lock: Rc<ScrollLock<DomNode>>,
    menu: Option<Rc<MobileMenu<DomNode>>>,
    listeners: Vec<Listener>,
    observers: Vec<Observer>,
    globals: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

impl SiteContext {
    pub fn start(window: Window, config: SiteConfig) -> Result<Self, SiteError> {
        let document = window.document().ok_or(SiteError::MissingDocument)?;
        let body = document.body().map(DomNode).ok_or(SiteError::MissingBody)?;
        let root = document
            .document_element()
            .and_then(DomNode::from_element)
            .ok_or(SiteError::MissingDocument)?;
        let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler {
            window: window.clone(),
        });

        let mut site = Self {
            logger: Logger::new(config.log_level),
            lock: Rc::new(ScrollLock::new(body.clone())),
            window,
            document,
            body,
            root,
            config,
            scheduler,
            menu: None,
            listeners: Vec::new(),
            observers: Vec::new(),
            globals: Vec::new(),
        };

        let logger = site.logger;
        let failed = wire_features(&mut site, FEATURES, logger);
        if !failed.is_empty() {
            logger.warn("site_degraded", json!({ "failed": failed }));
        }

        site.body.set_class(LOADED_CLASS, true);
        Ok(site)
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), SiteError> {
        self.listeners.push(Listener::attach(target, kind, handler)?);
        Ok(())
    }

    fn document_target(&self) -> EventTarget {
        self.document.clone().into()
    }

    fn window_target(&self) -> EventTarget {
        self.window.clone().into()
    }

    fn expose(&mut self, name: &'static str, action: impl FnMut() + 'static) -> Result<(), SiteError> {
        let callback = Closure::<dyn FnMut()>::new(action);
        Reflect::set(&self.window, &JsValue::from_str(name), callback.as_ref())?;
        self.globals.push((name, callback));
        Ok(())
    }

    fn wire_theme(&mut self) -> Result<(), SiteError> {
        let toggle = by_id(&self.document, "theme-toggle");
        let icon = toggle
            .as_ref()
            .and_then(|toggle| query_within(toggle.element(), "i"));
        let store = LocalStorageTheme {
            key: self.config.theme_storage_key.clone(),
        };
        let theme = Rc::new(ThemeController::load(store, self.root.clone(), icon));
        let patcher = Rc::new(ViewerPatcher {
            document: self.document.clone(),
            scheduler: Rc::clone(&self.scheduler),
        });

        patcher.patch_later(theme.current(), self.config.viewer_retheme_delay_ms);
        patcher.patch_later(theme.current(), self.config.viewer_initial_delay_ms);

        let ready_event = self.config.viewer_ready_event.clone();
        for viewer in query_all(&self.document, VIEWER_SELECTOR) {
            let theme = Rc::clone(&theme);
            let patcher = Rc::clone(&patcher);
            self.listen(viewer.target(), &ready_event, move |_| {
                patcher.patch_now(theme.current());
            })?;
        }

        if let Some(toggle) = toggle {
            let delay = self.config.viewer_retheme_delay_ms;
            let logger = self.logger;
            self.listen(toggle.target(), "click", move |_| {
                let next = theme.toggle();
                patcher.patch_later(next, delay);
                logger.debug("theme_toggled", json!({ "theme": next.as_str() }));
            })?;
        }

        Ok(())
    }

    fn wire_menu(&mut self) -> Result<(), SiteError> {
        let (Some(hamburger), Some(menu)) = (
            by_id(&self.document, "hamburger"),
            by_id(&self.document, "nav-menu"),
        ) else {
            return Ok(());
        };

        let controller = Rc::new(MobileMenu::new(
            menu.clone(),
            hamburger.clone(),
            Rc::clone(&self.lock),
        ));
        self.menu = Some(Rc::clone(&controller));

        {
            let controller = Rc::clone(&controller);
            self.listen(hamburger.target(), "click", move |_| controller.toggle())?;
        }

        for link in query_all(&self.document, ".nav-link") {
            let controller = Rc::clone(&controller);
            self.listen(link.target(), "click", move |_| controller.close())?;
        }

        {
            let controller = Rc::clone(&controller);
            let document = self.document_target();
            self.listen(&document, "click", move |event: Event| {
                let inside = event
                    .target()
                    .and_then(|target| target.dyn_into::<web_sys::Node>().ok())
                    .map(|target| {
                        menu.element().contains(Some(&target))
                            || hamburger.element().contains(Some(&target))
                    })
                    .unwrap_or(false);
                controller.handle_document_click(inside);
            })?;
        }

        Ok(())
    }

    fn wire_active_section(&mut self) -> Result<(), SiteError> {
        let links = query_all(&self.document, ".nav-link");
        let sections = query_all(&self.document, "section[id]");
        let window = self.window.clone();
        let lookahead = self.config.section_lookahead;
        let home_threshold = self.config.home_threshold;

        let update: Rc<dyn Fn()> = Rc::new(move || {
            let scroll_y = window.scroll_y().unwrap_or(0.0);
            let spans: Vec<SectionSpan> = sections.iter().filter_map(SectionSpan::measure).collect();
            highlight_links(&links, active_section(&spans, scroll_y, lookahead, home_threshold));
        });

        let throttled = {
            let update = Rc::clone(&update);
            throttle(
                Rc::clone(&self.scheduler),
                self.config.section_throttle_ms,
                move |_: ()| update(),
            )
        };
        let window = self.window_target();
        self.listen(&window, "scroll", move |_| throttled(()))?;

        self.scheduler
            .set_timeout(self.config.section_settle_ms, Box::new(move || update()));
        Ok(())
    }

    fn wire_keyboard(&mut self) -> Result<(), SiteError> {
        let menu = self.menu.clone();
        let focus_ring = Rc::new(FocusRing::new(self.body.clone()));
        let document = self.document_target();

        {
            let focus_ring = Rc::clone(&focus_ring);
            self.listen(&document, "keydown", move |event: Event| {
                let Some(key) = keyboard_key(&event) else {
                    return;
                };
                if let Some(menu) = menu.as_ref() {
                    menu.handle_key(&key);
                }
                focus_ring.handle_key(&key);
            })?;
        }

        self.listen(&document, "mousedown", move |_| focus_ring.handle_pointer_down())
    }

    fn wire_resize(&mut self) -> Result<(), SiteError> {
        let Some(menu) = self.menu.clone() else {
            return Ok(());
        };
        let window = self.window.clone();
        let breakpoint = self.config.desktop_breakpoint;
        let target = self.window_target();

        self.listen(&target, "resize", move |_| {
            if let Some(width) = window.inner_width().ok().and_then(|value| value.as_f64()) {
                menu.handle_resize(width, breakpoint);
            }
        })
    }

    fn wire_smooth_scroll(&mut self) -> Result<(), SiteError> {
        for link in query_all(&self.document, "a[href^=\"#\"]") {
            let document = self.document.clone();
            let window = self.window.clone();
            let clearance = self.config.navbar_clearance;
            let anchor = link.clone();

            self.listen(link.target(), "click", move |event: Event| {
                event.prevent_default();

                let href = anchor.attribute("href").unwrap_or_default();
                let Some(target) = anchor_target_id(&href).and_then(|id| by_id(&document, id)) else {
                    return;
                };

                let options = ScrollToOptions::new();
                options.set_top(anchor_scroll_top(target.offset_top(), clearance));
                options.set_behavior(ScrollBehavior::Smooth);
                window.scroll_to_with_scroll_to_options(&options);
            })?;
        }

        Ok(())
    }

    fn wire_reveal(&mut self) -> Result<(), SiteError> {
        if !supports(&self.window, "IntersectionObserver") {
            return Ok(());
        }

        let elements = query_all(&self.document, REVEAL_SELECTOR);
        let animator = Rc::new(RefCell::new(RevealAnimator::new()));
        for element in &elements {
            animator.borrow_mut().register(element.clone());
        }

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(REVEAL_THRESHOLD));
        init.set_root_margin(REVEAL_ROOT_MARGIN);

        let observer = Observer::watch(&elements, Some(&init), move |element, intersecting| {
            animator.borrow_mut().handle_intersection(element, intersecting)
        })?;
        self.observers.push(observer);
        Ok(())
    }

    fn wire_forms(&mut self) -> Result<(), SiteError> {
        if let Some(form) = by_id(&self.document, CONTACT_FORM_ID) {
            let contact = ContactForm::new(
                query_within(form.element(), EMAIL_FIELD_SELECTOR),
                query_within(form.element(), REPLY_TO_FIELD_SELECTOR),
                query_within(form.element(), SUBMIT_SELECTOR),
            );
            let logger = self.logger;
            self.listen(form.target(), "submit", move |_| {
                contact.prepare_submission();
                logger.info("contact_form_submitted", json!({}));
            })?;
        }

        for group in query_all(&self.document, FORM_GROUP_SELECTOR) {
            let (Some(input), Some(_label)) = (
                query_within(group.element(), "input, textarea"),
                query_within(group.element(), "label"),
            ) else {
                continue;
            };

            let field = Rc::new(FieldGroup::new(group, input.clone()));
            {
                let field = Rc::clone(&field);
                self.listen(input.target(), "focus", move |_| field.handle_focus())?;
            }
            self.listen(input.target(), "blur", move |_| field.handle_blur())?;
        }

        Ok(())
    }

    fn wire_skip_link(&mut self) -> Result<(), SiteError> {
        let link = self
            .document
            .create_element("a")
            .ok()
            .and_then(DomNode::from_element)
            .ok_or_else(|| SiteError::Js("could not create skip link".to_string()))?;
        a11y::style_skip_link(&link);

        {
            let anchor = link.clone();
            self.listen(link.target(), "focus", move |_| {
                a11y::set_skip_link_focused(&anchor, true)
            })?;
        }
        {
            let anchor = link.clone();
            self.listen(link.target(), "blur", move |_| {
                a11y::set_skip_link_focused(&anchor, false)
            })?;
        }

        let body = self.body.element();
        body.insert_before(link.element(), body.first_child().as_ref())?;

        if let Some(hero) = query(&self.document, HERO_SELECTOR) {
            a11y::mark_main_landmark(&hero);
        }
        Ok(())
    }

    fn wire_navbar(&mut self) -> Result<(), SiteError> {
        let Some(navbar) = by_id(&self.document, "navbar") else {
            self.logger.warn("navbar_missing", json!({ "id": "navbar" }));
            return Ok(());
        };

        let navbar = Rc::new(Navbar::new(navbar, self.body.clone()));
        navbar.handle_scroll(self.window.scroll_y().unwrap_or(0.0));

        let throttled = {
            let navbar = Rc::clone(&navbar);
            throttle(
                Rc::clone(&self.scheduler),
                self.config.navbar_throttle_ms,
                move |scroll_y: f64| navbar.handle_scroll(scroll_y),
            )
        };
        let window = self.window.clone();
        let target = self.window_target();
        self.listen(&target, "scroll", move |_| {
            throttled(window.scroll_y().unwrap_or(0.0));
        })
    }

    fn wire_performance(&mut self) -> Result<(), SiteError> {
        let images = query_all(&self.document, LAZY_IMAGE_SELECTOR);
        let loader = Rc::new(RefCell::new(LazyImageLoader::new()));
        for image in &images {
            loader.borrow_mut().watch(image.clone());
        }

        if supports(&self.window, "IntersectionObserver") {
            let observer = Observer::watch(&images, None, move |image, intersecting| {
                loader.borrow_mut().handle_intersection(image, intersecting)
            })?;
            self.observers.push(observer);
        } else if !images.is_empty() {
            self.wire_lazy_images_on_scroll(images, loader)?;
        }

        let cores = self.window.navigator().hardware_concurrency();
        let reduced_motion = prefers_reduced_motion(&self.window);
        if let Some(profile) = animation_profile(Some(cores), reduced_motion) {
            profile.apply(&self.root);
            self.logger.debug(
                "animations_shortened",
                json!({ "cores": cores, "reduced_motion": reduced_motion }),
            );
        }

        Ok(())
    }

    /// Without an intersection observer, images load once they sit fully in the viewport.
    fn wire_lazy_images_on_scroll(
        &mut self,
        images: Vec<DomNode>,
        loader: Rc<RefCell<LazyImageLoader<DomNode>>>,
    ) -> Result<(), SiteError> {
        let window = self.window.clone();
        let check: Rc<dyn Fn()> = Rc::new(move || {
            let mut loader = loader.borrow_mut();
            for image in &images {
                loader.handle_intersection(image, is_in_viewport(&window, image.element()));
            }
        });
        check();

        let throttled = throttle(
            Rc::clone(&self.scheduler),
            self.config.section_throttle_ms,
            move |_: ()| check(),
        );
        let target = self.window_target();
        self.listen(&target, "scroll", move |_| throttled(()))
    }

    fn wire_modal(&mut self, spec: ModalSpec) -> Result<(), SiteError> {
        let container = by_id(&self.document, spec.container_id);
        let close_button = container
            .as_ref()
            .and_then(|container| query_within(container.element(), spec.close_selector));
        let controller = Rc::new(ModalController::new(
            spec,
            container.clone(),
            close_button,
            Rc::clone(&self.lock),
        ));

        if let Some(container) = container {
            let controller = Rc::clone(&controller);
            let backdrop = container.target().clone();
            self.listen(container.target(), "click", move |event: Event| {
                let on_backdrop = event.target().as_ref() == Some(&backdrop);
                controller.handle_backdrop_click(on_backdrop);
            })?;
        }

        {
            let controller = Rc::clone(&controller);
            let document = self.document_target();
            self.listen(&document, "keydown", move |event: Event| {
                if let Some(key) = keyboard_key(&event) {
                    controller.handle_key(&key);
                }
            })?;
        }

        let embed = by_id(&self.document, spec.embed_id);
        let fallback = query(&self.document, spec.fallback_selector);
        let supported = embed.is_some() && browser_renders_pdf(&self.window);
        if apply_embed_support(embed.as_ref(), fallback.as_ref(), supported) {
            self.logger.info(
                "embed_fallback_shown",
                json!({ "modal": controller.spec().kind.as_str() }),
            );
        }

        {
            let controller = Rc::clone(&controller);
            self.expose(spec.open_global, move || controller.open())?;
        }
        self.expose(spec.close_global, move || controller.close())
    }
}

impl Drop for SiteContext {
    fn drop(&mut self) {
        for (name, _) in &self.globals {
            let _ = Reflect::delete_property(&self.window, &JsValue::from_str(name));
        }
        self.observers.clear();
        self.listeners.clear();
    }
}

fn read_config(document: &Document, logger: Logger) -> SiteConfig {
    let raw = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
        .unwrap_or_default();

    SiteConfig::from_json(&raw).unwrap_or_else(|error| {
        logger.warn("site_config_invalid", json!({ "error": error.to_string() }));
        SiteConfig::default()
    })
}

fn install_error_logger(window: &Window, logger: Logger) -> Result<(), SiteError> {
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(event) = event.dyn_ref::<ErrorEvent>() else {
            return;
        };
        logger.error(
            "uncaught_error",
            json!({
                "message": event.message(),
                "source": event.filename(),
                "line": event.lineno(),
                "column": event.colno(),
            }),
        );
    });
    window.add_event_listener_with_callback("error", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn register_service_worker(window: &Window, path: String, logger: Logger) {
    let navigator = window.navigator();
    if !supports(&navigator, "serviceWorker") {
        return;
    }

    let promise = navigator.service_worker().register(&path);
    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(registration) => {
                let scope = registration
                    .dyn_ref::<ServiceWorkerRegistration>()
                    .map(ServiceWorkerRegistration::scope);
                logger.info(
                    "service_worker_registered",
                    json!({ "path": path, "scope": scope }),
                );
            }
            Err(error) => {
                logger.warn(
                    "service_worker_failed",
                    json!({ "path": path, "error": SiteError::from(error).to_string() }),
                );
            }
        }
    });
}

fn schedule_service_worker(window: &Window, document: &Document, config: &SiteConfig, logger: Logger) {
    let Some(path) = config.service_worker_path.clone() else {
        return;
    };

    if document.ready_state() == "complete" {
        register_service_worker(window, path, logger);
        return;
    }

    let target = window.clone();
    let callback = Closure::once_into_js(move || register_service_worker(&target, path, logger));
    if window
        .add_event_listener_with_callback("load", callback.unchecked_ref())
        .is_err()
    {
        logger.warn("service_worker_skipped", json!({ "reason": "load listener failed" }));
    }
}

/// Tears the site down when the page is discarded; a page kept in the back/forward cache
/// stays wired.
fn install_teardown(window: &Window) -> Result<(), SiteError> {
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let persisted = Reflect::get(&event, &JsValue::from_str("persisted"))
            .ok()
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        if !persisted {
            let site = SITE.with(|slot| slot.borrow_mut().take());
            drop(site);
        }
    });
    window.add_event_listener_with_callback("pagehide", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn start(window: Window, config: SiteConfig) {
    let logger = Logger::new(config.log_level);

    match SiteContext::start(window, config) {
        Ok(site) => {
            SITE.with(|slot| *slot.borrow_mut() = Some(site));
            logger.info("site_initialized", json!({}));
        }
        Err(error) => {
            logger.error("site_init_failed", json!({ "error": error.to_string() }));
        }
    }
}

pub fn run() {
    console_error_panic_hook::set_once();

    let Some(window) = window() else {
        return;
    };
    let logger = Logger::default();
    if let Err(error) = install_error_logger(&window, logger) {
        logger.warn("error_logger_unavailable", json!({ "error": error.to_string() }));
    }

    let Some(document) = window.document() else {
        logger.error("site_init_failed", json!({ "error": SiteError::MissingDocument.to_string() }));
        return;
    };
    let config = read_config(&document, logger);
    let logger = Logger::new(config.log_level);

    schedule_service_worker(&window, &document, &config, logger);
    if let Err(error) = install_teardown(&window) {
        logger.warn("teardown_unavailable", json!({ "error": error.to_string() }));
    }

    if document.ready_state() == "loading" {
        let target = window.clone();
        let callback = Closure::once_into_js(move || start(target, config));
        if let Err(error) =
            document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
        {
            logger.error(
                "site_init_failed",
                json!({ "error": SiteError::from(error).to_string() }),
            );
        }
    } else {
        start(window, config);
    }
}
