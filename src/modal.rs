use std::rc::Rc;

use crate::dom::{LockHolder, Node, ScrollLock};

pub const VISIBLE_CLASS: &str = "show";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModalKind {
    Pdf,
    Certificate,
}

impl ModalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Certificate => "certificate",
        }
    }
}

/// Where a modal's parts live in the page markup.
#[derive(Clone, Copy, Debug)]
pub struct ModalSpec {
    pub kind: ModalKind,
    pub container_id: &'static str,
    pub embed_id: &'static str,
    pub fallback_selector: &'static str,
    pub close_selector: &'static str,
    pub open_global: &'static str,
    pub close_global: &'static str,
}

pub const PDF_MODAL: ModalSpec = ModalSpec {
    kind: ModalKind::Pdf,
    container_id: "pdf-modal",
    embed_id: "pdf-viewer",
    fallback_selector: "#pdf-modal .pdf-fallback",
    close_selector: ".pdf-close-btn",
    open_global: "openPDFViewer",
    close_global: "closePDFViewer",
};

pub const CERTIFICATE_MODAL: ModalSpec = ModalSpec {
    kind: ModalKind::Certificate,
    container_id: "certificate-modal",
    embed_id: "certificate-viewer",
    fallback_selector: "#certificate-modal .pdf-fallback",
    close_selector: ".pdf-close-btn",
    open_global: "openCertificateViewer",
    close_global: "closeCertificateViewer",
};

/// Open/closed state of one document modal. The `show` class on the container is the
/// state; there is no separate flag to drift from it.
pub struct ModalController<N> {
    spec: ModalSpec,
    container: Option<N>,
    close_button: Option<N>,
    lock: Rc<ScrollLock<N>>,
}

impl<N: Node> ModalController<N> {
    pub fn new(
        spec: ModalSpec,
        container: Option<N>,
        close_button: Option<N>,
        lock: Rc<ScrollLock<N>>,
    ) -> Self {
        Self {
            spec,
            container,
            close_button,
            lock,
        }
    }

    pub fn spec(&self) -> &ModalSpec {
        &self.spec
    }

    fn holder(&self) -> LockHolder {
        LockHolder::Modal(self.spec.kind)
    }

    pub fn is_open(&self) -> bool {
        self.container
            .as_ref()
            .map(|container| container.has_class(VISIBLE_CLASS))
            .unwrap_or(false)
    }

    pub fn open(&self) {
        let Some(container) = self.container.as_ref() else {
            return;
        };

        container.set_class(VISIBLE_CLASS, true);
        self.lock.acquire(self.holder());

        if let Some(close_button) = self.close_button.as_ref() {
            close_button.focus();
        }
    }

    pub fn close(&self) {
        let Some(container) = self.container.as_ref() else {
            return;
        };

        container.set_class(VISIBLE_CLASS, false);
        self.lock.release(self.holder());
    }

    /// `target_is_container` is true when the click landed on the backdrop itself rather
    /// than on the dialog content inside it.
    pub fn handle_backdrop_click(&self, target_is_container: bool) {
        if target_is_container && self.is_open() {
            self.close();
        }
    }

    pub fn handle_key(&self, key: &str) {
        if key == "Escape" && self.is_open() {
            self.close();
        }
    }
}

/// Swaps the embed for its fallback when the browser cannot render the document inline.
/// Returns whether the fallback is now shown.
pub fn apply_embed_support<N: Node>(embed: Option<&N>, fallback: Option<&N>, supported: bool) -> bool {
    if embed.is_some() && supported {
        return false;
    }

    let Some(fallback) = fallback else {
        return false;
    };

    fallback.set_style("display", "block");
    if let Some(embed) = embed {
        embed.set_style("display", "none");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::FakeNode;

    struct Fixture {
        body: FakeNode,
        container: FakeNode,
        close_button: FakeNode,
        lock: Rc<ScrollLock<FakeNode>>,
        controller: ModalController<FakeNode>,
    }

    fn fixture(spec: ModalSpec) -> Fixture {
        let body = FakeNode::new();
        let container = FakeNode::new();
        let close_button = FakeNode::new();
        let lock = Rc::new(ScrollLock::new(body.clone()));
        let controller = ModalController::new(
            spec,
            Some(container.clone()),
            Some(close_button.clone()),
            Rc::clone(&lock),
        );

        Fixture {
            body,
            container,
            close_button,
            lock,
            controller,
        }
    }

    #[test]
    fn open_shows_locks_and_focuses_close_control() {
        let f = fixture(PDF_MODAL);

        f.controller.open();

        assert!(f.controller.is_open());
        assert!(f.container.has_class("show"));
        assert_eq!(f.body.style("overflow").as_deref(), Some("hidden"));
        assert_eq!(f.close_button.focus_count(), 1);
    }

    #[test]
    fn escape_after_open_closes_and_releases_scroll() {
        let f = fixture(PDF_MODAL);

        f.controller.open();
        f.controller.handle_key("Escape");

        assert!(!f.controller.is_open());
        assert!(!f.lock.is_locked());
        assert_eq!(f.body.style("overflow").as_deref(), Some(""));
    }

    #[test]
    fn other_keys_leave_modal_open() {
        let f = fixture(CERTIFICATE_MODAL);

        f.controller.open();
        f.controller.handle_key("Enter");

        assert!(f.controller.is_open());
    }

    #[test]
    fn backdrop_click_while_closed_is_a_no_op() {
        let f = fixture(CERTIFICATE_MODAL);

        f.controller.handle_backdrop_click(true);

        assert!(!f.controller.is_open());
        assert!(f.body.style_writes().is_empty());
    }

    #[test]
    fn only_clicks_on_the_backdrop_itself_close() {
        let f = fixture(PDF_MODAL);

        f.controller.open();
        f.controller.handle_backdrop_click(false);
        assert!(f.controller.is_open());

        f.controller.handle_backdrop_click(true);
        assert!(!f.controller.is_open());
    }

    #[test]
    fn closing_one_modal_keeps_lock_for_another_holder() {
        let f = fixture(PDF_MODAL);
        let certificate = ModalController::new(
            CERTIFICATE_MODAL,
            Some(FakeNode::new()),
            None,
            Rc::clone(&f.lock),
        );

        f.controller.open();
        certificate.open();
        f.controller.close();

        assert_eq!(f.body.style("overflow").as_deref(), Some("hidden"));
        certificate.close();
        assert_eq!(f.body.style("overflow").as_deref(), Some(""));
    }

    #[test]
    fn missing_container_disables_the_modal() {
        let body = FakeNode::new();
        let lock = Rc::new(ScrollLock::new(body.clone()));
        let controller: ModalController<FakeNode> = ModalController::new(PDF_MODAL, None, None, lock);

        controller.open();

        assert!(!controller.is_open());
        assert!(body.style_writes().is_empty());
    }

    #[test]
    fn unsupported_embed_shows_fallback() {
        let embed = FakeNode::new();
        let fallback = FakeNode::new();

        assert!(apply_embed_support(Some(&embed), Some(&fallback), false));
        assert_eq!(fallback.style("display").as_deref(), Some("block"));
        assert_eq!(embed.style("display").as_deref(), Some("none"));
    }

    #[test]
    fn supported_embed_is_left_alone() {
        let embed = FakeNode::new();
        let fallback = FakeNode::new();

        assert!(!apply_embed_support(Some(&embed), Some(&fallback), true));
        assert!(fallback.style_writes().is_empty());
        assert!(embed.style_writes().is_empty());
    }

    #[test]
    fn missing_embed_falls_back_even_when_supported() {
        let fallback = FakeNode::new();

        assert!(apply_embed_support(None::<&FakeNode>, Some(&fallback), true));
        assert!(!apply_embed_support(None::<&FakeNode>, None, false));
    }
}
