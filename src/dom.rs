use std::{cell::RefCell, collections::BTreeSet};

use crate::modal::ModalKind;

/// The slice of an element the site behaviour needs. The browser adapter lives in
/// `frontend::DomNode`; tests use `fake::FakeNode`.
pub trait Node {
    fn has_class(&self, class: &str) -> bool;
    fn set_class(&self, class: &str, enabled: bool);
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
    fn set_style(&self, property: &str, value: &str);
    fn set_style_important(&self, property: &str, value: &str);
    fn value(&self) -> Option<String>;
    fn set_value(&self, value: &str);
    fn set_text(&self, text: &str);
    fn set_disabled(&self, disabled: bool);
    fn focus(&self);
    fn offset_top(&self) -> f64;
    fn offset_height(&self) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LockHolder {
    Menu,
    Modal(ModalKind),
}

/// Body scroll suppression shared by the mobile menu and the modals.
///
/// Scrolling stays locked while any holder remains, so closing one overlay cannot release
/// the lock another still needs. Acquire and release are idempotent per holder.
pub struct ScrollLock<N> {
    body: N,
    holders: RefCell<BTreeSet<LockHolder>>,
}

impl<N: Node> ScrollLock<N> {
    pub fn new(body: N) -> Self {
        Self {
            body,
            holders: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn acquire(&self, holder: LockHolder) {
        let was_locked = {
            let mut holders = self.holders.borrow_mut();
            let was_locked = !holders.is_empty();
            holders.insert(holder);
            was_locked
        };

        if !was_locked {
            self.body.set_style("overflow", "hidden");
        }
    }

    pub fn release(&self, holder: LockHolder) {
        let now_unlocked = {
            let mut holders = self.holders.borrow_mut();
            holders.remove(&holder) && holders.is_empty()
        };

        if now_unlocked {
            self.body.set_style("overflow", "");
        }
    }

    pub fn is_locked(&self) -> bool {
        !self.holders.borrow().is_empty()
    }

    pub fn is_held_by(&self, holder: LockHolder) -> bool {
        self.holders.borrow().contains(&holder)
    }
}


#[cfg(test)]
mod tests {
    use super::{fake::FakeNode, *};

    #[test]
    fn lock_follows_holder_set() {
        let body = FakeNode::new();
        let lock = ScrollLock::new(body.clone());

        lock.acquire(LockHolder::Menu);
        assert_eq!(body.style("overflow").as_deref(), Some("hidden"));

        lock.acquire(LockHolder::Modal(ModalKind::Pdf));
        lock.release(LockHolder::Menu);
        assert!(lock.is_locked());
        assert_eq!(body.style("overflow").as_deref(), Some("hidden"));

        lock.release(LockHolder::Modal(ModalKind::Pdf));
        assert!(!lock.is_locked());
        assert_eq!(body.style("overflow").as_deref(), Some(""));
    }

    #[test]
    fn repeated_acquire_and_stray_release_do_not_write() {
        let body = FakeNode::new();
        let lock = ScrollLock::new(body.clone());

        lock.release(LockHolder::Menu);
        assert!(body.style_writes().is_empty());

        lock.acquire(LockHolder::Menu);
        lock.acquire(LockHolder::Menu);
        assert_eq!(body.style_writes().len(), 1);
        assert!(lock.is_held_by(LockHolder::Menu));

        lock.release(LockHolder::Modal(ModalKind::Certificate));
        assert!(lock.is_locked());
        assert_eq!(body.style_writes().len(), 1);
    }
}
