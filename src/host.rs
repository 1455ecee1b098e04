//! What the panels need from the rendering environment.
//!
//! Builders never see a host: markup is plain text. Only the binder, the
//! reactive engine and the refresh protocol touch the mounted document, and
//! they do it through [`Host`]. The browser implementation lives in
//! `apg_gui_web`; [`crate::headless::HeadlessHost`] is the in-memory one.

use crate::error::Result;

/// DOM event a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Click,
    Input,
    Change,
    Toggle,
}

impl Trigger {
    pub fn event_name(self) -> &'static str {
        match self {
            Trigger::Click => "click",
            Trigger::Input => "input",
            Trigger::Change => "change",
            Trigger::Toggle => "toggle",
        }
    }
}

/// Which property of the event target the host reads when the event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Nothing,
    /// `value` of an input or select.
    Value,
    /// `checked` of a checkbox.
    Checked,
    /// `open` of a details element.
    Open,
}

/// The value read from the event target, shaped by the requested [`Reading`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    None,
    Text(String),
    Flag(bool),
}

pub type Listener = Box<dyn FnMut(EventValue)>;

/// Blocking user-visible message sink.
pub type AlertHook = std::rc::Rc<dyn Fn(&str)>;

pub trait Host {
    type Element: Clone;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn append_child(&mut self, parent: &Self::Element, child: &Self::Element) -> Result<()>;

    fn listen(
        &mut self,
        element: &Self::Element,
        trigger: Trigger,
        reading: Reading,
        listener: Listener,
    ) -> Result<()>;

    fn set_value(&mut self, element: &Self::Element, value: &str) -> Result<()>;

    fn set_checked(&mut self, element: &Self::Element, checked: bool) -> Result<()>;

    fn set_text(&mut self, element: &Self::Element, text: &str) -> Result<()>;

    /// `open` on a details element; `show()`/`close()` on a dialog.
    fn set_open(&mut self, element: &Self::Element, open: bool) -> Result<()>;

    /// Replace the container's children with parsed `html`. Listeners attached
    /// to the replaced elements are released.
    fn set_inner_html(&mut self, container: &Self::Element, html: &str) -> Result<()>;

    fn alert(&self, message: &str);
}

/// A listener handle a host keeps alive while its element is mounted.
#[derive(Debug)]
pub struct Attachment<E, C> {
    pub element: E,
    pub trigger: Trigger,
    pub handle: C,
}

/// Listener handles owned by a host, released when their elements are
/// replaced.
#[derive(Debug)]
pub struct Attachments<E, C> {
    live: Vec<Attachment<E, C>>,
}

impl<E, C> Default for Attachments<E, C> {
    fn default() -> Self {
        Self { live: Vec::new() }
    }
}

impl<E, C> Attachments<E, C> {
    pub fn push(&mut self, element: E, trigger: Trigger, handle: C) {
        self.live.push(Attachment {
            element,
            trigger,
            handle,
        });
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Remove and return every attachment whose element satisfies `inside`.
    pub fn release(&mut self, mut inside: impl FnMut(&E) -> bool) -> Vec<Attachment<E, C>> {
        let (released, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.live)
            .into_iter()
            .partition(|a| inside(&a.element));
        self.live = kept;
        released
    }
}
