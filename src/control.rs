//! Control descriptors.
//!
//! One [`ControlDescriptor`] exists per registered id. The variant fixes the
//! DOM event the binder listens for and the payload type its handler gets, so
//! binding is an exhaustive match instead of a shape check.

use crate::host::{Reading, Trigger};
use crate::reactive::ReactiveBinding;

pub type ClickHandler = Box<dyn FnMut()>;
pub type ValueHandler<T> = Box<dyn FnMut(T)>;

/// Input subtype of an `<input>` control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Range,
    CheckBox,
    Color,
}

impl InputKind {
    pub fn type_attr(self) -> &'static str {
        match self {
            InputKind::Range => "range",
            InputKind::CheckBox => "checkbox",
            InputKind::Color => "color",
        }
    }
}

/// Element kind of a control, as it appears in the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Paragraph,
    Output,
    Div,
    Button,
    Input(InputKind),
    Select,
    Details,
    Dialog,
}

impl ControlKind {
    pub fn tag(self) -> &'static str {
        match self {
            ControlKind::Paragraph => "p",
            ControlKind::Output => "output",
            ControlKind::Div => "div",
            ControlKind::Button => "button",
            ControlKind::Input(_) => "input",
            ControlKind::Select => "select",
            ControlKind::Details => "details",
            ControlKind::Dialog => "dialog",
        }
    }
}

pub enum Control<E> {
    Paragraph,
    Output,
    /// `injected` is appended as a child of the div when the panel is bound.
    Div { injected: Option<E> },
    Button { on_click: Option<ClickHandler> },
    Range { on_input: Option<ValueHandler<f64>> },
    CheckBox { on_change: Option<ValueHandler<bool>> },
    Color { on_input: Option<ValueHandler<String>> },
    Select { on_change: Option<ValueHandler<String>> },
    Details { on_toggle: Option<ValueHandler<bool>> },
    Dialog,
}

impl<E> Control<E> {
    pub fn kind(&self) -> ControlKind {
        match self {
            Control::Paragraph => ControlKind::Paragraph,
            Control::Output => ControlKind::Output,
            Control::Div { .. } => ControlKind::Div,
            Control::Button { .. } => ControlKind::Button,
            Control::Range { .. } => ControlKind::Input(InputKind::Range),
            Control::CheckBox { .. } => ControlKind::Input(InputKind::CheckBox),
            Control::Color { .. } => ControlKind::Input(InputKind::Color),
            Control::Select { .. } => ControlKind::Select,
            Control::Details { .. } => ControlKind::Details,
            Control::Dialog => ControlKind::Dialog,
        }
    }

    /// Event and target property for this variant's listener, or `None` when
    /// the variant never takes a callback.
    pub fn trigger(&self) -> Option<(Trigger, Reading)> {
        match self {
            Control::Paragraph | Control::Output | Control::Div { .. } | Control::Dialog => None,
            Control::Button { .. } => Some((Trigger::Click, Reading::Nothing)),
            Control::Range { .. } => Some((Trigger::Input, Reading::Value)),
            Control::CheckBox { .. } => Some((Trigger::Change, Reading::Checked)),
            Control::Color { .. } => Some((Trigger::Input, Reading::Value)),
            Control::Select { .. } => Some((Trigger::Change, Reading::Value)),
            Control::Details { .. } => Some((Trigger::Toggle, Reading::Open)),
        }
    }

    pub fn has_callback(&self) -> bool {
        match self {
            Control::Button { on_click } => on_click.is_some(),
            Control::Range { on_input } => on_input.is_some(),
            Control::CheckBox { on_change } => on_change.is_some(),
            Control::Color { on_input } => on_input.is_some(),
            Control::Select { on_change } => on_change.is_some(),
            Control::Details { on_toggle } => on_toggle.is_some(),
            Control::Paragraph | Control::Output | Control::Div { .. } | Control::Dialog => false,
        }
    }
}

pub struct ControlDescriptor<E> {
    pub(crate) element: Option<E>,
    pub(crate) control: Control<E>,
    pub(crate) reactive: Option<ReactiveBinding>,
}

impl<E> ControlDescriptor<E> {
    pub(crate) fn new(control: Control<E>) -> Self {
        Self {
            element: None,
            control,
            reactive: None,
        }
    }

    pub fn element(&self) -> Option<&E> {
        self.element.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.element.is_some()
    }

    pub fn kind(&self) -> ControlKind {
        self.control.kind()
    }

    pub fn control(&self) -> &Control<E> {
        &self.control
    }

    pub fn reactive(&self) -> Option<&ReactiveBinding> {
        self.reactive.as_ref()
    }
}
