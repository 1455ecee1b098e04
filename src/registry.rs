//! Control registry and markup builders.
//!
//! Each `build_*_control` call checks the id is free, records a descriptor
//! with no element yet and returns a fragment whose primary element carries
//! the id. Composite builders take `&self`: they wrap fragments and never
//! register anything. No DOM access happens here.

use std::rc::Rc;

use hashbrown::HashMap;
use tracing::{debug, error};

use crate::control::{Control, ControlDescriptor};
use crate::error::{GuiError, Result};
use crate::markup::{attr, class, escape, join, num_attr, row, wrap};
use crate::reactive::{ReactiveBinding, StateSource};

/// Bounds and initial value of a range slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl RangeSpec {
    pub fn new(value: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            value,
            min,
            max,
            step,
        }
    }
}

pub struct ControlRegistry<E> {
    controls: HashMap<String, ControlDescriptor<E>>,
    order: Vec<String>,
}

impl<E> Default for ControlRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ControlRegistry<E> {
    pub fn new() -> Self {
        Self {
            controls: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.controls.contains_key(id)
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&ControlDescriptor<E>> {
        self.controls.get(id)
    }

    /// Live element of a bound control.
    pub fn element(&self, id: &str) -> Option<&E> {
        self.controls.get(id).and_then(|d| d.element.as_ref())
    }

    pub fn clear(&mut self) {
        debug!(controls = self.order.len(), "registry cleared");
        self.controls.clear();
        self.order.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &ControlDescriptor<E>)> {
        self.order
            .iter()
            .filter_map(|id| self.controls.get(id).map(|d| (id.as_str(), d)))
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut ControlDescriptor<E>> {
        self.controls.get_mut(id)
    }

    fn register(&mut self, id: &str, control: Control<E>) -> Result<()> {
        if self.controls.contains_key(id) {
            error!(control = id, "duplicate control id");
            return Err(GuiError::DuplicateControl(id.to_string()));
        }
        self.controls
            .insert(id.to_string(), ControlDescriptor::new(control));
        self.order.push(id.to_string());
        Ok(())
    }

    /// Attach a reactive binding to an already registered control.
    pub fn add_reactivity<S>(&mut self, id: &str, state: Rc<S>, prop: &str) -> Result<()>
    where
        S: StateSource + 'static,
    {
        let binding = ReactiveBinding::new(state, prop)?;
        let desc = self
            .controls
            .get_mut(id)
            .ok_or_else(|| GuiError::UnknownControl(id.to_string()))?;
        desc.reactive = Some(binding);
        Ok(())
    }

    pub fn build_paragraph_control(&mut self, id: &str, text: &str) -> Result<String> {
        self.register(id, Control::Paragraph)?;
        Ok(format!(
            "<p{}{}>{}</p>",
            attr("id", id),
            attr("class", &class("p")),
            escape(text)
        ))
    }

    /// An `<output>` element; the usual target of a reactive binding.
    pub fn build_output_control(
        &mut self,
        id: &str,
        caption: &str,
        initial: &str,
    ) -> Result<String> {
        self.register(id, Control::Output)?;
        let control = format!("<output{}>{}</output>", attr("id", id), escape(initial));
        Ok(row("output", id, caption, &control))
    }

    /// A `<div>`; `injected` (for example a stats canvas) is appended at bind.
    pub fn build_div_control(&mut self, id: &str, injected: Option<E>) -> Result<String> {
        self.register(id, Control::Div { injected })?;
        Ok(format!(
            "<div{}{}></div>",
            attr("id", id),
            attr("class", &class("div"))
        ))
    }

    pub fn build_button_control(
        &mut self,
        id: &str,
        caption: &str,
        on_click: impl FnMut() + 'static,
    ) -> Result<String> {
        self.register(
            id,
            Control::Button {
                on_click: Some(Box::new(on_click)),
            },
        )?;
        Ok(format!(
            "<button{}{}{}>{}</button>",
            attr("id", id),
            attr("type", "button"),
            attr("class", &class("button")),
            escape(caption)
        ))
    }

    pub fn build_range_control(
        &mut self,
        id: &str,
        caption: &str,
        spec: RangeSpec,
        on_input: impl FnMut(f64) + 'static,
    ) -> Result<String> {
        self.register(
            id,
            Control::Range {
                on_input: Some(Box::new(on_input)),
            },
        )?;
        let input = format!(
            "<input{}{}{}{}{}{}>",
            attr("id", id),
            attr("type", "range"),
            num_attr("min", spec.min),
            num_attr("max", spec.max),
            num_attr("step", spec.step),
            num_attr("value", spec.value)
        );
        Ok(row("range", id, caption, &input))
    }

    pub fn build_check_box_control(
        &mut self,
        id: &str,
        caption: &str,
        checked: bool,
        on_change: impl FnMut(bool) + 'static,
    ) -> Result<String> {
        self.register(
            id,
            Control::CheckBox {
                on_change: Some(Box::new(on_change)),
            },
        )?;
        let input = format!(
            "<input{}{}{}>",
            attr("id", id),
            attr("type", "checkbox"),
            if checked { " checked" } else { "" }
        );
        Ok(row("checkbox", id, caption, &input))
    }

    /// `value` is a `#rrggbb` color.
    pub fn build_color_picker_control(
        &mut self,
        id: &str,
        caption: &str,
        value: &str,
        on_input: impl FnMut(String) + 'static,
    ) -> Result<String> {
        self.register(
            id,
            Control::Color {
                on_input: Some(Box::new(on_input)),
            },
        )?;
        let input = format!(
            "<input{}{}{}>",
            attr("id", id),
            attr("type", "color"),
            attr("value", value)
        );
        Ok(row("color", id, caption, &input))
    }

    /// `options` are `(value, label)` pairs in display order.
    pub fn build_select_control(
        &mut self,
        id: &str,
        caption: &str,
        selected: &str,
        options: &[(&str, &str)],
        on_change: impl FnMut(String) + 'static,
    ) -> Result<String> {
        self.register(
            id,
            Control::Select {
                on_change: Some(Box::new(on_change)),
            },
        )?;
        let opts: String = options
            .iter()
            .map(|(value, label)| {
                format!(
                    "<option{}{}>{}</option>",
                    attr("value", value),
                    if *value == selected { " selected" } else { "" },
                    escape(label)
                )
            })
            .collect();
        let select = format!("<select{}>{opts}</select>", attr("id", id));
        Ok(row("select", id, caption, &select))
    }

    /// Listen for `toggle` on a details element built with
    /// [`build_details_control`](Self::build_details_control).
    pub fn add_details_toggle(
        &mut self,
        id: &str,
        on_toggle: impl FnMut(bool) + 'static,
    ) -> Result<()> {
        self.register(
            id,
            Control::Details {
                on_toggle: Some(Box::new(on_toggle)),
            },
        )
    }

    /// Track a dialog built with [`build_dialog_control`](Self::build_dialog_control)
    /// so its element can be opened and closed after bind.
    pub fn add_dialog(&mut self, id: &str) -> Result<()> {
        self.register(id, Control::Dialog)
    }

    pub fn build_panel_control(&self, id: &str, controls: &[String]) -> String {
        wrap("div", id, "panel", "", controls)
    }

    pub fn build_details_control(
        &self,
        id: &str,
        title: &str,
        controls: &[String],
        open: bool,
    ) -> String {
        format!(
            "<details{}{}{}><summary>{}</summary>{}</details>",
            attr("id", id),
            attr("class", &class("details")),
            if open { " open" } else { "" },
            escape(title),
            join(controls)
        )
    }

    pub fn build_dialog_control(&self, id: &str, title: &str, controls: &[String]) -> String {
        let head = format!("<h3>{}</h3>", escape(title));
        wrap("dialog", id, "dialog", &head, controls)
    }

    pub fn build_field_set_control(&self, id: &str, legend: &str, controls: &[String]) -> String {
        let head = format!("<legend>{}</legend>", escape(legend));
        wrap("fieldset", id, "fieldset", &head, controls)
    }

    pub fn join_controls(&self, controls: &[String]) -> String {
        join(controls)
    }
}
