//! Bind phase: attach live elements and listeners after the markup is mounted.

use tracing::{debug, warn};

use crate::control::Control;
use crate::error::{GuiError, Result};
use crate::host::{EventValue, Host, Listener};
use crate::registry::ControlRegistry;

/// Adapt a typed handler to the host's untyped listener.
fn listener_for<E>(id: &str, control: &mut Control<E>) -> Option<Listener> {
    let id = id.to_string();
    match control {
        Control::Paragraph | Control::Output | Control::Div { .. } | Control::Dialog => None,
        Control::Button { on_click } => {
            let mut f = on_click.take()?;
            Some(Box::new(move |_: EventValue| f()))
        }
        Control::Range { on_input } => {
            let mut f = on_input.take()?;
            Some(Box::new(move |ev: EventValue| match ev {
                EventValue::Text(raw) => match raw.trim().parse::<f64>() {
                    Ok(v) => f(v),
                    Err(_) => warn!(control = %id, raw = %raw, "range value is not a number"),
                },
                other => warn!(control = %id, ?other, "range event without a value"),
            }))
        }
        Control::CheckBox { on_change } => {
            let mut f = on_change.take()?;
            Some(Box::new(move |ev: EventValue| match ev {
                EventValue::Flag(b) => f(b),
                other => warn!(control = %id, ?other, "checkbox event without a flag"),
            }))
        }
        Control::Color { on_input: on } | Control::Select { on_change: on } => {
            let mut f = on.take()?;
            Some(Box::new(move |ev: EventValue| match ev {
                EventValue::Text(s) => f(s),
                other => warn!(control = %id, ?other, "event without a value"),
            }))
        }
        Control::Details { on_toggle } => {
            let mut f = on_toggle.take()?;
            Some(Box::new(move |ev: EventValue| match ev {
                EventValue::Flag(open) => f(open),
                other => warn!(control = %id, ?other, "toggle event without a flag"),
            }))
        }
    }
}

/// Look up every registered id in the mounted document, store the element,
/// mount injected children and attach one listener per callback.
///
/// Handlers move into the host's listeners, so a second call without a
/// registry rebuild attaches nothing new. Returns the number of listeners.
pub fn bind<H: Host>(registry: &mut ControlRegistry<H::Element>, host: &mut H) -> Result<usize> {
    let ids: Vec<String> = registry.ids().map(str::to_string).collect();
    let mut listeners = 0;

    for id in &ids {
        let element = host
            .element_by_id(id)
            .ok_or_else(|| GuiError::ElementNotFound(id.clone()))?;
        let Some(desc) = registry.get_mut(id) else {
            continue;
        };
        desc.element = Some(element.clone());

        if let Control::Div { injected } = &desc.control {
            if let Some(child) = injected {
                host.append_child(&element, child)?;
            }
        }

        if let Some((trigger, reading)) = desc.control.trigger() {
            if let Some(listener) = listener_for(id, &mut desc.control) {
                host.listen(&element, trigger, reading, listener)?;
                listeners += 1;
            }
        }
    }

    debug!(controls = ids.len(), listeners, "panel bound");
    Ok(listeners)
}
