use std::rc::Rc;

use apg_gui::error::{GuiError, Result};
use apg_gui::host::{AlertHook, Attachments, EventValue, Host, Listener, Reading, Trigger};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlDetailsElement, HtmlDialogElement, HtmlInputElement,
    HtmlSelectElement, Node, Window,
};

pub(super) fn js_err(context: &str, e: JsValue) -> GuiError {
    let detail = e.as_string().unwrap_or_else(|| format!("{e:?}"));
    GuiError::host(format!("{context}: {detail}"))
}

/// [`Host`] over the live document.
pub struct DomHost {
    window: Window,
    document: Document,
    listeners: Attachments<Element, Closure<dyn FnMut(Event)>>,
}

impl DomHost {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| GuiError::host("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| GuiError::host("no document"))?;
        Ok(Self {
            window,
            document,
            listeners: Attachments::default(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// `window.alert` for callbacks that cannot reach the host.
    pub fn alert_hook(&self) -> AlertHook {
        let window = self.window.clone();
        Rc::new(move |msg: &str| {
            let _ = window.alert_with_message(msg);
        })
    }

    /// Alert `e` and hand it back for propagation.
    pub fn surface(&self, e: GuiError) -> GuiError {
        self.alert(&e.alert_text());
        e
    }

    /// Detach and drop the closures of every listener under `container`.
    fn release_listeners(&mut self, container: &Element) {
        let released = self.listeners.release(|el| {
            let node: &Node = el;
            container.contains(Some(node))
        });
        for a in released {
            let event = a.trigger.event_name();
            if let Err(e) = a
                .element
                .remove_event_listener_with_callback(event, a.handle.as_ref().unchecked_ref())
            {
                warn!("removeEventListener({event}): {e:?}");
            }
        }
    }

    /// `#id`, created as a `<div>` under `<body>` when the page has none.
    pub fn container(&self, id: &str) -> Result<Element> {
        if let Some(el) = self.document.get_element_by_id(id) {
            return Ok(el);
        }
        let el = self
            .document
            .create_element("div")
            .map_err(|e| js_err("create container", e))?;
        el.set_id(id);
        let body = self
            .document
            .body()
            .ok_or_else(|| GuiError::host("no body"))?;
        body.append_child(&el)
            .map_err(|e| js_err("mount container", e))?;
        Ok(el)
    }
}

fn read(target: &Element, reading: Reading) -> EventValue {
    match reading {
        Reading::Nothing => EventValue::None,
        Reading::Value => {
            if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
                EventValue::Text(input.value())
            } else if let Some(select) = target.dyn_ref::<HtmlSelectElement>() {
                EventValue::Text(select.value())
            } else {
                EventValue::Text(target.get_attribute("value").unwrap_or_default())
            }
        }
        Reading::Checked => EventValue::Flag(
            target
                .dyn_ref::<HtmlInputElement>()
                .is_some_and(HtmlInputElement::checked),
        ),
        Reading::Open => EventValue::Flag(
            target
                .dyn_ref::<HtmlDetailsElement>()
                .is_some_and(HtmlDetailsElement::open),
        ),
    }
}

impl Host for DomHost {
    type Element = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<()> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(|e| js_err("append_child", e))
    }

    fn listen(
        &mut self,
        element: &Element,
        trigger: Trigger,
        reading: Reading,
        mut listener: Listener,
    ) -> Result<()> {
        let target = element.clone();
        let cb = Closure::wrap(Box::new(move |_ev: Event| {
            listener(read(&target, reading));
        }) as Box<dyn FnMut(_)>);
        element
            .add_event_listener_with_callback(trigger.event_name(), cb.as_ref().unchecked_ref())
            .map_err(|e| js_err(trigger.event_name(), e))?;
        self.listeners.push(element.clone(), trigger, cb);
        Ok(())
    }

    fn set_value(&mut self, element: &Element, value: &str) -> Result<()> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else {
            element
                .set_attribute("value", value)
                .map_err(|e| js_err("set value", e))?;
        }
        Ok(())
    }

    fn set_checked(&mut self, element: &Element, checked: bool) -> Result<()> {
        let input = element
            .dyn_ref::<HtmlInputElement>()
            .ok_or_else(|| GuiError::host(format!("#{} is not an input", element.id())))?;
        input.set_checked(checked);
        Ok(())
    }

    fn set_text(&mut self, element: &Element, text: &str) -> Result<()> {
        element.set_text_content(Some(text));
        Ok(())
    }

    fn set_open(&mut self, element: &Element, open: bool) -> Result<()> {
        if let Some(details) = element.dyn_ref::<HtmlDetailsElement>() {
            details.set_open(open);
            return Ok(());
        }
        let dialog = element
            .dyn_ref::<HtmlDialogElement>()
            .ok_or_else(|| GuiError::host(format!("#{} cannot open", element.id())))?;
        match (open, dialog.open()) {
            (true, false) => dialog.show().map_err(|e| js_err("dialog.show", e)),
            (false, true) => {
                dialog.close();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn set_inner_html(&mut self, container: &Element, html: &str) -> Result<()> {
        self.release_listeners(container);
        container.set_inner_html(html);
        Ok(())
    }

    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }
}
