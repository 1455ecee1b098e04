//! In-memory host.
//!
//! A small element tree that understands the markup the builders emit, so a
//! whole build → mount → bind → react cycle runs without a browser. The
//! `*_by_user` methods mutate an element the way a user would and fire its
//! listeners, which is what the integration tests and the CLI drive.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hashbrown::HashMap;
use tracing::trace;

use crate::error::{GuiError, Result};
use crate::host::{AlertHook, EventValue, Host, Listener, Reading, Trigger};
use crate::refresh::{DeferredTask, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "meta", "link"];

#[derive(Default)]
struct Node {
    tag: String,
    id: Option<String>,
    attrs: HashMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    open: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<(Trigger, Reading, Listener)>,
}

pub struct HeadlessHost {
    nodes: Vec<Node>,
    by_id: HashMap<String, NodeId>,
    alerts: Rc<RefCell<Vec<String>>>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        let root = Node {
            tag: "body".into(),
            ..Node::default()
        };
        Self {
            nodes: vec![root],
            by_id: HashMap::new(),
            alerts: Rc::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// A detached element, e.g. a canvas to inject into a div.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    pub fn attr(&self, id: &str, name: &str) -> Option<&str> {
        let node = self.by_id.get(id)?;
        self.nodes[node.0].attrs.get(name).map(String::as_str)
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(|n| self.nodes[n.0].value.as_str())
    }

    pub fn checked(&self, id: &str) -> Option<bool> {
        self.by_id.get(id).map(|n| self.nodes[n.0].checked)
    }

    pub fn is_open(&self, id: &str) -> Option<bool> {
        self.by_id.get(id).map(|n| self.nodes[n.0].open)
    }

    /// Text content of the element and its descendants.
    pub fn text(&self, id: &str) -> Option<String> {
        let node = *self.by_id.get(id)?;
        let mut out = String::new();
        self.collect_text(node, &mut out);
        Some(out)
    }

    pub fn listener_count(&self, id: &str) -> usize {
        self.by_id
            .get(id)
            .map_or(0, |n| self.nodes[n.0].listeners.len())
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    /// Hook recording into the same list as [`Host::alert`], for callbacks
    /// that cannot reach the host.
    pub fn alert_hook(&self) -> AlertHook {
        let alerts = self.alerts.clone();
        Rc::new(move |msg: &str| alerts.borrow_mut().push(msg.to_string()))
    }

    pub fn click(&mut self, id: &str) -> Result<usize> {
        self.fire(id, Trigger::Click)
    }

    /// Move a slider or type into an input, then fire `input`.
    pub fn input_by_user(&mut self, id: &str, value: &str) -> Result<usize> {
        let node = self.lookup(id)?;
        self.nodes[node.0].value = value.to_string();
        self.fire(id, Trigger::Input)
    }

    pub fn set_checked_by_user(&mut self, id: &str, checked: bool) -> Result<usize> {
        let node = self.lookup(id)?;
        self.nodes[node.0].checked = checked;
        self.fire(id, Trigger::Change)
    }

    pub fn select_by_user(&mut self, id: &str, value: &str) -> Result<usize> {
        let node = self.lookup(id)?;
        self.nodes[node.0].value = value.to_string();
        self.fire(id, Trigger::Change)
    }

    pub fn toggle_by_user(&mut self, id: &str, open: bool) -> Result<usize> {
        let node = self.lookup(id)?;
        self.nodes[node.0].open = open;
        self.fire(id, Trigger::Toggle)
    }

    fn lookup(&self, id: &str) -> Result<NodeId> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| GuiError::ElementNotFound(id.to_string()))
    }

    /// Run every listener of `id` registered for `trigger`.
    fn fire(&mut self, id: &str, trigger: Trigger) -> Result<usize> {
        let node = self.lookup(id)?;
        let mut listeners = std::mem::take(&mut self.nodes[node.0].listeners);
        let mut fired = 0;
        for (t, reading, listener) in listeners.iter_mut() {
            if *t != trigger {
                continue;
            }
            let n = &self.nodes[node.0];
            let payload = match reading {
                Reading::Nothing => EventValue::None,
                Reading::Value => EventValue::Text(n.value.clone()),
                Reading::Checked => EventValue::Flag(n.checked),
                Reading::Open => EventValue::Flag(n.open),
            };
            listener(payload);
            fired += 1;
        }
        self.nodes[node.0].listeners = listeners;
        trace!(control = id, event = trigger.event_name(), fired, "dispatched");
        Ok(fired)
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let n = &self.nodes[node.0];
        out.push_str(&n.text);
        for child in &n.children {
            self.collect_text(*child, out);
        }
    }

    fn detach_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.detach_children(child);
            let c = &mut self.nodes[child.0];
            c.parent = None;
            c.listeners.clear();
            if let Some(id) = c.id.take() {
                self.by_id.remove(&id);
            }
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn open_tag(&mut self, parent: NodeId, tag: &str, attrs: HashMap<String, String>) -> NodeId {
        let node = self.create_element(tag);
        {
            let n = &mut self.nodes[node.0];
            n.value = attrs.get("value").cloned().unwrap_or_default();
            n.checked = attrs.contains_key("checked");
            n.open = attrs.contains_key("open");
            n.id = attrs.get("id").cloned();
            n.attrs = attrs;
        }
        if let Some(id) = self.nodes[node.0].id.clone() {
            self.by_id.insert(id, node);
        }
        self.attach(parent, node);

        // A select shows its selected option, or the first one.
        if tag == "option" && self.nodes[parent.0].tag == "select" {
            let value = self.nodes[node.0].value.clone();
            let selected = self.nodes[node.0].attrs.contains_key("selected");
            let first = self.nodes[parent.0].children.len() == 1;
            if selected || first {
                self.nodes[parent.0].value = value;
            }
        }
        node
    }

    fn parse_into(&mut self, container: NodeId, html: &str) {
        let mut stack = vec![container];
        let mut rest = html;

        while !rest.is_empty() {
            let Some(lt) = rest.find('<') else {
                self.push_text(&stack, rest);
                break;
            };
            if lt > 0 {
                self.push_text(&stack, &rest[..lt]);
            }
            rest = &rest[lt..];

            if let Some(after) = rest.strip_prefix("<!--") {
                rest = after.find("-->").map_or("", |end| &after[end + 3..]);
                continue;
            }
            let Some(gt) = find_tag_end(rest) else {
                break;
            };
            let inner = &rest[1..gt];
            rest = &rest[gt + 1..];

            if let Some(name) = inner.strip_prefix('/') {
                let name = name.trim().to_ascii_lowercase();
                if let Some(pos) = stack
                    .iter()
                    .rposition(|n| n.0 != container.0 && self.nodes[n.0].tag == name)
                {
                    stack.truncate(pos);
                }
                continue;
            }

            let self_closing = inner.ends_with('/');
            let inner = inner.trim_end_matches('/');
            let (tag, attrs) = parse_tag(inner);
            let top = *stack.last().unwrap_or(&container);
            let node = self.open_tag(top, &tag, attrs);
            if !self_closing && !VOID_TAGS.contains(&tag.as_str()) {
                stack.push(node);
            }
        }
    }

    fn push_text(&mut self, stack: &[NodeId], raw: &str) {
        if let Some(top) = stack.last() {
            self.nodes[top.0].text.push_str(&decode_entities(raw));
        }
    }
}

/// Index of the `>` closing the tag at the start of `s`, skipping quoted values.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '"') | (None, '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_tag(inner: &str) -> (String, HashMap<String, String>) {
    let inner = inner.trim();
    let name_end = inner
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(inner.len());
    let tag = inner[..name_end].to_ascii_lowercase();
    let mut attrs = HashMap::new();
    let mut rest = inner[name_end..].trim_start();

    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_ascii_lowercase();
        rest = rest[key_end..].trim_start();

        let mut value = String::new();
        if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            let (v, tail) = match after.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after[1..];
                    let end = body.find(q).unwrap_or(body.len());
                    (&body[..end], body.get(end + 1..).unwrap_or(""))
                }
                _ => {
                    let end = after
                        .find(|c: char| c.is_ascii_whitespace())
                        .unwrap_or(after.len());
                    (&after[..end], &after[end..])
                }
            };
            value = decode_entities(v);
            rest = tail.trim_start();
        }
        if !key.is_empty() {
            attrs.insert(key, value);
        }
    }
    (tag, attrs)
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

impl Host for HeadlessHost {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
        self.attach(*parent, *child);
        Ok(())
    }

    fn listen(
        &mut self,
        element: &NodeId,
        trigger: Trigger,
        reading: Reading,
        listener: Listener,
    ) -> Result<()> {
        self.nodes[element.0]
            .listeners
            .push((trigger, reading, listener));
        Ok(())
    }

    fn set_value(&mut self, element: &NodeId, value: &str) -> Result<()> {
        self.nodes[element.0].value = value.to_string();
        Ok(())
    }

    fn set_checked(&mut self, element: &NodeId, checked: bool) -> Result<()> {
        self.nodes[element.0].checked = checked;
        Ok(())
    }

    fn set_text(&mut self, element: &NodeId, text: &str) -> Result<()> {
        self.detach_children(*element);
        self.nodes[element.0].text = text.to_string();
        Ok(())
    }

    fn set_open(&mut self, element: &NodeId, open: bool) -> Result<()> {
        self.nodes[element.0].open = open;
        Ok(())
    }

    fn set_inner_html(&mut self, container: &NodeId, html: &str) -> Result<()> {
        self.detach_children(*container);
        self.nodes[container.0].text.clear();
        self.parse_into(*container, html);
        Ok(())
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

/// Deferred tasks wait here until [`run_pending`](Self::run_pending).
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<VecDeque<DeferredTask>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run the tasks queued so far; tasks they schedule wait for the next call.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<DeferredTask> = self.queue.borrow_mut().drain(..).collect();
        let n = batch.len();
        for task in batch {
            task();
        }
        n
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, task: DeferredTask) {
        self.queue.borrow_mut().push_back(task);
    }
}
