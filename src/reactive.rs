//! State-to-element propagation.
//!
//! A [`ReactiveBinding`] links a control to a property of a shared state value
//! by dot path (`"body.position.x"`). Each [`update_reactive_controls`] pass
//! snapshots the state, walks the path and writes the terminal scalar into the
//! bound element. The engine only ever writes elements; handlers that want
//! element-to-state flow update the state themselves.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, trace};

use crate::control::Control;
use crate::error::{GuiError, Result};
use crate::fmt::fmt_number;
use crate::host::Host;
use crate::registry::ControlRegistry;

/// Anything that can present itself as a JSON-like record.
pub trait StateSource {
    fn snapshot(&self) -> Result<Value>;
}

impl<T: Serialize> StateSource for RefCell<T> {
    fn snapshot(&self) -> Result<Value> {
        Ok(serde_json::to_value(&*self.borrow())?)
    }
}

#[derive(Clone)]
pub struct ReactiveBinding {
    state: Rc<dyn StateSource>,
    prop: String,
}

impl ReactiveBinding {
    pub(crate) fn new(state: Rc<dyn StateSource>, prop: &str) -> Result<Self> {
        validate_path(prop)?;
        Ok(Self {
            state,
            prop: prop.to_string(),
        })
    }

    pub fn prop(&self) -> &str {
        &self.prop
    }

    pub fn resolve(&self) -> Result<Resolved> {
        let snapshot = self.state.snapshot()?;
        resolve_path(&snapshot, &self.prop)
    }
}

/// Terminal value of a reactive path.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Scalar {
    /// Text as a browser would stringify the value.
    pub fn display(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => fmt_number(*n),
            Scalar::Bool(b) => b.to_string(),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
            Scalar::Bool(b) => *b,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub scalar: Scalar,
    /// Number of property lookups performed; equals the path depth.
    pub lookups: usize,
}

fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GuiError::EmptyPath);
    }
    if let Some(seg) = path.split('.').find(|s| s.trim().is_empty()) {
        return Err(GuiError::PathSegmentMissing {
            path: path.to_string(),
            segment: seg.to_string(),
        });
    }
    Ok(())
}

fn lookup<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Walk `path` through `root`. Every non-terminal segment must land on a
/// record (or an array indexed numerically); the terminal one on a scalar.
pub fn resolve_path(root: &Value, path: &str) -> Result<Resolved> {
    validate_path(path)?;

    let segments: Vec<&str> = path.split('.').collect();
    let last = segments.len() - 1;
    let mut current = root;
    let mut lookups = 0;

    for (i, segment) in segments.iter().enumerate() {
        if !matches!(current, Value::Object(_) | Value::Array(_)) {
            // Only reachable for i > 0: the previous segment was a scalar.
            return Err(GuiError::PathNotComposite {
                path: path.to_string(),
                segment: segments[i.saturating_sub(1)].to_string(),
            });
        }
        current = lookup(current, segment).ok_or_else(|| GuiError::PathSegmentMissing {
            path: path.to_string(),
            segment: segment.to_string(),
        })?;
        lookups += 1;

        if i < last && !matches!(current, Value::Object(_) | Value::Array(_)) {
            return Err(GuiError::PathNotComposite {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
    }

    let scalar = match current {
        Value::String(s) => Scalar::Text(s.clone()),
        Value::Number(n) => Scalar::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Null | Value::Object(_) | Value::Array(_) => {
            return Err(GuiError::PathNotScalar {
                path: path.to_string(),
            })
        }
    };
    Ok(Resolved { scalar, lookups })
}

fn write_scalar<H: Host>(
    host: &mut H,
    element: &H::Element,
    control: &Control<H::Element>,
    scalar: &Scalar,
) -> Result<()> {
    match control {
        Control::Range { .. } | Control::Color { .. } | Control::Select { .. } => {
            host.set_value(element, &scalar.display())
        }
        Control::CheckBox { .. } => host.set_checked(element, scalar.truthy()),
        Control::Details { .. } | Control::Dialog => host.set_open(element, scalar.truthy()),
        Control::Paragraph | Control::Output | Control::Div { .. } | Control::Button { .. } => {
            host.set_text(element, &scalar.display())
        }
    }
}

/// One reactive pass over every bound descriptor carrying a binding.
/// Returns the number of elements written.
pub fn update_reactive_controls<H: Host>(
    registry: &ControlRegistry<H::Element>,
    host: &mut H,
) -> Result<usize> {
    let mut written = 0;
    for (id, desc) in registry.iter() {
        let (Some(binding), Some(element)) = (desc.reactive.as_ref(), desc.element.as_ref()) else {
            continue;
        };
        let resolved = binding.resolve().inspect_err(|e| {
            error!(control = id, prop = binding.prop(), "reactive update failed: {e}");
        })?;
        trace!(control = id, prop = binding.prop(), "reactive write");
        write_scalar(host, element, &desc.control, &resolved.scalar)?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_paths_with_one_lookup_per_segment() {
        let state = json!({"body": {"pos": {"x": 1.5}}, "name": "ball", "on": true});
        let r = resolve_path(&state, "body.pos.x").unwrap();
        assert_eq!(r.scalar, Scalar::Number(1.5));
        assert_eq!(r.lookups, 3);

        let r = resolve_path(&state, "name").unwrap();
        assert_eq!(r.scalar, Scalar::Text("ball".into()));
        assert_eq!(r.lookups, 1);
    }

    #[test]
    fn numeric_segments_index_arrays() {
        let state = json!({"bodies": [{"m": 2}, {"m": 3}]});
        let r = resolve_path(&state, "bodies.1.m").unwrap();
        assert_eq!(r.scalar.display(), "3");
    }

    #[test]
    fn scalar_in_the_middle_is_fatal() {
        let state = json!({"x": 8});
        let err = resolve_path(&state, "x.y").unwrap_err();
        assert!(
            matches!(err, GuiError::PathNotComposite { ref segment, .. } if segment == "x"),
            "{err}"
        );
    }

    #[test]
    fn record_at_the_end_is_fatal() {
        let state = json!({"body": {"pos": {}}, "gone": null});
        assert!(matches!(
            resolve_path(&state, "body.pos"),
            Err(GuiError::PathNotScalar { .. })
        ));
        assert!(matches!(
            resolve_path(&state, "gone"),
            Err(GuiError::PathNotScalar { .. })
        ));
    }

    #[test]
    fn missing_and_malformed_segments_are_fatal() {
        let state = json!({"a": {"b": 1}});
        assert!(matches!(
            resolve_path(&state, "a.c"),
            Err(GuiError::PathSegmentMissing { .. })
        ));
        assert!(matches!(resolve_path(&state, ""), Err(GuiError::EmptyPath)));
        assert!(matches!(
            resolve_path(&state, "a..b"),
            Err(GuiError::PathSegmentMissing { .. })
        ));
    }

    #[test]
    fn scalar_display_and_truthiness() {
        assert_eq!(Scalar::Number(8.0).display(), "8");
        assert_eq!(Scalar::Bool(false).display(), "false");
        assert!(!Scalar::Number(0.0).truthy());
        assert!(Scalar::Text("x".into()).truthy());
        assert!(!Scalar::Text(String::new()).truthy());
    }

    #[test]
    fn serializable_state_snapshots_through_refcell() {
        #[derive(Serialize)]
        struct Sim {
            gravity: Gravity,
        }
        #[derive(Serialize)]
        struct Gravity {
            y: f64,
        }
        let state = Rc::new(RefCell::new(Sim {
            gravity: Gravity { y: -9.81 },
        }));
        let binding = ReactiveBinding::new(state.clone(), "gravity.y").unwrap();
        assert_eq!(binding.resolve().unwrap().scalar.display(), "-9.81");

        state.borrow_mut().gravity.y = -1.0;
        assert_eq!(binding.resolve().unwrap().scalar.display(), "-1");
    }
}
