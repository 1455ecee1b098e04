use std::cell::RefCell;
use std::rc::Rc;

use apg_gui::refresh::{DeferredTask, Scheduler};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Runs deferred work on the next macrotask via `setTimeout(.., 0)`.
pub struct TimeoutScheduler {
    window: Window,
}

impl TimeoutScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for TimeoutScheduler {
    fn defer(&self, task: DeferredTask) {
        let slot = Rc::new(RefCell::new(Some(task)));
        let cb = Closure::once_into_js({
            let slot = slot.clone();
            move || {
                if let Some(task) = slot.borrow_mut().take() {
                    task();
                }
            }
        });
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), 0)
        {
            warn!("setTimeout failed, running task inline: {e:?}");
            let task = slot.borrow_mut().take();
            if let Some(task) = task {
                task();
            }
        }
    }
}
