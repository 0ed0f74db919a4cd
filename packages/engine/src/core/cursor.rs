//! Page-level "hide the native cursor" flag.
//!
//! Several widgets can want the custom cursor at once, so the flag is a
//! reference count. The page only flips when the count crosses zero.

use std::cell::{Cell, RefCell};

type CursorHook = Box<dyn Fn(bool)>;

thread_local! {
    static LEASES: Cell<u32> = const { Cell::new(0) };
    static HOOK: RefCell<Option<CursorHook>> = RefCell::new(None);
}

/// Install the callback that applies the flag to the page (e.g. a body class).
pub fn set_cursor_hook(hook: impl Fn(bool) + 'static) {
    HOOK.with(|h| *h.borrow_mut() = Some(Box::new(hook)));
}

pub fn clear_cursor_hook() {
    HOOK.with(|h| *h.borrow_mut() = None);
}

pub fn cursor_hidden() -> bool {
    LEASES.with(|c| c.get() > 0)
}

fn notify(hidden: bool) {
    HOOK.with(|h| {
        if let Some(hook) = h.borrow().as_ref() {
            hook(hidden);
        }
    });
}

/// Holds the cursor hidden until dropped.
#[derive(Debug)]
pub struct CursorLease {
    _priv: (),
}

impl CursorLease {
    pub fn acquire() -> Self {
        let prev = LEASES.with(|c| {
            let v = c.get();
            c.set(v.saturating_add(1));
            v
        });
        if prev == 0 {
            notify(true);
        }
        Self { _priv: () }
    }
}

impl Drop for CursorLease {
    fn drop(&mut self) {
        let now = LEASES.with(|c| {
            let v = c.get().saturating_sub(1);
            c.set(v);
            v
        });
        if now == 0 {
            notify(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn page_flag_flips_only_at_zero_crossings() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        set_cursor_hook(move |hidden| sink.borrow_mut().push(hidden));

        let a = CursorLease::acquire();
        let b = CursorLease::acquire();
        assert!(cursor_hidden());
        drop(a);
        assert!(cursor_hidden());
        drop(b);
        assert!(!cursor_hidden());

        assert_eq!(*calls.borrow(), vec![true, false]);
        clear_cursor_hook();
    }
}
