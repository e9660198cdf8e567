pub use puffin;

/// Turns scope collection on or off for every thread.
pub fn set_enabled(enabled: bool) {
    puffin::set_scopes_on(enabled);
}

pub fn is_enabled() -> bool {
    puffin::are_scopes_on()
}

/// Closes the current profiling frame. Called once per integration batch.
pub fn finish_batch() {
    if puffin::are_scopes_on() {
        puffin::GlobalProfiler::lock().new_frame();
    }
}

#[macro_export]
macro_rules! profile_function {
    () => {
        $crate::puffin::profile_function!();
    };
    ($data:expr) => {
        $crate::puffin::profile_function!($data);
    };
}

#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        $crate::puffin::profile_scope!($name);
    };
    ($name:expr, $data:expr) => {
        $crate::puffin::profile_scope!($name, $data);
    };
}
