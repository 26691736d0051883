//! Progress bar for long analysis runs.
//!
//! Reading thousands of simulation directories can take a while, so the analyze manager shows a
//! progress bar counting simulations read. Only one progress bar can be active at a time; setting
//! a second one replaces the first.
//!
//! ```ignore
//! init_custom_progress_bar("Simulations", simulations.len());
//! for sim in &simulations {
//!     // ... read the simulation's reports ...
//!     increment_custom_progress();
//! }
//! finalize_custom_progress();
//! ```
//!
//! Without the `progress_bar` feature these functions do nothing.

use crate::log::trace;
#[cfg(feature = "progress_bar")]
use progress_bar::{
    finalize_progress_bar, inc_progress_bar, init_progress_bar, set_progress_bar_action,
    set_progress_bar_progress, Color, Style,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether a progress bar has been initialized and not yet finalized.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Initializes a custom progress bar with the given label and max value.
pub fn init_custom_progress_bar(label: &str, max_value: usize) {
    trace!(
        "initializing progress bar with label {} and max value {}",
        label,
        max_value
    );
    ACTIVE.store(true, Ordering::SeqCst);
    #[cfg(feature = "progress_bar")]
    {
        init_progress_bar(max_value);
        set_progress_bar_action(label, Color::Blue, Style::Bold);
    }
}

/// Updates the current value of the custom progress bar.
pub fn update_custom_progress(current_value: usize) {
    if !ACTIVE.load(Ordering::SeqCst) {
        return;
    }
    #[cfg(feature = "progress_bar")]
    set_progress_bar_progress(current_value);
    #[cfg(not(feature = "progress_bar"))]
    let _ = current_value;
}

/// Increments the custom progress bar by 1.
pub fn increment_custom_progress() {
    if !ACTIVE.load(Ordering::SeqCst) {
        return;
    }
    #[cfg(feature = "progress_bar")]
    inc_progress_bar();
}

/// Finishes the active progress bar, if any.
pub fn finalize_custom_progress() {
    if ACTIVE.swap(false, Ordering::SeqCst) {
        #[cfg(feature = "progress_bar")]
        finalize_progress_bar();
    }
}

/// Whether a progress bar is currently being drawn.
pub fn is_active() -> bool {
    ACTIVE.load(Ordering::SeqCst)
}
