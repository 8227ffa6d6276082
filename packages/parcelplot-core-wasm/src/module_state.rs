use lazy_static::lazy_static;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;

// Module state holding per-session diagnostics. Geometry and figures are
// never stored here; every upload is processed and discarded independently.
pub struct ModuleState {
    // Number of uploads run through the pipeline, failed ones included
    pub uploads_processed: usize,

    // Total figures handed to the display surface
    pub figures_rendered: usize,

    // Message of the most recent upload that ended in an error
    pub last_upload_error: Option<String>,
}

// Create a global static instance of the module state
lazy_static! {
    static ref MODULE_STATE: ReentrantMutex<RefCell<ModuleState>> =
        ReentrantMutex::new(RefCell::new(ModuleState::new()));
}

impl ModuleState {
    pub fn new() -> Self {
        ModuleState {
            uploads_processed: 0,
            figures_rendered: 0,
            last_upload_error: None,
        }
    }

    pub fn with_mut<F, R>(f: F) -> R
    where
        F: FnOnce(&mut ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        let mut borrow = guard.borrow_mut();
        f(&mut borrow)
    }

    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        let borrow = guard.borrow();
        f(&borrow)
    }

    // Record the result of one upload
    pub fn record_upload(&mut self, figures_rendered: usize, error: Option<&str>) {
        self.uploads_processed += 1;
        self.figures_rendered += figures_rendered;
        self.last_upload_error = error.map(|e| e.to_string());
    }

    pub fn reset(&mut self) {
        self.uploads_processed = 0;
        self.figures_rendered = 0;
        self.last_upload_error = None;
    }
}
