/// Diagnostic sink supplied by the host for one generation round.
pub trait GenerationListener: Send + Sync {
    fn log(&self, message: &str);
}

/// Listener that forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl GenerationListener for TracingListener {
    fn log(&self, message: &str) {
        tracing::info!(target: "gamekins::listener", "{message}");
    }
}

/// Listener that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListener;

impl GenerationListener for NullListener {
    fn log(&self, _message: &str) {}
}
