/// Surface for transient, user-visible messages raised by the request pipeline
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);

    fn success(&self, _message: &str) {}
}

/// Default notifier: routes messages into the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(target: "ebbing::notify", "{}", message);
    }

    fn success(&self, message: &str) {
        tracing::info!(target: "ebbing::notify", "{}", message);
    }
}

/// Notifier that swallows everything, for callers that render errors themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn error(&self, _message: &str) {}
}
