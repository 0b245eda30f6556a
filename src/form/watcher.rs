use super::{detect_forms, DetectedForm, Page};
use log::{debug, info};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Anything that can be scanned for forms.
pub trait FormSource: Send + Sync + 'static {
    fn detect(&self) -> Vec<DetectedForm>;
}

/// A page shared between whoever mutates it and a [`FormWatcher`].
#[derive(Debug, Clone, Default)]
pub struct SharedPage {
    inner: Arc<RwLock<Page>>,
}

impl SharedPage {
    pub fn new(page: Page) -> Self {
        Self {
            inner: Arc::new(RwLock::new(page)),
        }
    }

    pub fn replace(&self, page: Page) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = page;
    }

    pub fn load_html(&self, html: &str) {
        self.replace(Page::parse(html));
    }

    /// Runs `f` with exclusive access to the page, e.g. to fill a form.
    pub fn with_page_mut<R>(&self, f: impl FnOnce(&mut Page) -> R) -> R {
        let mut page = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *page)
    }

    pub fn with_page<R>(&self, f: impl FnOnce(&Page) -> R) -> R {
        let page = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&*page)
    }
}

impl FormSource for SharedPage {
    fn detect(&self) -> Vec<DetectedForm> {
        self.with_page(detect_forms)
    }
}

/// Re-detects the forms of a [`FormSource`] on a fixed interval.
///
/// Each detection result is published as an immutable snapshot; readers call
/// [`FormWatcher::snapshot`] or follow [`FormWatcher::subscribe`]. A fill
/// working from an older snapshot is unaffected by later rescans.
///
/// Must be started from within a tokio runtime. Dropping the watcher stops
/// the background task.
pub struct FormWatcher {
    snapshot: watch::Receiver<Arc<[DetectedForm]>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FormWatcher {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3000);

    /// Detects once immediately, then again on every `interval` tick.
    pub fn start<S: FormSource>(source: S, interval: Duration) -> Self {
        let initial: Arc<[DetectedForm]> = source.detect().into();
        info!(
            "Form watcher started with {} form(s), rescanning every {:?}",
            initial.len(),
            interval
        );

        let (publisher, snapshot) = watch::channel(initial);
        let (shutdown, mut stop) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately and detection already ran.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = ticker.tick() => {
                        let forms = source.detect();
                        publisher.send_if_modified(|current| {
                            if current[..] == forms[..] {
                                return false;
                            }
                            debug!("Detected forms changed: {} form(s)", forms.len());
                            *current = forms.into();
                            true
                        });
                    }
                }
            }

            debug!("Form watcher stopped");
        });

        Self {
            snapshot,
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    /// The most recent detection result.
    pub fn snapshot(&self) -> Arc<[DetectedForm]> {
        self.snapshot.borrow().clone()
    }

    /// The snapshot entry with the given id, if any.
    pub fn find(&self, id: &str) -> Option<DetectedForm> {
        self.snapshot.borrow().iter().find(|f| f.id == id).cloned()
    }

    /// A receiver notified whenever the detected forms change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<[DetectedForm]>> {
        self.snapshot.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the rescan loop and waits for it to exit.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FormWatcher {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
