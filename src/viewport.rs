//! Viewport geometry tracking
//!
//! The presentation shell reports scroll and resize signals over a bounded
//! channel; a consumer task folds them into the context store. Geometry is
//! a silent concern: no action trail entries, no subscriber notifications,
//! no persistence.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::context::ContextHandle;

/// Channel capacity for viewport signals
const SIGNAL_CAPACITY: usize = 256;

/// Raw geometry signal from the presentation shell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportSignal {
    /// Scroll offsets changed
    Scroll { x: f64, y: f64 },
    /// Window dimensions changed
    Resize { width: f64, height: f64 },
}

/// Non-blocking sender half handed to signal producers
///
/// Reporting never awaits; a full channel drops the signal and the next
/// one carries fresh geometry.
#[derive(Clone)]
pub struct ViewportSignals {
    tx: mpsc::Sender<ViewportSignal>,
}

impl ViewportSignals {
    /// Report a signal without blocking
    pub fn report(&self, signal: ViewportSignal) {
        if let Err(e) = self.tx.try_send(signal) {
            tracing::warn!(error = %e, "viewport signal dropped");
        }
    }
}

/// Spawn the consumer task that applies signals to the store
///
/// The task runs until every [`ViewportSignals`] clone is dropped, which
/// in practice means the process lifetime.
pub fn spawn_tracker(handle: ContextHandle) -> (ViewportSignals, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(SIGNAL_CAPACITY);

    let task = tokio::spawn(async move {
        while let Some(signal) = rx.recv().await {
            match signal {
                ViewportSignal::Scroll { x, y } => handle.scroll_to(x, y).await,
                ViewportSignal::Resize { width, height } => handle.resize_to(width, height).await,
            }
        }
        tracing::debug!("viewport signal channel closed");
    });

    (ViewportSignals { tx }, task)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::context::{UiContext, ViewportInfo};

    fn handle() -> ContextHandle {
        ContextHandle::ephemeral(UiContext::initial(
            "dashboard",
            "default",
            ViewportInfo::with_dimensions(1920.0, 1080.0),
        ))
    }

    #[tokio::test]
    async fn scroll_signal_moves_offsets_only() {
        let handle = handle();
        let (signals, _task) = spawn_tracker(handle.clone());

        signals.report(ViewportSignal::Scroll { x: 10.0, y: 500.0 });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let viewport = handle.snapshot().await.viewport;
        assert_eq!(viewport.scroll_x, 10.0);
        assert_eq!(viewport.scroll_y, 500.0);
        assert_eq!(viewport.visible_area.top, 0.0);
        assert_eq!(viewport.visible_area.bottom, 1080.0);
    }

    #[tokio::test]
    async fn resize_signal_recomputes_rect_from_scroll() {
        let handle = handle();
        let (signals, _task) = spawn_tracker(handle.clone());

        signals.report(ViewportSignal::Scroll { x: 0.0, y: 300.0 });
        signals.report(ViewportSignal::Resize {
            width: 1280.0,
            height: 720.0,
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let viewport = handle.snapshot().await.viewport;
        assert_eq!(viewport.width, 1280.0);
        assert_eq!(viewport.visible_area.top, 300.0);
        assert_eq!(viewport.visible_area.bottom, 1020.0);
        assert_eq!(viewport.visible_area.right, 1280.0);
    }

    #[tokio::test]
    async fn signals_do_not_touch_the_action_trail() {
        let handle = handle();
        let (signals, _task) = spawn_tracker(handle.clone());

        signals.report(ViewportSignal::Scroll { x: 0.0, y: 100.0 });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(handle.snapshot().await.recent_actions.is_empty());
    }
}
