//! Lifecycle notifications.
//!
//! The loader announces what it does to whoever is listening, without knowing
//! who that is. Messages go to an injected [`PatchDispatcher`]: a recorder,
//! a closure, or a channel feeding other parts of the host.
//!
//! # Example
//!
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let report = PatchSession::new(&config, surface).run(&mut scene, &mut tx.clone())?;
//!
//! while let Ok(message) = rx.try_recv() {
//!     println!("{}", message.kind());
//! }
//! ```

use std::fmt;

use tokio::sync::{broadcast, mpsc};
use tracing::trace;

use crate::scene::SceneHost;

/// Opaque identifier of the scene surface a session runs for.
///
/// Assigned by the host; the loader only passes it along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Notification emitted during a patch session.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchMessage<N, V> {
    /// Patches are about to be loaded.
    StartLoad { surface: SurfaceHandle, url: String },

    /// A node was created from an override asset.
    PostPatch {
        surface: SurfaceHandle,
        url: String,
        node: N,
    },

    /// A node is about to be removed and replaced. Last chance to read it.
    PreReplace {
        surface: SurfaceHandle,
        url: String,
        node: N,
    },

    /// An asset targets something that is not a manipulable node.
    AbortPatch {
        surface: SurfaceHandle,
        url: String,
        value: V,
        relative_path: String,
    },

    /// All patches have been processed.
    FinishLoad {
        surface: SurfaceHandle,
        url: String,
        load_count: usize,
    },
}

/// Discriminant of a [`PatchMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    StartLoad,
    PostPatch,
    PreReplace,
    AbortPatch,
    FinishLoad,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::StartLoad => "StartLoad",
            MessageKind::PostPatch => "PostPatch",
            MessageKind::PreReplace => "PreReplace",
            MessageKind::AbortPatch => "AbortPatch",
            MessageKind::FinishLoad => "FinishLoad",
        };
        f.write_str(name)
    }
}

impl<N, V> PatchMessage<N, V> {
    /// Which notification this is.
    pub fn kind(&self) -> MessageKind {
        match self {
            PatchMessage::StartLoad { .. } => MessageKind::StartLoad,
            PatchMessage::PostPatch { .. } => MessageKind::PostPatch,
            PatchMessage::PreReplace { .. } => MessageKind::PreReplace,
            PatchMessage::AbortPatch { .. } => MessageKind::AbortPatch,
            PatchMessage::FinishLoad { .. } => MessageKind::FinishLoad,
        }
    }

    /// Surface the message is about.
    pub fn surface(&self) -> SurfaceHandle {
        match self {
            PatchMessage::StartLoad { surface, .. }
            | PatchMessage::PostPatch { surface, .. }
            | PatchMessage::PreReplace { surface, .. }
            | PatchMessage::AbortPatch { surface, .. }
            | PatchMessage::FinishLoad { surface, .. } => *surface,
        }
    }

    /// URL of the surface the message is about.
    pub fn url(&self) -> &str {
        match self {
            PatchMessage::StartLoad { url, .. }
            | PatchMessage::PostPatch { url, .. }
            | PatchMessage::PreReplace { url, .. }
            | PatchMessage::AbortPatch { url, .. }
            | PatchMessage::FinishLoad { url, .. } => url,
        }
    }
}

/// Message type for a given host.
pub type HostMessage<H> = PatchMessage<<H as SceneHost>::Node, <H as SceneHost>::Value>;

/// Receives lifecycle notifications.
///
/// Dispatch is fire-and-forget: a listener that has gone away never affects
/// the session.
pub trait PatchDispatcher<N, V> {
    /// Deliver one message.
    fn dispatch(&mut self, message: PatchMessage<N, V>);
}

impl<N, V, D: PatchDispatcher<N, V> + ?Sized> PatchDispatcher<N, V> for &mut D {
    fn dispatch(&mut self, message: PatchMessage<N, V>) {
        (**self).dispatch(message);
    }
}

/// Records every message in order.
impl<N, V> PatchDispatcher<N, V> for Vec<PatchMessage<N, V>> {
    fn dispatch(&mut self, message: PatchMessage<N, V>) {
        self.push(message);
    }
}

impl<N, V> PatchDispatcher<N, V> for mpsc::UnboundedSender<PatchMessage<N, V>> {
    fn dispatch(&mut self, message: PatchMessage<N, V>) {
        if let Err(e) = self.send(message) {
            trace!(kind = %e.0.kind(), "Patch message receiver dropped");
        }
    }
}

impl<N: Clone, V: Clone> PatchDispatcher<N, V> for broadcast::Sender<PatchMessage<N, V>> {
    fn dispatch(&mut self, message: PatchMessage<N, V>) {
        if let Err(e) = self.send(message) {
            trace!(kind = %e.0.kind(), "No patch message subscribers");
        }
    }
}

/// Adapts a closure into a dispatcher.
pub struct FnDispatcher<F>(pub F);

impl<N, V, F: FnMut(PatchMessage<N, V>)> PatchDispatcher<N, V> for FnDispatcher<F> {
    fn dispatch(&mut self, message: PatchMessage<N, V>) {
        (self.0)(message);
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl<N, V> PatchDispatcher<N, V> for NullDispatcher {
    fn dispatch(&mut self, _message: PatchMessage<N, V>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    type Message = PatchMessage<u32, String>;

    fn start() -> Message {
        PatchMessage::StartLoad {
            surface: SurfaceHandle(7),
            url: "Interface/HUDMenu.swf".to_string(),
        }
    }

    #[test]
    fn test_message_accessors() {
        let message: Message = PatchMessage::FinishLoad {
            surface: SurfaceHandle(7),
            url: "Interface/HUDMenu.swf".to_string(),
            load_count: 3,
        };

        assert_eq!(message.kind(), MessageKind::FinishLoad);
        assert_eq!(message.surface(), SurfaceHandle(7));
        assert_eq!(message.url(), "Interface/HUDMenu.swf");
        assert_eq!(message.kind().to_string(), "FinishLoad");
    }

    #[test]
    fn test_vec_records_in_order() {
        let mut recorded: Vec<Message> = Vec::new();
        recorded.dispatch(start());
        recorded.dispatch(PatchMessage::PostPatch {
            surface: SurfaceHandle(7),
            url: String::new(),
            node: 1,
        });

        let kinds: Vec<_> = recorded.iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, vec![MessageKind::StartLoad, MessageKind::PostPatch]);
    }

    #[test]
    fn test_unbounded_channel_delivers() {
        let (mut tx, mut rx) = mpsc::unbounded_channel::<Message>();
        tx.dispatch(start());

        let received = rx.try_recv().expect("message should be queued");
        assert_eq!(received.kind(), MessageKind::StartLoad);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (mut tx, rx) = mpsc::unbounded_channel::<Message>();
        drop(rx);
        tx.dispatch(start());

        let (mut btx, _) = broadcast::channel::<Message>(4);
        btx.dispatch(start());
    }

    #[test]
    fn test_broadcast_reaches_subscribers() {
        let (mut tx, mut rx) = broadcast::channel::<Message>(4);
        tx.dispatch(start());

        assert_eq!(rx.try_recv().unwrap().surface(), SurfaceHandle(7));
    }

    #[test]
    fn test_fn_dispatcher_counts() {
        let mut count = 0;
        {
            let mut dispatcher = FnDispatcher(|_: Message| count += 1);
            dispatcher.dispatch(start());
            dispatcher.dispatch(start());
        }
        assert_eq!(count, 2);
    }
}
