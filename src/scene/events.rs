use crate::scene::NodeKey;

/// Notifications emitted by the tree toward whatever external system is
/// subscribed (editor tooling, game logic). Purely informational; the tree
/// never waits on a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A child is about to be created under `parent`.
    SubNodeCreating { parent: NodeKey, name: String },
    /// A child was created and linked.
    SubNodeCreated { parent: NodeKey, node: NodeKey },
    /// The subtree rooted at `node` is about to be destroyed.
    SubNodeDeleting { node: NodeKey },
    /// The subtree formerly named `name` under `parent` is gone.
    SubNodeDeleted { parent: NodeKey, name: String },
    /// A node was deflected off a surface; `impact` is the speed at contact.
    NodeCollision { node: NodeKey, impact: f32 },
    /// A component reported itself broken and was unhooked from its node.
    RemoveBrokenComponent { node: NodeKey, component: String },
}

/// Fan-out event dispatch over per-subscriber channels.
///
/// Each subscriber gets its own unbounded channel; disconnected receivers
/// are pruned on the next emit. With no subscribers, emitting is free.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<flume::Sender<SceneEvent>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> flume::Receiver<SceneEvent> {
        let (sender, receiver) = flume::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn emit(&mut self, event: &SceneEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
