use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animation::value::AnimationValue;

/// Identifies an animation channel on an animatable object.
///
/// Channel numbering is owned by the animated type (see the constants on
/// `scene::Node` for the spatial channels); ids outside the owner's known
/// set are rejected at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

/// A time-driven value producer bound to a channel.
///
/// Implementations are stepped once per logic cycle; `advance` returns
/// `None` while paused and forever once finished.
pub trait Animation: Send + Sync {
    /// Samples the animation and steps its internal clock by one cycle.
    fn advance(&mut self) -> Option<AnimationValue>;

    /// Returns false if the animation can no longer play (finished).
    fn play(&mut self) -> bool;

    fn pause(&mut self) -> bool;

    fn is_playing(&self) -> bool;

    fn is_finished(&self) -> bool;
}

/// Values produced by one round of advancing a library.
pub type ProducedValues = SmallVec<[(ChannelId, AnimationValue); 4]>;

/// Per-object mapping of channel id to running animation.
///
/// Adding an animation on an occupied channel replaces the previous one.
/// Finished animations are dropped during [`AnimationLibrary::advance_all`].
#[derive(Default)]
pub struct AnimationLibrary {
    channels: FxHashMap<ChannelId, Box<dyn Animation>>,
}

impl AnimationLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: ChannelId, animation: Box<dyn Animation>) {
        self.channels.insert(channel, animation);
    }

    pub fn remove(&mut self, channel: ChannelId) -> bool {
        self.channels.remove(&channel).is_some()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn contains(&self, channel: ChannelId) -> bool {
        self.channels.contains_key(&channel)
    }

    pub fn animation_mut(&mut self, channel: ChannelId) -> Option<&mut (dyn Animation + 'static)> {
        self.channels.get_mut(&channel).map(move |boxed| &mut **boxed)
    }

    /// Advances every animation one cycle, collecting the produced values
    /// and retiring the ones that finished.
    pub fn advance_all(&mut self) -> ProducedValues {
        let mut produced = ProducedValues::new();

        for (channel, animation) in &mut self.channels {
            if let Some(value) = animation.advance() {
                produced.push((*channel, value));
            }
        }

        self.channels.retain(|_, animation| !animation.is_finished());

        produced
    }
}

impl std::fmt::Debug for AnimationLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationLibrary")
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Mixin contract for anything that owns animation channels.
///
/// The provided `update_animations` pulls one value per playing channel and
/// dispatches through [`Animatable::play_animation`]; a rejected dispatch
/// drops that value only and other channels keep playing.
pub trait Animatable {
    fn animations(&self) -> &AnimationLibrary;

    fn animations_mut(&mut self) -> &mut AnimationLibrary;

    /// Applies one produced value; returns false for unknown channels or
    /// value types the channel cannot accept.
    fn play_animation(&mut self, channel: ChannelId, value: &AnimationValue) -> bool;

    fn update_animations(&mut self, cycle: u64) {
        let produced = self.animations_mut().advance_all();

        for (channel, value) in produced {
            if !self.play_animation(channel, &value) {
                log::warn!(
                    "Dropping animation value for unhandled channel {} at cycle {cycle}",
                    channel.0
                );
            }
        }
    }
}
