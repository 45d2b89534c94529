//! Rendering-quality settings and their propagation to live surfaces.
//!
//! A [`QualityChannel`] holds the shared alias modes for shapes and text.
//! Surfaces subscribe when they bind to a paint target and are notified
//! synchronously, in registration order, whenever the setting changes.

use crate::error::DrawError;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Anti-aliasing mode.
///
/// `Best` and `On` currently render the same. They are kept apart so a
/// persisted `Best` is not rewritten as `On`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AliasMode {
    #[default]
    Best,
    On,
    Off,
}

impl AliasMode {
    /// Whether anti-aliasing is effectively enabled.
    pub fn is_enabled(self) -> bool {
        match self {
            AliasMode::Best | AliasMode::On => true,
            AliasMode::Off => false,
        }
    }

    fn from_enabled(enabled: bool) -> Self {
        if enabled {
            AliasMode::On
        } else {
            AliasMode::Off
        }
    }
}

/// Alias modes for shapes and for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderingQuality {
    pub shape: AliasMode,
    pub text: AliasMode,
}

impl RenderingQuality {
    /// Apply a feature toggle to this snapshot.
    ///
    /// Returns `false` when the feature cannot be toggled (OpenGL).
    pub fn set_feature(&mut self, feature: Feature, enabled: bool) -> bool {
        match feature {
            Feature::OpenGl => false,
            Feature::ShapeAntiAlias => {
                self.shape = AliasMode::from_enabled(enabled);
                true
            }
            Feature::TextAntiAlias => {
                self.text = AliasMode::from_enabled(enabled);
                true
            }
        }
    }

    /// Whether a feature is effectively enabled in this snapshot.
    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::OpenGl => false,
            Feature::ShapeAntiAlias => self.shape.is_enabled(),
            Feature::TextAntiAlias => self.text.is_enabled(),
        }
    }
}

/// Toggleable rendering features and their numeric ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Feature {
    /// Recognized but never supported.
    OpenGl = 3,
    ShapeAntiAlias = 4,
    TextAntiAlias = 5,
}

impl TryFrom<u32> for Feature {
    type Error = DrawError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        match id {
            3 => Ok(Feature::OpenGl),
            4 => Ok(Feature::ShapeAntiAlias),
            5 => Ok(Feature::TextAntiAlias),
            _ => Err(DrawError::UnknownFeature(id)),
        }
    }
}

/// Receives quality changes from a [`QualityChannel`].
pub trait QualityListener {
    fn quality_changed(&self, quality: RenderingQuality);
}

struct ChannelInner {
    quality: RenderingQuality,
    next_id: u64,
    subscribers: Vec<(u64, Weak<dyn QualityListener>)>,
}

/// Shared rendering-quality setting with an ordered observer registry.
///
/// Cloning yields another handle to the same setting. The channel is meant
/// for the thread that owns the surfaces; delivery never hops threads.
#[derive(Clone)]
pub struct QualityChannel {
    inner: Rc<RefCell<ChannelInner>>,
}

impl QualityChannel {
    pub fn new(initial: RenderingQuality) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                quality: initial,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Current setting.
    pub fn quality(&self) -> RenderingQuality {
        self.inner.borrow().quality
    }

    /// Replace the whole setting and notify every subscriber.
    pub fn set_quality(&self, quality: RenderingQuality) {
        log::debug!(target: "coredraw", "set_quality {:?}", quality);
        self.inner.borrow_mut().quality = quality;
        self.notify(quality);
    }

    /// Toggle one feature for every subscribed surface.
    ///
    /// Returns `false`, and notifies nobody, when the feature cannot be
    /// toggled.
    pub fn set_feature_enabled(&self, feature: Feature, enabled: bool) -> bool {
        log::debug!(target: "coredraw", "set_feature_enabled {:?} {}", feature, enabled);
        let quality = {
            let mut inner = self.inner.borrow_mut();
            if !inner.quality.set_feature(feature, enabled) {
                return false;
            }
            inner.quality
        };
        self.notify(quality);
        true
    }

    pub fn has_feature_enabled(&self, feature: Feature) -> bool {
        self.inner.borrow().quality.has_feature(feature)
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped or the listener itself is dropped.
    pub fn subscribe(&self, listener: Weak<dyn QualityListener>) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, listener));
        Subscription {
            channel: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|(_, l)| l.strong_count() > 0)
            .count()
    }

    fn notify(&self, quality: RenderingQuality) {
        // Collect first so listeners may subscribe or unsubscribe re-entrantly.
        let listeners: Vec<Rc<dyn QualityListener>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|(_, l)| l.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|(_, l)| l.upgrade())
                .collect()
        };
        for listener in listeners {
            listener.quality_changed(quality);
        }
    }
}

impl Default for QualityChannel {
    fn default() -> Self {
        Self::new(RenderingQuality::default())
    }
}

impl fmt::Debug for QualityChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("QualityChannel")
            .field("quality", &inner.quality)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Registration handle. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    channel: Weak<RefCell<ChannelInner>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            if let Ok(mut inner) = channel.try_borrow_mut() {
                inner.subscribers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}
