//! Capability enables.

use super::{Context, Frame};
use crate::enums::Capability;

impl Context {
    /// `glEnable(capability)` if it is not already enabled.
    pub fn enable(&mut self, capability: Capability) {
        self.set_enabled(capability, true);
    }

    /// `glDisable(capability)` if it is not already disabled.
    pub fn disable(&mut self, capability: Capability) {
        self.set_enabled(capability, false);
    }

    /// Enables or disables `capability`.
    pub fn set_enabled(&mut self, capability: Capability, enabled: bool) {
        if self.enabled_at(self.current(), capability) == enabled {
            return;
        }

        self.apply_enable(capability, enabled);

        let inherited = self.enabled_at(self.parent(), capability);
        let top = self.top_mut();
        if inherited == enabled {
            top.enables.remove(&capability);
        } else {
            top.enables.insert(capability, enabled);
        }
    }

    /// Effective state of `capability`.
    #[must_use]
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled_at(self.current(), capability)
    }

    fn enabled_at(&self, visible: usize, capability: Capability) -> bool {
        self.lookup(visible, |frame| frame.enables.get(&capability).copied())
            .unwrap_or_else(|| self.enable_default(capability))
    }

    /// Driver default, queried the first time it is needed.
    fn enable_default(&self, capability: Capability) -> bool {
        *self
            .enable_defaults
            .borrow_mut()
            .entry(capability)
            .or_insert_with(|| self.gl.is_enabled(capability.raw()))
    }

    fn apply_enable(&self, capability: Capability, enabled: bool) {
        tracing::trace!(?capability, enabled, "enable");

        if enabled {
            self.gl.enable(capability.raw());
        } else {
            self.gl.disable(capability.raw());
        }
    }

    pub(super) fn restore_enables(&mut self, frame: &Frame) {
        for &capability in frame.enables.keys() {
            let enabled = self.enabled_at(self.current(), capability);
            self.apply_enable(capability, enabled);
        }
    }
}
