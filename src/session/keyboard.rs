//! Keyboard listener scope.
//!
//! The host owns the real listener registration. A `KeyboardScope` keeps it
//! attached for exactly as long as the scope lives.

/// Something that can register and unregister key listeners.
pub trait KeyboardHost {
    /// Start forwarding key-down/key-up signals.
    fn attach(&mut self);
    /// Stop forwarding key signals.
    fn detach(&mut self);
}

/// Attached on creation, detached on drop.
pub struct KeyboardScope<'h, H: KeyboardHost + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: KeyboardHost + ?Sized> KeyboardScope<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        host.attach();
        tracing::debug!("keyboard listeners attached");
        Self { host }
    }

    pub fn host(&self) -> &H {
        self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: KeyboardHost + ?Sized> Drop for KeyboardScope<'_, H> {
    fn drop(&mut self) {
        self.host.detach();
        tracing::debug!("keyboard listeners detached");
    }
}
