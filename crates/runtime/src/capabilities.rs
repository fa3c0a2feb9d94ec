//! Optional integrations, negotiated once at startup.
//!
//! Each [`IntegrationProbe`] reports whether the host provides an integration.
//! [`Capabilities::negotiate`] runs them during runtime assembly and the
//! resulting set is immutable afterwards.

use bitflags::bitflags;
use zone_core::IntegrationSettings;

bitflags! {
    /// Integrations available to this runtime instance.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Text expansion (placeholders) for presentation messages.
        const TEXT_EXPANSION = 1 << 0;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::empty()
    }
}

/// Detects one optional integration on the host.
pub trait IntegrationProbe: Send + Sync {
    fn name(&self) -> &str;

    /// Capability this probe can grant.
    fn capability(&self) -> Capabilities;

    fn is_available(&self) -> bool;
}

impl Capabilities {
    /// Capabilities the settings ask for.
    pub fn requested(settings: &IntegrationSettings) -> Self {
        let mut requested = Capabilities::empty();
        requested.set(Capabilities::TEXT_EXPANSION, settings.text_expansion);
        requested
    }

    /// Runs every probe whose capability was requested and keeps the ones
    /// that report available.
    pub fn negotiate(settings: &IntegrationSettings, probes: &[Box<dyn IntegrationProbe>]) -> Self {
        let requested = Self::requested(settings);
        let mut granted = Capabilities::empty();

        for probe in probes {
            let capability = probe.capability() & requested;
            if capability.is_empty() {
                continue;
            }
            if probe.is_available() {
                tracing::info!(target: "runtime::capabilities", probe = probe.name(), "Integration enabled");
                granted |= capability;
            } else {
                tracing::info!(target: "runtime::capabilities", probe = probe.name(), "Integration not present");
            }
        }

        granted
    }

    pub fn text_expansion(&self) -> bool {
        self.contains(Capabilities::TEXT_EXPANSION)
    }
}

/// Probe with a fixed answer. Useful for hosts that know their integrations
/// up front.
pub struct StaticProbe {
    name: String,
    capability: Capabilities,
    available: bool,
}

impl StaticProbe {
    pub fn new(name: impl Into<String>, capability: Capabilities, available: bool) -> Self {
        Self {
            name: name.into(),
            capability,
            available,
        }
    }
}

impl IntegrationProbe for StaticProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capabilities {
        self.capability
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProbe(Arc<AtomicUsize>);

    impl IntegrationProbe for CountingProbe {
        fn name(&self) -> &str {
            "counting"
        }

        fn capability(&self) -> Capabilities {
            Capabilities::TEXT_EXPANSION
        }

        fn is_available(&self) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn grants_requested_and_available_only() {
        let enabled = IntegrationSettings { text_expansion: true };
        let probes: Vec<Box<dyn IntegrationProbe>> = vec![Box::new(StaticProbe::new(
            "placeholders",
            Capabilities::TEXT_EXPANSION,
            true,
        ))];

        assert!(Capabilities::negotiate(&enabled, &probes).text_expansion());
        assert!(Capabilities::negotiate(&IntegrationSettings::default(), &probes).is_empty());

        let absent: Vec<Box<dyn IntegrationProbe>> = vec![Box::new(StaticProbe::new(
            "placeholders",
            Capabilities::TEXT_EXPANSION,
            false,
        ))];
        assert!(Capabilities::negotiate(&enabled, &absent).is_empty());
    }

    #[test]
    fn unrequested_probes_are_never_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probes: Vec<Box<dyn IntegrationProbe>> = vec![Box::new(CountingProbe(Arc::clone(&calls)))];

        Capabilities::negotiate(&IntegrationSettings::default(), &probes);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        Capabilities::negotiate(&IntegrationSettings { text_expansion: true }, &probes);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
