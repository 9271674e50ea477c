//! Session lifecycle and the synchronized baseline.

/// Where a controller is in acquiring its site identity.
///
/// ```text
/// Uninitialized ──begin()──▶ AwaitingSiteId ──site_id──▶ Ready
/// ```
///
/// Nothing leaves the site until `Ready`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    AwaitingSiteId,
    Ready,
}

impl Lifecycle {
    pub fn is_ready(self) -> bool {
        self == Lifecycle::Ready
    }
}

/// The text the controller last considered synchronized.
///
/// Every local diff is computed against it, and every remote integration
/// overwrites it with the replica's display text. `version` is bumped on
/// every write so observers can tell two equal texts apart in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Baseline {
    text: String,
    version: u64,
}

impl Baseline {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set(&mut self, text: String) {
        self.text = text;
        self.version = self.version.wrapping_add(1);
    }

    pub fn matches(&self, other: &str) -> bool {
        self.text == other
    }
}
