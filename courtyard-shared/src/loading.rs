use std::fmt;

/// Message shown in place of the loading animation when the model fails.
pub const MODEL_FAILED_MESSAGE: &str = "Failed to load courtyard model";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Sky,
    Model,
}

impl AssetKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sky => "sky",
            Self::Model => "model",
        }
    }

    /// Accepts the labels above, case-insensitively.
    pub fn parse(s: &str) -> Option<AssetKind> {
        match s.to_ascii_lowercase().as_str() {
            "sky" | "skybox" => Some(Self::Sky),
            "model" => Some(Self::Model),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Loaded,
    Failed { reason: String },
}

/// What the loading overlay should currently display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayState {
    /// Loading animation covers the viewport.
    Visible,
    Hidden,
    Message(String),
}

/// Outcome of each asset load. Loads are attach-on-arrival with no retry,
/// so the first reported outcome for an asset sticks.
#[derive(Debug, Clone)]
pub struct LoadTracker {
    sky: AssetStatus,
    model: AssetStatus,
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadTracker {
    pub fn new() -> Self {
        Self {
            sky: AssetStatus::Pending,
            model: AssetStatus::Pending,
        }
    }

    pub fn status(&self, kind: AssetKind) -> &AssetStatus {
        match kind {
            AssetKind::Sky => &self.sky,
            AssetKind::Model => &self.model,
        }
    }

    /// Returns false if the asset had already settled; the outcome is ignored.
    pub fn finish(&mut self, kind: AssetKind, outcome: Result<(), String>) -> bool {
        let slot = match kind {
            AssetKind::Sky => &mut self.sky,
            AssetKind::Model => &mut self.model,
        };
        if *slot != AssetStatus::Pending {
            return false;
        }
        *slot = match outcome {
            Ok(()) => AssetStatus::Loaded,
            Err(reason) => AssetStatus::Failed { reason },
        };
        true
    }

    pub fn is_settled(&self) -> bool {
        self.sky != AssetStatus::Pending && self.model != AssetStatus::Pending
    }

    /// The overlay masks the model load only; the sky may arrive later.
    pub fn overlay(&self) -> OverlayState {
        match &self.model {
            AssetStatus::Pending => OverlayState::Visible,
            AssetStatus::Loaded => OverlayState::Hidden,
            AssetStatus::Failed { .. } => OverlayState::Message(MODEL_FAILED_MESSAGE.into()),
        }
    }
}
