mod scene;
mod state;
mod viewport;

/// Length of every tree and viewport transition, in seconds.
pub const TRANSITION_SECS: f64 = 0.75;

pub use scene::{Phase, ReconcileReport, Scene};
pub use state::{NodeId, NodePath, RenderNode, RenderState};
pub use viewport::{Viewport, ViewportTransform};
