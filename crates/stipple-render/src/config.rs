use serde::{Deserialize, Serialize};

/// Which spherical-harmonic bands the vertex stage evaluates.
///
/// `DcOnly` uses just the base color; the higher modes add view-dependent
/// bands on top. Each step costs vertex-stage ALU on every visible splat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShMode {
    DcOnly,
    L1,
    L2,
    L3,
}

impl ShMode {
    pub fn degree(self) -> u32 {
        match self {
            Self::DcOnly => 0,
            Self::L1 => 1,
            Self::L2 => 2,
            Self::L3 => 3,
        }
    }
}

/// Renderer flavor. The full-quality float record layout is implemented here;
/// the texture-packed mobile layout is a separate backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendVariant {
    Full,
    Mobile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Splats with view-space depth below this are culled.
    pub near_plane: f32,
    /// Splats beyond this are culled.
    pub far_plane: f32,
    /// Screen-space radius in pixels below which a splat is culled. Lower it
    /// for screenshots; the default pops slightly on dolly.
    pub pixel_threshold: f32,
    /// Variance added to both diagonals of the projected 2D covariance, with
    /// a matching opacity compensation, to soften sub-pixel splats.
    pub low_pass_filter: f32,
    /// Alpha below which the fragment stage discards.
    pub alpha_cull_threshold: f32,
    pub sh_mode: ShMode,
    pub variant: BackendVariant,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            near_plane: 0.1,
            far_plane: 1000.0,
            pixel_threshold: 1.0,
            low_pass_filter: 0.3,
            alpha_cull_threshold: 1.0 / 255.0,
            sh_mode: ShMode::L1,
            variant: BackendVariant::Full,
        }
    }
}
