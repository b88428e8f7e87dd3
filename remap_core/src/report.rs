//! Run accounting and the completion report.

use std::fmt;

use serde::Serialize;

/// Counters accumulated over one processing run. Monotonic while the run is
/// active; reset only when the session returns to idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemapCounters {
    /// Graph nodes whose single-index layer assignment changed.
    pub objects: u32,
    /// Component property trees with at least one rewritten mask.
    pub components: u32,
    /// Individual layer-mask leaves rewritten anywhere.
    pub masks: u32,
    /// Scene items where object or component counts grew.
    pub scenes: u32,
    /// Prefab items where object or component counts grew.
    pub prefabs: u32,
    /// Data-asset trees with at least one rewritten mask.
    pub assets: u32,
}

/// One recorded per-item failure. Processing always continues past these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessError {
    pub item: String,
    pub message: String,
}

impl ProcessError {
    pub fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.item, self.message)
    }
}

/// Everything the host needs to present the outcome of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionReport {
    pub counters: RemapCounters,
    pub physics_matrix_completed: bool,
    pub physics_2d_matrix_completed: bool,
    pub errors: Vec<ProcessError>,
}

impl CompletionReport {
    /// Multi-line human-readable summary of the run.
    pub fn summary(&self) -> String {
        format!(
            "Layer modification completed\n\n- Updated layer name settings.\n- {}\n- {}\n- {}\n- {}\n- Errors encountered: {}.",
            self.matrix_line(),
            self.matrix_2d_line(),
            self.objects_line(),
            self.masks_line(),
            self.errors.len()
        )
    }

    /// Verbatim dump of the error list for whatever sink the host picks.
    pub fn error_report(&self) -> String {
        let mut out = String::from("Layer remap failed with the following errors:");
        for error in &self.errors {
            out.push_str("\n - ");
            out.push_str(&error.to_string());
        }
        out
    }

    fn matrix_line(&self) -> &'static str {
        if self.physics_matrix_completed {
            "Physics collision matrix modifications succeeded."
        } else {
            "Physics collision matrix modifications failed with errors."
        }
    }

    fn matrix_2d_line(&self) -> &'static str {
        if self.physics_2d_matrix_completed {
            "Physics 2D collision matrix modifications succeeded."
        } else {
            "Physics 2D collision matrix modifications failed with errors."
        }
    }

    fn objects_line(&self) -> String {
        let c = &self.counters;
        if c.scenes > 0 && c.prefabs > 0 {
            format!(
                "Modified layer property for {} objects across {} scenes and {} prefabs.",
                c.objects, c.scenes, c.prefabs
            )
        } else if c.scenes > 0 {
            format!(
                "Modified layer property for {} objects across {} scenes.",
                c.objects, c.scenes
            )
        } else if c.prefabs > 0 {
            format!(
                "Modified layer property for {} objects across {} prefabs.",
                c.objects, c.prefabs
            )
        } else if c.objects > 0 {
            // Objects outside any counted container; not expected in practice.
            format!("Modified layer property for {} objects.", c.objects)
        } else {
            "No object layers affected by changes.".to_string()
        }
    }

    fn masks_line(&self) -> String {
        let c = &self.counters;
        if c.components > 0 && c.assets > 0 {
            format!(
                "Modified {} layer mask properties on {} components and {} data assets.",
                c.masks, c.components, c.assets
            )
        } else if c.components > 0 {
            format!(
                "Modified {} layer mask properties on {} components.",
                c.masks, c.components
            )
        } else if c.assets > 0 {
            format!(
                "Modified {} layer mask properties on {} data assets.",
                c.masks, c.assets
            )
        } else if c.masks > 0 {
            format!("Modified {} layer mask properties.", c.masks)
        } else {
            "No layer mask properties found on components or data assets.".to_string()
        }
    }
}
