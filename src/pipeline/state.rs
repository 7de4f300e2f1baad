//! Per-request pipeline state machine.
//!
//! [`PipelineStage`] names each step the [`RequestPipeline`](super::RequestPipeline)
//! passes through; [`StageTrace`] records the path one request took.  Nothing
//! here outlives a single request.

// ---------------------------------------------------------------------------
// PipelineStage
// ---------------------------------------------------------------------------

/// States of one request.
///
/// ```text
/// Validating ──ok──▶ BuildingPrompt
///                    ──▶ SelectingModel   (grammar / spell only)
///                    ──▶ CallingUpstream
///                    ──▶ Normalizing
///                    ──▶ Done
/// any stage ──error──▶ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Credential and input checks; no network yet.
    Validating,
    BuildingPrompt,
    /// Listing the catalog and picking a model.
    SelectingModel,
    CallingUpstream,
    Normalizing,
    Done,
    Failed,
}

impl PipelineStage {
    /// `true` for `Done` and `Failed`.
    ///
    /// ```
    /// use writing_assistant::pipeline::PipelineStage;
    ///
    /// assert!(PipelineStage::Done.is_terminal());
    /// assert!(PipelineStage::Failed.is_terminal());
    /// assert!(!PipelineStage::CallingUpstream.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Validating => "validating",
            PipelineStage::BuildingPrompt => "building-prompt",
            PipelineStage::SelectingModel => "selecting-model",
            PipelineStage::CallingUpstream => "calling-upstream",
            PipelineStage::Normalizing => "normalizing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// StageTrace
// ---------------------------------------------------------------------------

/// Ordered record of the stages one request entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTrace {
    stages: Vec<PipelineStage>,
}

impl StageTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entry into `stage`.  Entering anything after a terminal stage
    /// is ignored.
    pub fn enter(&mut self, stage: PipelineStage) {
        if self.current().is_some_and(|s| s.is_terminal()) {
            log::warn!("pipeline: ignoring {} after terminal stage", stage.label());
            return;
        }
        log::debug!("pipeline: -> {}", stage.label());
        self.stages.push(stage);
    }

    pub fn current(&self) -> Option<PipelineStage> {
        self.stages.last().copied()
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_records_in_order() {
        let mut trace = StageTrace::new();
        trace.enter(PipelineStage::Validating);
        trace.enter(PipelineStage::BuildingPrompt);

        assert_eq!(
            trace.stages(),
            &[PipelineStage::Validating, PipelineStage::BuildingPrompt]
        );
        assert_eq!(trace.current(), Some(PipelineStage::BuildingPrompt));
    }

    #[test]
    fn nothing_follows_a_terminal_stage() {
        let mut trace = StageTrace::new();
        trace.enter(PipelineStage::Validating);
        trace.enter(PipelineStage::Failed);
        trace.enter(PipelineStage::Done);

        assert_eq!(trace.current(), Some(PipelineStage::Failed));
        assert_eq!(trace.stages().len(), 2);
    }

    #[test]
    fn labels_are_distinct() {
        let all = [
            PipelineStage::Validating,
            PipelineStage::BuildingPrompt,
            PipelineStage::SelectingModel,
            PipelineStage::CallingUpstream,
            PipelineStage::Normalizing,
            PipelineStage::Done,
            PipelineStage::Failed,
        ];
        let mut labels: Vec<_> = all.iter().map(|s| s.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), all.len());
    }
}
