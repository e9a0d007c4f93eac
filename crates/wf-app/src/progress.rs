//! Pipeline progress events.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    LoadingInputs,
    CheckingCache,
    LoadingCachedResult,
    MergingTests,
    EstimatingReservoirPressure,
    BuildingIprCurves,
    FittingCoefficients,
    AggregatingCoefficients,
    BuildingLookup,
    ResolvingOilRate,
    SavingResults,
    Completed,
}

impl PipelineStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadingInputs => "loading inputs",
            Self::CheckingCache => "checking cache",
            Self::LoadingCachedResult => "loading cached run",
            Self::MergingTests => "merging well tests",
            Self::EstimatingReservoirPressure => "estimating reservoir pressure",
            Self::BuildingIprCurves => "building IPR curves",
            Self::FittingCoefficients => "fitting daily coefficients",
            Self::AggregatingCoefficients => "aggregating coefficients",
            Self::BuildingLookup => "building lookup table",
            Self::ResolvingOilRate => "resolving oil rate",
            Self::SavingResults => "saving results",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineProgressEvent {
    pub stage: PipelineStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl PipelineProgressEvent {
    pub fn stage(stage: PipelineStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
