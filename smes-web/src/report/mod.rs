//! Reporting pipeline: pure transformations of the snapshot into
//! dashboard-ready data. Nothing here touches the database or holds state.

pub mod aggregate;
pub mod charts;
pub mod funnel;
pub mod kpis;

pub use aggregate::{aggregate, FrequencyTable};
pub use charts::{all_charts, chart_for_question, ChartConfig, ChartKind};
pub use funnel::{compute_funnel, survey_checkpoints, Checkpoint, CheckpointRule, FunnelStage};
pub use kpis::{compute_kpis, Kpis};
