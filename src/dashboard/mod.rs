pub mod aggregate;
pub mod columns;
pub mod derive;
pub mod io;
pub mod overview;
pub mod session;
pub mod steps;
pub mod types;

pub use derive::{DiscountBin, derive_columns, derive_discount_columns};
pub use io::{ACCEPTED_EXTENSIONS, UploadFormat, load_dataset};
pub use overview::{build_overview, schema_summary};
pub use session::{Session, prepare_report};
pub use steps::{AnalysisStep, Gate, STEPS, StepRun, run_steps};
pub use types::{
    ChartData, ChartKind, ChartOptions, ChartSpec, DASHBOARD_TITLE, Dataset, DatasetOverview,
    PAGE_TITLE, Page, Report, Section, SkippedStep, StepId, UPLOAD_ADVISORY,
};
