//! Turning spreadsheet range cells into clip jobs, and cutting them.

pub mod extract;
pub mod plan;

pub use extract::{discard_partial_output, ClipExtractor, FfmpegExtractor};
pub use plan::{
    output_folder, plan_row, split_range_cell, ClipJob, ClipNaming, RowPlan, TimeRange,
    DEFAULT_FOLDER_NAME_LIMIT,
};
