pub mod dates;
pub mod file;
pub mod status;

pub use dates::{
    check_date_range, validate_date_range, validate_date_range_on, DateRange, DateRangeError,
    VALID_DATES,
};
pub use file::{file_info, validate_file_path, FileError, FileInfo, InputKind, SelectedFile};
pub use status::{
    debug_lines, evaluate_with, ready_message, summary, StatusSummary, StatusTracker, SystemStatus,
    ValidationStatus, NO_INTERNET,
};
