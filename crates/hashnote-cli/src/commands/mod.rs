//! Command implementations

pub mod attach;
pub mod check;
pub mod scan;
pub mod strip;

pub use attach::attach_files;
pub use check::check_files;
pub use scan::scan_files;
pub use strip::strip_file;
