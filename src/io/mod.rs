pub mod export;
pub mod profile;

pub use export::{export_csv, write_csv};
pub use profile::{PowerProfile, ProfileError, is_csv_filename, parse_profile_csv};
