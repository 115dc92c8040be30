//! Run report output.
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 08-00-03.json
//!     └── 11-00-02.json
//! ```

pub mod json;
