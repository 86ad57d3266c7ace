pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{default_log_root, get_claude_dir};
pub use paths::{format_path_with_tilde, project_name, validate_project_path};
pub use terminal::{ellipsize, strip_ansi_codes, truncate_chars};
