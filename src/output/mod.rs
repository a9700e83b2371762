pub mod formatter;

pub use formatter::{
    format_domain_list, format_manual_open, format_opening, format_remote, should_use_colors,
};
