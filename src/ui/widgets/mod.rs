pub mod monitor_status;

pub use monitor_status::{last_updated_line, render_monitor_status};
