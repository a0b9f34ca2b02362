pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, info, kind_label, muted, section, success, summary_row, timing, warn};
pub use progress::{ProgressManager, ProgressTotals, print_summary};
pub use progress_message::ProgressMessage;
pub use table::{component_table, language_table};
pub use theme::{Theme, theme};
