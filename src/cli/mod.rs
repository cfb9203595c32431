mod command;
mod runner;
mod util;

pub use command::{Command, QuerySource};
pub use runner::{EXIT_DISQUALIFIED, EXIT_OK, OutputMode, run, run_with_format};
pub use util::{parse_output_mode, read_query};
