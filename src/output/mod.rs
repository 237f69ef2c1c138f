pub mod formatter;

pub use formatter::{
    format_heading, format_json, format_pick, format_race_table, format_race_tsv,
    format_standings_table, format_standings_tsv, should_use_colors, OutputFormat,
};
