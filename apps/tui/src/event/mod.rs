mod loop_handler;

pub use loop_handler::{collect_rows, render_text_table, run, run_headless, HeadlessRequest};
