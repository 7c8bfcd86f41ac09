pub mod report_log;
pub mod search_index;
