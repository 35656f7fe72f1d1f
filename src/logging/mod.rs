//! Request/response log rendering

pub mod printer;

pub use printer::{
    print_rest_result, print_unbuffered_result, LogPrintConfig, RestResult, HIDDEN, UNBUFFERED,
};
