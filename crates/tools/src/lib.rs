//! commsim tools library

pub mod pipeline;
pub mod config;
pub mod common;
pub mod transport;
pub mod tx;
pub mod rx;

pub use pipeline::{Pipeline, PipelineError, Transmitted};
pub use config::{PipelineConfig, SchemeArgs};
pub use transport::{Request, Response, Server};
pub use tx::{TxConfig, Transmitter};
pub use rx::{RxConfig, Receiver};
