pub mod handler;
pub mod printer;
pub mod session;

pub use handler::ResponseHandler;
pub use printer::{ShotPrinter, HEADER};
pub use session::{SessionOptions, StreamingSession};
