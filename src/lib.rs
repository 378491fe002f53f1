pub mod codec;
pub mod error;
pub mod logging;
pub mod reassembler;
pub mod receiver;
pub mod registry;
pub mod sender;
