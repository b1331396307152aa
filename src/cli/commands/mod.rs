mod ask;
mod init;
mod quote;

pub use ask::cmd_ask;
pub use init::cmd_init;
pub use quote::cmd_quote;
