mod dump;
mod extract;
mod keys;

pub use dump::{DumpArgs, cmd_dump};
pub use extract::{ExtractArgs, cmd_extract};
pub use keys::{KeysArgs, cmd_keys};
