pub mod cat;
pub mod export;
pub mod init;
pub mod ls;
#[cfg(feature = "fuse")]
pub mod mount;
pub mod search;
pub mod stat;
pub mod version;

pub use cat::Cat;
pub use export::Export;
pub use init::Init;
pub use ls::Ls;
#[cfg(feature = "fuse")]
pub use mount::Mount;
pub use search::Search;
pub use stat::Stat;
pub use version::Version;
