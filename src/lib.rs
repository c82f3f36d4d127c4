pub mod codec;
pub mod config;
pub mod content_type;
pub mod error;
pub mod http;
pub mod naming;
pub mod store;
pub mod thumbnail;

pub use content_type::{ContentType, is_allowed};
pub use error::{AssetError, AssetResult, ErrorKind};
pub use naming::generate_filename;
pub use store::{AssetStorage, AssetStore, Readable};
pub use thumbnail::make_thumbnail;
