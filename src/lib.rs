pub use dropgate_core::*;

#[cfg(feature = "server")]
pub mod server {
    pub use dropgate_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use dropgate_client::*;
}

#[cfg(feature = "fs")]
pub mod fs {
    pub use dropgate_fs::*;
}

#[cfg(feature = "memory")]
pub mod memory {
    pub use dropgate_memory::*;
}

#[cfg(feature = "mock_auth")]
pub mod auth_mock {
    pub use dropgate_auth_mock::*;
}

#[cfg(feature = "s3")]
pub mod s3 {
    pub use dropgate_s3::*;
}

#[cfg(feature = "opendal")]
pub mod opendal {
    pub use dropgate_opendal::*;
}

pub mod prelude {
    pub use dropgate_core::prelude::*;

    #[cfg(feature = "server")]
    pub use dropgate_server::prelude::*;

    #[cfg(feature = "client")]
    pub use dropgate_client::DropgateClient;

    #[cfg(feature = "fs")]
    pub use dropgate_fs::FileSystemStore;

    #[cfg(feature = "memory")]
    pub use dropgate_memory::MemoryStore;

    #[cfg(feature = "mock_auth")]
    pub use dropgate_auth_mock::AllowAllAuth;

    #[cfg(feature = "s3")]
    pub use dropgate_s3::S3Store;

    #[cfg(feature = "opendal")]
    pub use dropgate_opendal::OpendalStore;
}
