pub mod catalog;
pub mod error;
pub mod gateway;
pub mod registrar;
pub mod store;
pub mod traits;

#[cfg(test)]
mod testutil;

pub mod prelude {
    pub use super::catalog::*;
    pub use super::error::*;
    pub use super::gateway::*;
    pub use super::registrar::*;
    pub use super::store::*;
    pub use super::traits::*;
}
