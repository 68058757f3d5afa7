//! The XOR anonymization mixer (spec section 4.2): combines one file block
//! with two pool randomizers, enforcing a minimum public-domain
//! participation ratio across a file.

mod config;
mod error;
mod mixer;
mod positions;
mod splitter;

pub use config::*;
pub use error::*;
pub use mixer::*;
pub use noisefs_common::Triple;
pub use positions::public_domain_positions;
