//! The sealed file-reconstruction recipe (spec section 4.3): an ordered
//! list of `(dataCID, rand1CID, rand2CID)` triples plus file metadata, with
//! a canonical wire format (spec section 6).

mod descriptor;
mod error;
mod wire;

pub use descriptor::*;
pub use error::*;
