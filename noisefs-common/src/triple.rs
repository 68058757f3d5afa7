use crate::Cid;

/// One file-block's anonymization recipe: the anonymized block CID plus
/// the two randomizer CIDs XORed into it (spec section 3: "Descriptor...
/// triples: ordered sequence of `(dataCID, rand1CID, rand2CID)`").
///
/// Shared between the Mixer, which emits these, and the Descriptor, which
/// accumulates and seals them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub data_cid: Cid,
    pub rand1_cid: Cid,
    pub rand2_cid: Cid,
}
