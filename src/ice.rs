use serde::{Deserialize, Serialize};

use crate::id::Id;

/// Local ICE credentials, as written to `a=ice-ufrag` and `a=ice-pwd`.
///
/// Changing these between two offers is what signals an ICE restart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IceCreds {
    /// From a=ice-ufrag
    pub ufrag: String,
    /// From a=ice-pwd
    pub pass: String,
}

impl IceCreds {
    pub fn new() -> Self {
        // Username Fragment and Password:  Values used to perform connectivity
        // checks.  The values MUST be unguessable, with at least 128 bits of
        // random number generator output used to generate the password, and
        // at least 24 bits of output to generate the username fragment.
        let ufrag = Id::<4>::random().to_string();
        let pass = Id::<24>::random().to_string();
        IceCreds { ufrag, pass }
    }
}

impl Default for IceCreds {
    fn default() -> Self {
        IceCreds::new()
    }
}
