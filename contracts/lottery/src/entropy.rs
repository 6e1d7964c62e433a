//! Winner selection sources.

use soroban_sdk::Env;

/// Supplies the draw used to pick a winner among `entrants` entries.
///
/// Settlement reduces the returned value modulo `entrants`, so a source only
/// has to be uniform over a range that is a multiple of it.
pub trait WinnerSource {
    fn pick(&self, env: &Env, entrants: u32) -> u32;
}

/// Draws from the host PRNG.
///
/// The PRNG is seeded by the network for each invocation, so a draw cannot be
/// influenced by the caller but is fully determined once the ledger closes.
pub struct LedgerPrng;

impl WinnerSource for LedgerPrng {
    fn pick(&self, env: &Env, entrants: u32) -> u32 {
        let drawn: u64 = env.prng().gen_range(0..u64::from(entrants));
        drawn as u32
    }
}
