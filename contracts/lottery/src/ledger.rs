//! Calls into the SEP-41 token the lottery is denominated in.
//!
//! A failing token call traps and reverts the whole invocation, so none of
//! these return a `Result`.

use soroban_sdk::{token::TokenClient, Address, Env};

pub(crate) fn decimals(env: &Env, token: &Address) -> u32 {
    TokenClient::new(env, token).decimals()
}

pub(crate) fn balance_of(env: &Env, token: &Address, who: &Address) -> i128 {
    TokenClient::new(env, token).balance(who)
}

/// Pull `amount` from `from` into the contract using the allowance `from`
/// granted to this contract.
pub(crate) fn collect(env: &Env, token: &Address, from: &Address, amount: i128) {
    let contract_address = env.current_contract_address();
    TokenClient::new(env, token).transfer_from(&contract_address, from, &contract_address, &amount);
}

/// Send `amount` from the contract's custody to `to`.
pub(crate) fn pay(env: &Env, token: &Address, to: &Address, amount: i128) {
    TokenClient::new(env, token).transfer(&env.current_contract_address(), to, &amount);
}
