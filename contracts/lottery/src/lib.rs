//! Ticket Lottery Contract
//!
//! Runs a ticket-based lottery denominated in a SEP-41 token. Players pull
//! tokens into the contract through an allowance to buy entries; the owner or
//! one of up to two managers picks a winner, who receives the round's sales
//! minus a 5% operator fee. Accrued fees are withdrawn by the owner once at
//! least one round has settled since the last withdrawal.
//!
//! ## Round lifecycle
//! 1. `enter`: tokens move player → contract, the player is appended to the
//!    customer list and `sales` grows by the entered amount.
//! 2. `pick_winner`: one customer is drawn, paid `sales - fee`, `fee` accrues,
//!    `lottery_id` advances and the round state resets.
//! 3. `withdraw`: the owner collects `fees` when `last_withdrawn_id < lottery_id`.
//!
//! ## Storage Strategy
//! - `instance()`: Owner, Token, TicketPrice, Managers. Small, fixed-size
//!   configuration sharing one ledger entry and TTL.
//! - `persistent()`: Sales, Fees, LotteryId, LastWithdrawnId, Customers.
//!   Each is its own ledger entry, TTL bumped on every write.
//!
//! Every state-changing call also bumps the instance TTL.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env, IntoVal,
    Val, Vec,
};

mod access;
pub mod entropy;
mod ledger;

pub use access::MAX_MANAGERS;
pub use entropy::{LedgerPrng, WinnerSource};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Operator cut withheld at settlement, in basis points (5%).
pub const FEE_BPS: u32 = 500;

/// Ticket price set at init, in whole tokens. Scaled by the token's decimals.
///
/// `init` stores `20 * 10^decimals` base units, not a raw price of 20 base
/// units, so the default means 20 tokens whatever the token's precision.
pub const DEFAULT_TICKET_PRICE: i128 = 20;

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized     = 2,
    /// Owner-only operation called by someone else.
    NotOwner           = 3,
    /// Winner pick by an identity that is neither owner nor manager.
    Unauthorized       = 4,
    TooManyManagers    = 5,
    /// Entry below the ticket price, or above the player's token balance.
    InsufficientFunds  = 6,
    /// No settled round since the last fee withdrawal.
    WinnerNotPicked    = 7,
    EmptyPool          = 8,
    InvalidAmount      = 9,
    Overflow           = 10,
}

impl From<shared::Error> for Error {
    fn from(err: shared::Error) -> Self {
        match err {
            shared::Error::InvalidAmount | shared::Error::InvalidFeeConfig => Error::InvalidAmount,
            shared::Error::Overflow => Error::Overflow,
        }
    }
}

// ---------------------------------------------------------------------------
// Storage Types
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Owner,
    Token,
    TicketPrice,
    Managers,
    // --- persistent() ---
    /// Amount collected in the open round.
    Sales,
    /// Operator fees accrued across settled rounds, not yet withdrawn.
    Fees,
    /// Number of settled rounds.
    LotteryId,
    LastWithdrawnId,
    /// Entrants of the open round, in entry order.
    Customers,
}

/// Point-in-time snapshot returned by `state`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LotteryState {
    pub ticket_price: i128,
    pub sales: i128,
    pub fees: i128,
    pub lottery_id: u64,
    pub last_withdrawn_id: u64,
    /// Number of entries in the open round.
    pub entrants: u32,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct Initialized {
    pub owner: Address,
    pub token: Address,
    pub ticket_price: i128,
}

#[contractevent]
pub struct TicketPriceSet {
    #[topic]
    pub owner: Address,
    pub ticket_price: i128,
}

#[contractevent]
pub struct ManagerAdded {
    #[topic]
    pub manager: Address,
    /// Size of the manager set after the change.
    pub managers: u32,
}

#[contractevent]
pub struct ManagerRemoved {
    #[topic]
    pub manager: Address,
    /// Size of the manager set after the change.
    pub managers: u32,
}

#[contractevent]
pub struct Entered {
    #[topic]
    pub lottery_id: u64,
    #[topic]
    pub player: Address,
    pub amount: i128,
}

#[contractevent]
pub struct WinnerPicked {
    #[topic]
    pub lottery_id: u64,
    #[topic]
    pub winner: Address,
    pub prize: i128,
    pub fee: i128,
}

#[contractevent]
pub struct FeesWithdrawn {
    #[topic]
    pub owner: Address,
    pub lottery_id: u64,
    pub amount: i128,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct Lottery;

#[contractimpl]
impl Lottery {
    // -----------------------------------------------------------------------
    // init
    // -----------------------------------------------------------------------

    /// Initialize the lottery. May only be called once.
    ///
    /// `token` must be a deployed SEP-41 contract. The ticket price starts at
    /// `DEFAULT_TICKET_PRICE` whole tokens, scaled by the token's decimals.
    pub fn init(env: Env, owner: Address, token: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Owner) {
            return Err(Error::AlreadyInitialized);
        }

        owner.require_auth();

        let decimals = ledger::decimals(&env, &token);
        let ticket_price = shared::to_base_units(DEFAULT_TICKET_PRICE, decimals)?;

        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage()
            .instance()
            .set(&DataKey::TicketPrice, &ticket_price);
        env.storage()
            .instance()
            .set(&DataKey::Managers, &Vec::<Address>::new(&env));
        bump_instance(&env);

        // Seed persistent counters so downstream reads never encounter None.
        set_persistent(&env, DataKey::Sales, &0i128);
        set_persistent(&env, DataKey::Fees, &0i128);
        set_persistent(&env, DataKey::LotteryId, &0u64);
        set_persistent(&env, DataKey::LastWithdrawnId, &0u64);
        set_persistent(&env, DataKey::Customers, &Vec::<Address>::new(&env));

        Initialized {
            owner,
            token,
            ticket_price,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Owner configuration
    // -----------------------------------------------------------------------

    /// Change the ticket price. Owner only. Applies to the open round.
    pub fn set_ticket_price(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        require_initialized(&env)?;
        access::require_owner(&env, &caller)?;

        if amount < 0 {
            return Err(Error::InvalidAmount);
        }

        env.storage().instance().set(&DataKey::TicketPrice, &amount);
        bump_instance(&env);

        TicketPriceSet {
            owner: caller,
            ticket_price: amount,
        }
        .publish(&env);

        Ok(())
    }

    /// Grant `manager` winner-picking rights. Owner only, at most two managers.
    pub fn set_manager(env: Env, caller: Address, manager: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        access::add_manager(&env, manager)
    }

    /// Revoke `manager`. Owner only; removing a non-manager is a no-op.
    pub fn remove_manager(env: Env, caller: Address, manager: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        access::remove_manager(&env, manager);
        Ok(())
    }

    pub fn is_manager(env: Env, who: Address) -> bool {
        access::managers(&env).contains(&who)
    }

    pub fn managers(env: Env) -> Result<Vec<Address>, Error> {
        require_initialized(&env)?;
        Ok(access::managers(&env))
    }

    // -----------------------------------------------------------------------
    // enter
    // -----------------------------------------------------------------------

    /// Buy one entry into the open round for `amount` tokens.
    ///
    /// `amount` must be at least the ticket price. The player must have
    /// approved this contract for at least `amount` on the token; exactly
    /// `amount` is pulled and added to `sales`, with no refund of any excess
    /// over the price. Each call is a separate entry, so repeat entries raise
    /// the player's odds proportionally.
    pub fn enter(env: Env, player: Address, amount: i128) -> Result<(), Error> {
        require_initialized(&env)?;

        if amount < get_ticket_price(&env) {
            return Err(Error::InsufficientFunds);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        player.require_auth();

        let token = get_token(&env);
        if ledger::balance_of(&env, &token, &player) < amount {
            return Err(Error::InsufficientFunds);
        }

        ledger::collect(&env, &token, &player, amount);

        let sales = get_sales(&env)
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        set_persistent(&env, DataKey::Sales, &sales);

        let mut customers = get_customers(&env);
        customers.push_back(player.clone());
        set_persistent(&env, DataKey::Customers, &customers);
        bump_instance(&env);

        Entered {
            lottery_id: get_lottery_id(&env),
            player,
            amount,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // pick_winner
    // -----------------------------------------------------------------------

    /// Settle the open round and return the winner. Owner or manager only.
    ///
    /// The winner is drawn from the host PRNG, which the network seeds per
    /// invocation. The draw is reproducible by anyone replaying the ledger.
    pub fn pick_winner(env: Env, caller: Address) -> Result<Address, Error> {
        require_initialized(&env)?;
        access::require_owner_or_manager(&env, &caller)?;
        settle_round(&env, &LedgerPrng)
    }

    // -----------------------------------------------------------------------
    // withdraw
    // -----------------------------------------------------------------------

    /// Transfer all accrued fees to the owner. Owner only.
    ///
    /// Allowed once per settled round: a second withdrawal before the next
    /// `pick_winner` returns `WinnerNotPicked`. Returns the amount paid.
    pub fn withdraw(env: Env, caller: Address) -> Result<i128, Error> {
        require_initialized(&env)?;
        access::require_owner(&env, &caller)?;

        let lottery_id = get_lottery_id(&env);
        if get_last_withdrawn_id(&env) >= lottery_id {
            return Err(Error::WinnerNotPicked);
        }

        let amount = get_fees(&env);

        set_persistent(&env, DataKey::Fees, &0i128);
        set_persistent(&env, DataKey::LastWithdrawnId, &lottery_id);
        bump_instance(&env);

        if amount > 0 {
            ledger::pay(&env, &get_token(&env), &caller, amount);
        }

        FeesWithdrawn {
            owner: caller,
            lottery_id,
            amount,
        }
        .publish(&env);

        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    pub fn owner(env: Env) -> Result<Address, Error> {
        require_initialized(&env)?;
        access::owner(&env)
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        require_initialized(&env)?;
        Ok(get_token(&env))
    }

    pub fn ticket_price(env: Env) -> Result<i128, Error> {
        require_initialized(&env)?;
        Ok(get_ticket_price(&env))
    }

    pub fn sales(env: Env) -> Result<i128, Error> {
        require_initialized(&env)?;
        Ok(get_sales(&env))
    }

    pub fn fees(env: Env) -> Result<i128, Error> {
        require_initialized(&env)?;
        Ok(get_fees(&env))
    }

    pub fn lottery_id(env: Env) -> Result<u64, Error> {
        require_initialized(&env)?;
        Ok(get_lottery_id(&env))
    }

    pub fn last_withdrawn_id(env: Env) -> Result<u64, Error> {
        require_initialized(&env)?;
        Ok(get_last_withdrawn_id(&env))
    }

    /// Entrants of the open round in entry order, one slot per entry.
    pub fn get_customers(env: Env) -> Result<Vec<Address>, Error> {
        require_initialized(&env)?;
        Ok(get_customers(&env))
    }

    /// Returns a point-in-time snapshot of the lottery's accounting state.
    pub fn state(env: Env) -> Result<LotteryState, Error> {
        require_initialized(&env)?;
        Ok(LotteryState {
            ticket_price: get_ticket_price(&env),
            sales: get_sales(&env),
            fees: get_fees(&env),
            lottery_id: get_lottery_id(&env),
            last_withdrawn_id: get_last_withdrawn_id(&env),
            entrants: get_customers(&env).len(),
        })
    }
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Draw a winner from `source`, pay the prize and open the next round.
///
/// Callers are responsible for authorization. All accounting state is written
/// before the outbound token transfer.
pub(crate) fn settle_round<S: WinnerSource>(env: &Env, source: &S) -> Result<Address, Error> {
    let customers = get_customers(env);
    let entrants = customers.len();
    if entrants == 0 {
        return Err(Error::EmptyPool);
    }

    let index = source.pick(env, entrants) % entrants;
    let winner = customers.get(index).ok_or(Error::EmptyPool)?;

    let split = shared::split_pot(get_sales(env), FEE_BPS)?;
    let fees = get_fees(env)
        .checked_add(split.fee)
        .ok_or(Error::Overflow)?;
    let lottery_id = get_lottery_id(env)
        .checked_add(1)
        .ok_or(Error::Overflow)?;

    set_persistent(env, DataKey::Fees, &fees);
    set_persistent(env, DataKey::LotteryId, &lottery_id);
    set_persistent(env, DataKey::Sales, &0i128);
    set_persistent(env, DataKey::Customers, &Vec::<Address>::new(env));
    bump_instance(env);

    if split.prize > 0 {
        ledger::pay(env, &get_token(env), &winner, split.prize);
    }

    WinnerPicked {
        lottery_id,
        winner: winner.clone(),
        prize: split.prize,
        fee: split.fee,
    }
    .publish(env);

    Ok(winner)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Owner) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

fn get_token(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .expect("Lottery: token not set")
}

fn get_ticket_price(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TicketPrice)
        .unwrap_or(0)
}

fn get_sales(env: &Env) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Sales)
        .unwrap_or(0)
}

fn get_fees(env: &Env) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Fees)
        .unwrap_or(0)
}

fn get_lottery_id(env: &Env) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::LotteryId)
        .unwrap_or(0)
}

fn get_last_withdrawn_id(env: &Env) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::LastWithdrawnId)
        .unwrap_or(0)
}

fn get_customers(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Customers)
        .unwrap_or_else(|| Vec::new(env))
}

/// Write a value to persistent storage and extend its TTL in one step.
fn set_persistent<V: IntoVal<Env, Val>>(env: &Env, key: DataKey, value: &V) {
    env.storage().persistent().set(&key, value);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}
