//! Owner and manager bookkeeping.
//!
//! The owner is fixed at init. Managers are a bounded list in instance storage
//! that only the owner can change; managers may pick winners but nothing else.

use soroban_sdk::{Address, Env, Vec};

use crate::{bump_instance, DataKey, Error, ManagerAdded, ManagerRemoved};

/// Maximum number of concurrent managers.
pub const MAX_MANAGERS: u32 = 2;

pub(crate) fn owner(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(Error::NotInitialized)
}

pub(crate) fn managers(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::Managers)
        .unwrap_or_else(|| Vec::new(env))
}

/// True when `who` is the owner or one of `managers`.
pub(crate) fn is_owner_or_manager(owner: &Address, managers: &Vec<Address>, who: &Address) -> bool {
    who == owner || managers.contains(who)
}

/// Verify that `caller` is the stored owner and has signed the invocation.
pub(crate) fn require_owner(env: &Env, caller: &Address) -> Result<(), Error> {
    let owner = owner(env)?;
    caller.require_auth();
    if caller != &owner {
        return Err(Error::NotOwner);
    }
    Ok(())
}

/// Verify that `caller` may settle a round and has signed the invocation.
pub(crate) fn require_owner_or_manager(env: &Env, caller: &Address) -> Result<(), Error> {
    let owner = owner(env)?;
    caller.require_auth();
    if !is_owner_or_manager(&owner, &managers(env), caller) {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

pub(crate) fn add_manager(env: &Env, manager: Address) -> Result<(), Error> {
    let mut current = managers(env);
    if current.contains(&manager) {
        return Ok(());
    }
    if current.len() >= MAX_MANAGERS {
        return Err(Error::TooManyManagers);
    }

    current.push_back(manager.clone());
    env.storage().instance().set(&DataKey::Managers, &current);
    bump_instance(env);

    ManagerAdded {
        manager,
        managers: current.len(),
    }
    .publish(env);
    Ok(())
}

/// Remove `manager` if present. Removing a non-manager changes nothing and
/// publishes nothing.
pub(crate) fn remove_manager(env: &Env, manager: Address) {
    let mut current = managers(env);
    let Some(index) = current.first_index_of(&manager) else {
        return;
    };

    current.remove(index);
    env.storage().instance().set(&DataKey::Managers, &current);
    bump_instance(env);

    ManagerRemoved {
        manager,
        managers: current.len(),
    }
    .publish(env);
}
