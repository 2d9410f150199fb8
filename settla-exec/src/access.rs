//! Role-based access control.
//!
//! Every role has an admin role that may grant and revoke it. Governor
//! administers every role including itself; StrategyAdmin administers Strategy.
//! Any holder may renounce its own role.

use settla_domain::{Address, Event, Role};
use settla_store::Ledger;

use crate::error::{FactoryError, FactoryResult};

/// Fail unless `principal` holds `role`
pub fn require(ledger: &Ledger, role: Role, principal: Address) -> FactoryResult<()> {
    if ledger.roles.has(role, principal) {
        Ok(())
    } else {
        Err(FactoryError::Unauthorized { role, principal })
    }
}

/// Fail unless `principal` holds at least one of `roles`.
///
/// The error names the first role in the list.
pub fn require_any(ledger: &Ledger, roles: &[Role], principal: Address) -> FactoryResult<()> {
    if roles.iter().any(|role| ledger.roles.has(*role, principal)) {
        return Ok(());
    }
    let role = roles.first().copied().unwrap_or(Role::Governor);
    Err(FactoryError::Unauthorized { role, principal })
}

/// Membership check
pub fn has_role(ledger: &Ledger, role: Role, principal: Address) -> bool {
    ledger.roles.has(role, principal)
}

/// Install the first governor. Fails if one already exists.
pub fn initialize(ledger: &mut Ledger, governor: Address) -> FactoryResult<()> {
    if governor.is_zero() {
        return Err(FactoryError::ZeroAddress);
    }
    if !ledger.roles.members(Role::Governor).is_empty() {
        return Err(FactoryError::AlreadyInitialized);
    }
    ledger.roles.grant(Role::Governor, governor);
    ledger.emit(Event::RoleGranted { role: Role::Governor, principal: governor, sender: governor });
    Ok(())
}

/// Grant `role` to `principal`. Caller must hold the role's admin.
///
/// Returns `false` (and emits nothing) if the principal already held it.
pub fn grant(ledger: &mut Ledger, caller: Address, role: Role, principal: Address) -> FactoryResult<bool> {
    require(ledger, role.admin(), caller)?;
    if principal.is_zero() {
        return Err(FactoryError::ZeroAddress);
    }
    let granted = ledger.roles.grant(role, principal);
    if granted {
        ledger.emit(Event::RoleGranted { role, principal, sender: caller });
    }
    Ok(granted)
}

/// Revoke `role` from `principal`. Caller must hold the role's admin.
pub fn revoke(ledger: &mut Ledger, caller: Address, role: Role, principal: Address) -> FactoryResult<bool> {
    require(ledger, role.admin(), caller)?;
    let revoked = ledger.roles.revoke(role, principal);
    if revoked {
        ledger.emit(Event::RoleRevoked { role, principal, sender: caller });
    }
    Ok(revoked)
}

/// Drop a role the caller holds
pub fn renounce(ledger: &mut Ledger, caller: Address, role: Role) -> FactoryResult<bool> {
    let revoked = ledger.roles.revoke(role, caller);
    if revoked {
        ledger.emit(Event::RoleRevoked { role, principal: caller, sender: caller });
    }
    Ok(revoked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn ledger_with_governor() -> Ledger {
        let mut ledger = Ledger::new(addr(0xe0), addr(0xd0));
        initialize(&mut ledger, addr(1)).unwrap();
        ledger
    }

    #[test]
    fn test_initialize_once() {
        let mut ledger = ledger_with_governor();
        assert!(has_role(&ledger, Role::Governor, addr(1)));
        assert!(matches!(initialize(&mut ledger, addr(2)), Err(FactoryError::AlreadyInitialized)));
    }

    #[test]
    fn test_governor_grants_every_role() {
        let mut ledger = ledger_with_governor();
        for role in Role::ALL.into_iter().filter(|r| *r != Role::Strategy) {
            assert!(grant(&mut ledger, addr(1), role, addr(5)).unwrap());
        }
        assert!(grant(&mut ledger, addr(1), Role::Strategy, addr(5)).is_err());
        assert!(!grant(&mut ledger, addr(1), Role::Mechanic, addr(5)).unwrap());
    }

    #[test]
    fn test_strategy_admin_grants_strategy_only() {
        let mut ledger = ledger_with_governor();
        grant(&mut ledger, addr(1), Role::StrategyAdmin, addr(2)).unwrap();

        assert!(grant(&mut ledger, addr(2), Role::Strategy, addr(3)).unwrap());
        assert!(matches!(
            grant(&mut ledger, addr(2), Role::Mechanic, addr(3)),
            Err(FactoryError::Unauthorized { role: Role::Governor, .. })
        ));
    }

    #[test]
    fn test_renounce_own_role() {
        let mut ledger = ledger_with_governor();
        grant(&mut ledger, addr(1), Role::Mechanic, addr(4)).unwrap();
        let before = ledger.events.len();

        assert!(renounce(&mut ledger, addr(4), Role::Mechanic).unwrap());
        assert!(!has_role(&ledger, Role::Mechanic, addr(4)));
        assert!(!renounce(&mut ledger, addr(4), Role::Mechanic).unwrap());
        assert_eq!(ledger.events.len(), before + 1);
    }

    #[test]
    fn test_require_any() {
        let mut ledger = ledger_with_governor();
        grant(&mut ledger, addr(1), Role::SwapperAdder, addr(6)).unwrap();

        assert!(require_any(&ledger, &[Role::SwapperAdder, Role::Governor], addr(6)).is_ok());
        assert!(require_any(&ledger, &[Role::SwapperAdder, Role::Governor], addr(1)).is_ok());
        assert!(require_any(&ledger, &[Role::SwapperAdder, Role::Governor], addr(7)).is_err());
    }
}
