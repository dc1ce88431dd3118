// Role checks shared by the use cases

use crate::domain::{Identity, Role};
use crate::error::{AppError, Result};

/// Fails with `Forbidden` unless the caller has `role`
pub fn require_role(identity: &Identity, role: Role) -> Result<()> {
    if identity.role != role {
        return Err(AppError::Forbidden(format!("{} role required", role)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_role() {
        let customer = Identity::new(1, Role::Customer);
        assert!(require_role(&customer, Role::Customer).is_ok());

        let err = require_role(&customer, Role::Shopkeeper).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(err.to_string().contains("shopkeeper"));
    }
}
