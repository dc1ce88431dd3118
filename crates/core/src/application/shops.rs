// Shop Directory - nearest shops for a customer

use crate::application::access::require_role;
use crate::domain::{rank_shops, Identity, RankedShop, Role, ShopLocation};
use crate::error::{AppError, Result};
use crate::port::UserRepository;
use std::sync::Arc;

pub struct ShopDirectory {
    users: Arc<dyn UserRepository>,
}

impl ShopDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Shops ranked by distance from the caller's stored location.
    /// Shops without coordinates are skipped.
    pub async fn nearest_shops(&self, identity: &Identity) -> Result<Vec<RankedShop>> {
        require_role(identity, Role::Customer)?;

        let me = self
            .users
            .find_by_id(identity.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", identity.user_id)))?;

        let candidates = self
            .users
            .list_shops()
            .await?
            .into_iter()
            .filter_map(|shop| {
                shop.location.map(|location| ShopLocation {
                    id: shop.id,
                    name: shop.username,
                    address: shop.address,
                    location,
                })
            });

        Ok(rank_shops(me.location, candidates)?)
    }
}
