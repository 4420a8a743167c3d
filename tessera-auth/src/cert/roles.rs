//! Role sets transmitted as a 64-bit mask, one bit per role id.

use std::collections::BTreeSet;

use super::RoleError;

/// Number of role ids a mask can carry.
pub const MAX_ROLES: u8 = 64;

/// An application role identified by a small integer in `0..64`.
pub trait Role: Ord + Sized {
    fn id(&self) -> u8;

    /// The role with this id, or `None` if the application has no such role.
    fn from_id(id: u8) -> Option<Self>;
}

/// Role ids packed as `Σ 2^id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleMask(u64);

impl RoleMask {
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[must_use]
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Encode a role set.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::OutOfRange` for an id of 64 or above.
    pub fn encode<'a, R, I>(roles: I) -> Result<Self, RoleError>
    where
        R: Role + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        Self::from_ids(roles.into_iter().map(Role::id))
    }

    /// Encode raw role ids.
    pub fn from_ids(ids: impl IntoIterator<Item = u8>) -> Result<Self, RoleError> {
        ids.into_iter().try_fold(Self::EMPTY, |mask, id| {
            if id >= MAX_ROLES {
                return Err(RoleError::OutOfRange(id));
            }
            Ok(Self(mask.0 | (1u64 << id)))
        })
    }

    /// Raw ids of the set bits, ascending.
    pub fn ids(self) -> impl Iterator<Item = u8> {
        (0..MAX_ROLES).filter(move |id| self.0 & (1u64 << id) != 0)
    }

    #[must_use]
    pub fn contains_id(self, id: u8) -> bool {
        id < MAX_ROLES && self.0 & (1u64 << id) != 0
    }

    /// Decode into the application's role type.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::InvalidRoleCode` for the lowest set bit whose id
    /// `R` does not recognise.
    pub fn decode<R: Role>(self) -> Result<BTreeSet<R>, RoleError> {
        self.ids()
            .map(|id| R::from_id(id).ok_or(RoleError::InvalidRoleCode(id)))
            .collect()
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}
