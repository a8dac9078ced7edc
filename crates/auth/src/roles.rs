use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role (profile) name of a panel user.
///
/// Roles are opaque strings at this layer; the known ones are listed as
/// constants and ranked in [`crate::hierarchy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMINISTRADOR: Role = Role::from_static("administrador");
    pub const DIRETOR: Role = Role::from_static("diretor");
    pub const IDT: Role = Role::from_static("idt");
    pub const FINANCEIRO: Role = Role::from_static("financeiro");
    pub const RH: Role = Role::from_static("rh");
    pub const OPERACAO: Role = Role::from_static("operacao");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every role the panel knows, sorted by name.
    pub fn known() -> Vec<Role> {
        let mut roles = vec![
            Role::ADMINISTRADOR,
            Role::DIRETOR,
            Role::IDT,
            Role::FINANCEIRO,
            Role::RH,
            Role::OPERACAO,
        ];
        roles.sort();
        roles
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}
