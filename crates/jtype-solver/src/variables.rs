//! Local variable slots of a method body.
//!
//! A slot may hold several variables over the method's bytecode range; each
//! [`VariableDefinition`] covers `scope_start..=scope_end`. Variables without
//! debug information are created on demand by [`VariableTable::ensure`] and
//! closed later with [`VariableTable::update_scopes`].

use crate::error::{TypeError, TypeResult};
use crate::types::TypeId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

/// Value category of a load, store or increment instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

impl SlotKind {
    pub const fn type_id(self) -> TypeId {
        match self {
            Self::Int => TypeId::INT,
            Self::Long => TypeId::LONG,
            Self::Float => TypeId::FLOAT,
            Self::Double => TypeId::DOUBLE,
            Self::Reference => TypeId::OBJECT,
        }
    }
}

/// The instruction touching a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotAccess {
    pub kind: SlotKind,
    pub is_store: bool,
    /// Encoded length of the instruction, operands included.
    pub instruction_len: u32,
}

impl SlotAccess {
    pub fn load(kind: SlotKind, instruction_len: u32) -> Self {
        Self {
            kind,
            is_store: false,
            instruction_len,
        }
    }

    pub fn store(kind: SlotKind, instruction_len: u32) -> Self {
        Self {
            kind,
            is_store: true,
            instruction_len,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDefinition {
    pub slot: u32,
    pub name: Arc<str>,
    pub variable_type: TypeId,
    pub scope_start: u32,
    /// Inclusive end offset; `None` while the scope is still open.
    pub scope_end: Option<u32>,
    /// `false` when the type is only a placeholder (`Object` for references).
    pub type_known: bool,
}

impl VariableDefinition {
    pub fn new(slot: u32, name: &str, variable_type: TypeId) -> Self {
        Self {
            slot,
            name: Arc::from(name),
            variable_type,
            scope_start: 0,
            scope_end: None,
            type_known: true,
        }
    }

    pub fn with_scope(mut self, start: u32, end: Option<u32>) -> Self {
        self.scope_start = start;
        self.scope_end = end;
        self
    }

    pub fn covers(&self, offset: u32) -> bool {
        self.scope_start <= offset && self.scope_end.is_none_or(|end| end >= offset)
    }
}

#[derive(Clone, Debug, Default)]
pub struct VariableTable {
    variables: Vec<VariableDefinition>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, variable: VariableDefinition) {
        self.variables.push(variable);
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableDefinition> {
        self.variables.iter()
    }

    /// One more than the highest slot in use.
    pub fn slot_count(&self) -> u32 {
        self.variables
            .iter()
            .map(|variable| variable.slot + 1)
            .max()
            .unwrap_or(0)
    }

    /// First variable in `slot` whose scope covers `offset`; any variable in
    /// the slot when `offset` is `None`.
    pub fn try_find(&self, slot: u32, offset: Option<u32>) -> Option<&VariableDefinition> {
        self.position(slot, offset).map(|index| &self.variables[index])
    }

    /// Asserting form of [`try_find`](Self::try_find).
    pub fn find(&self, slot: u32, offset: Option<u32>) -> TypeResult<&VariableDefinition> {
        self.try_find(slot, offset)
            .ok_or(TypeError::VariableNotFound {
                slot,
                offset: offset.map_or(-1, i64::from),
            })
    }

    fn position(&self, slot: u32, offset: Option<u32>) -> Option<usize> {
        self.variables.iter().position(|variable| {
            variable.slot == slot && offset.is_none_or(|offset| variable.covers(offset))
        })
    }

    /// The variable `access` at `offset` refers to, created if missing.
    ///
    /// A store also matches a variable whose scope starts right after the
    /// instruction. A new variable is named `$slot_offset$`, scoped from
    /// `offset` with an open end, and typed from the access kind; references
    /// get a placeholder `Object` type with `type_known == false`.
    pub fn ensure(&mut self, slot: u32, access: SlotAccess, offset: u32) -> &VariableDefinition {
        let existing = self.position(slot, Some(offset)).or_else(|| {
            access
                .is_store
                .then(|| self.position(slot, Some(offset + access.instruction_len)))
                .flatten()
        });
        if let Some(index) = existing {
            return &self.variables[index];
        }

        let name = format!("${slot}_{offset}$");
        trace!(slot, offset, name = %name, kind = ?access.kind, "creating placeholder variable");
        self.variables.push(VariableDefinition {
            slot,
            name: Arc::from(name),
            variable_type: access.kind.type_id(),
            scope_start: offset,
            scope_end: None,
            type_known: access.kind != SlotKind::Reference,
        });
        &self.variables[self.variables.len() - 1]
    }

    /// Close every open scope: at the start of the next variable sharing the
    /// slot, or at `code_size` when none follows.
    pub fn update_scopes(&mut self, code_size: u32) {
        let ends: Vec<Option<u32>> = self
            .variables
            .iter()
            .map(|variable| {
                if variable.scope_end.is_some() {
                    return variable.scope_end;
                }
                let next_start = self
                    .variables
                    .iter()
                    .filter(|other| {
                        other.slot == variable.slot && other.scope_start > variable.scope_start
                    })
                    .map(|other| other.scope_start)
                    .min();
                Some(next_start.unwrap_or(code_size))
            })
            .collect();
        for (variable, end) in self.variables.iter_mut().zip(ends) {
            variable.scope_end = end;
        }
    }
}

#[cfg(test)]
#[path = "../tests/variables_tests.rs"]
mod tests;
