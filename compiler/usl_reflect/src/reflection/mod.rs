//! Reflection tables for one extracted stage.
//!
//! Every list keeps declaration order; the side indexes give constant
//! time lookup by name and by numeric slot.

use rustc_hash::FxHashMap;
use usl_ir::{
    BuiltinVariable, EntryPoint, ExternalVariable, InterfaceSlot, InterfaceVariable, Name,
    ShaderStage, StructField, Type,
};

use crate::error::InterfaceDirection;
use crate::ReflectError;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryPointInfo {
    pub stage: ShaderStage,
    pub function: Name,
    pub workgroup: Option<[u32; 3]>,
}

/// An `input` or `output` variable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct InterfaceInfo {
    pub name: Name,
    pub ty: Type,
    /// `None` for builtin variables.
    pub location: Option<u32>,
    pub builtin: Option<BuiltinVariable>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ExternalKind {
    Sampler,
    UniformBuffer,
    StorageBuffer,
    /// Loose non-struct uniform.
    Value,
}

impl ExternalKind {
    pub fn classify(ty: &Type, storage: bool) -> Self {
        let base = ty.base();
        if base.is_sampler() {
            ExternalKind::Sampler
        } else if base.struct_name().is_some() {
            if storage {
                ExternalKind::StorageBuffer
            } else {
                ExternalKind::UniformBuffer
            }
        } else {
            ExternalKind::Value
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalInfo {
    pub name: Name,
    pub ty: Type,
    pub set: u32,
    pub binding: u32,
    pub kind: ExternalKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StructInfo {
    pub name: Name,
    pub fields: Vec<StructField>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
struct InterfaceTable {
    entries: Vec<InterfaceInfo>,
    by_name: FxHashMap<Name, usize>,
    by_location: FxHashMap<u32, usize>,
}

impl InterfaceTable {
    fn register(
        &mut self,
        var: &InterfaceVariable,
        direction: InterfaceDirection,
    ) -> Result<(), ReflectError> {
        let index = self.entries.len();
        if let InterfaceSlot::Location(location) = var.slot {
            if let Some(&other) = self.by_location.get(&location) {
                return Err(ReflectError::DuplicateLocation {
                    name: var.name.clone(),
                    other: self.entries[other].name.clone(),
                    location,
                    direction,
                    span: var.span,
                });
            }
            self.by_location.insert(location, index);
        }
        let builtin = match var.slot {
            InterfaceSlot::Builtin(builtin) => Some(builtin),
            InterfaceSlot::Location(_) => None,
        };
        self.by_name.insert(var.name.clone(), index);
        self.entries.push(InterfaceInfo {
            name: var.name.clone(),
            ty: var.ty.clone(),
            location: var.slot.location(),
            builtin,
        });
        Ok(())
    }

    fn named(&self, name: &str) -> Option<&InterfaceInfo> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    fn at(&self, location: u32) -> Option<&InterfaceInfo> {
        self.by_location.get(&location).map(|&i| &self.entries[i])
    }
}

/// Inputs, outputs, externals and structs a stage uses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct AstReflection {
    entry_point: Option<EntryPointInfo>,
    inputs: InterfaceTable,
    outputs: InterfaceTable,
    externals: Vec<ExternalInfo>,
    externals_by_name: FxHashMap<Name, usize>,
    externals_by_binding: FxHashMap<(u32, u32), usize>,
    structs: Vec<StructInfo>,
    structs_by_name: FxHashMap<Name, usize>,
}

impl AstReflection {
    pub fn new() -> Self {
        AstReflection::default()
    }

    pub(crate) fn set_entry_point(&mut self, function: &Name, entry: EntryPoint) {
        self.entry_point = Some(EntryPointInfo {
            stage: entry.stage,
            function: function.clone(),
            workgroup: entry.workgroup,
        });
    }

    pub(crate) fn add_input(&mut self, var: &InterfaceVariable) -> Result<(), ReflectError> {
        self.inputs.register(var, InterfaceDirection::Input)
    }

    pub(crate) fn add_output(&mut self, var: &InterfaceVariable) -> Result<(), ReflectError> {
        self.outputs.register(var, InterfaceDirection::Output)
    }

    pub(crate) fn add_external(&mut self, var: &ExternalVariable) -> Result<(), ReflectError> {
        let key = (var.set, var.binding);
        if let Some(&other) = self.externals_by_binding.get(&key) {
            return Err(ReflectError::DuplicateBinding {
                name: var.name.clone(),
                other: self.externals[other].name.clone(),
                set: var.set,
                binding: var.binding,
                span: var.span,
            });
        }
        let index = self.externals.len();
        self.externals_by_binding.insert(key, index);
        self.externals_by_name.insert(var.name.clone(), index);
        self.externals.push(ExternalInfo {
            name: var.name.clone(),
            ty: var.ty.clone(),
            set: var.set,
            binding: var.binding,
            kind: ExternalKind::classify(&var.ty, var.storage),
        });
        Ok(())
    }

    /// Returns `false` when an identical struct is already registered.
    pub(crate) fn add_struct(&mut self, name: &Name, fields: &[StructField]) -> bool {
        if self.structs_by_name.contains_key(name) {
            return false;
        }
        self.structs_by_name.insert(name.clone(), self.structs.len());
        self.structs.push(StructInfo {
            name: name.clone(),
            fields: fields.to_vec(),
        });
        true
    }

    pub fn entry_point(&self) -> Option<&EntryPointInfo> {
        self.entry_point.as_ref()
    }

    pub fn inputs(&self) -> &[InterfaceInfo] {
        &self.inputs.entries
    }

    pub fn outputs(&self) -> &[InterfaceInfo] {
        &self.outputs.entries
    }

    pub fn externals(&self) -> &[ExternalInfo] {
        &self.externals
    }

    pub fn structs(&self) -> &[StructInfo] {
        &self.structs
    }

    pub fn input(&self, name: &str) -> Option<&InterfaceInfo> {
        self.inputs.named(name)
    }

    pub fn input_at(&self, location: u32) -> Option<&InterfaceInfo> {
        self.inputs.at(location)
    }

    pub fn output(&self, name: &str) -> Option<&InterfaceInfo> {
        self.outputs.named(name)
    }

    pub fn output_at(&self, location: u32) -> Option<&InterfaceInfo> {
        self.outputs.at(location)
    }

    pub fn external(&self, name: &str) -> Option<&ExternalInfo> {
        self.externals_by_name.get(name).map(|&i| &self.externals[i])
    }

    pub fn external_at(&self, set: u32, binding: u32) -> Option<&ExternalInfo> {
        self.externals_by_binding
            .get(&(set, binding))
            .map(|&i| &self.externals[i])
    }

    pub fn struct_named(&self, name: &str) -> Option<&StructInfo> {
        self.structs_by_name.get(name).map(|&i| &self.structs[i])
    }

    /// Names of everything reflected, in declaration order per category.
    pub fn interface_names(&self) -> impl Iterator<Item = &Name> {
        self.inputs()
            .iter()
            .map(|i| &i.name)
            .chain(self.outputs().iter().map(|o| &o.name))
            .chain(self.externals.iter().map(|e| &e.name))
    }
}
