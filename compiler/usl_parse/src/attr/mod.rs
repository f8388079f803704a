//! Declaration attributes: `[location(0)]`, `[set(1), binding(2)]`,
//! `[entry(fragment)]`.
//!
//! The grammar collects raw attributes; the functions here check them
//! against the declaration they are attached to.

use usl_ir::{BuiltinVariable, EntryPoint, InterfaceSlot, Name, ShaderStage, SourcePos, Span};

use crate::error::{AttributeError, AttributeErrorKind};

/// Every attribute name the language knows.
const KNOWN: &[&str] = &[
    "location", "builtin", "set", "binding", "storage", "entry", "stage", "workgroup",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeArg {
    Int(u32),
    Ident(Name),
}

/// An attribute as written, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: Name,
    pub args: Vec<AttributeArg>,
    pub span: Span,
    pub pos: SourcePos,
}

impl Attribute {
    fn error(&self, kind: AttributeErrorKind) -> AttributeError {
        AttributeError {
            kind,
            span: self.span,
            pos: self.pos,
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> AttributeError {
        self.error(AttributeErrorKind::InvalidArgument {
            attribute: self.name.clone(),
            reason: reason.into(),
        })
    }

    fn no_args(&self) -> Result<(), AttributeError> {
        if self.args.is_empty() {
            Ok(())
        } else {
            Err(self.invalid("takes no arguments"))
        }
    }

    fn single_int(&self) -> Result<u32, AttributeError> {
        match self.args.as_slice() {
            [AttributeArg::Int(value)] => Ok(*value),
            _ => Err(self.invalid("expected one integer")),
        }
    }

    fn single_ident(&self) -> Result<&Name, AttributeError> {
        match self.args.as_slice() {
            [AttributeArg::Ident(name)] => Ok(name),
            _ => Err(self.invalid("expected one name")),
        }
    }
}

/// Attributes attached to one declaration.
pub struct AttributeList {
    attrs: Vec<Attribute>,
    /// Where the declaration starts; used for missing-attribute errors.
    span: Span,
    pos: SourcePos,
}

impl AttributeList {
    pub fn new(attrs: Vec<Attribute>, span: Span, pos: SourcePos) -> Self {
        AttributeList { attrs, span, pos }
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Reject unknown and repeated names, and known names outside `allowed`.
    fn check(&self, allowed: &[&str], target: &'static str) -> Result<(), AttributeError> {
        for (i, attr) in self.attrs.iter().enumerate() {
            if !KNOWN.contains(&attr.name.as_str()) {
                return Err(attr.error(AttributeErrorKind::Unknown(attr.name.clone())));
            }
            if !allowed.contains(&attr.name.as_str()) {
                return Err(attr.error(AttributeErrorKind::NotAllowed {
                    attribute: attr.name.clone(),
                    target,
                }));
            }
            if self.attrs[..i].iter().any(|prev| prev.name == attr.name) {
                return Err(attr.error(AttributeErrorKind::Duplicate(attr.name.clone())));
            }
        }
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    fn missing(&self, target: &'static str, attribute: &'static str) -> AttributeError {
        AttributeError {
            kind: AttributeErrorKind::Missing { target, attribute },
            span: self.span,
            pos: self.pos,
        }
    }

    /// Declarations that take no attributes at all.
    pub fn expect_none(&self, target: &'static str) -> Result<(), AttributeError> {
        self.check(&[], target)
    }

    /// `location(N)` or `builtin(name)`, exactly one of them.
    pub fn interface_slot(&self) -> Result<InterfaceSlot, AttributeError> {
        const TARGET: &str = "an interface variable";
        self.check(&["location", "builtin"], TARGET)?;
        match (self.find("location"), self.find("builtin")) {
            (Some(location), None) => Ok(InterfaceSlot::Location(location.single_int()?)),
            (None, Some(builtin)) => {
                let name = builtin.single_ident()?;
                BuiltinVariable::from_name(name)
                    .map(InterfaceSlot::Builtin)
                    .ok_or_else(|| builtin.invalid(format!("unknown built-in variable `{name}`")))
            }
            (Some(_), Some(builtin)) => Err(builtin.error(AttributeErrorKind::NotAllowed {
                attribute: builtin.name.clone(),
                target: "a variable that already has a location",
            })),
            (None, None) => Err(self.missing(TARGET, "location")),
        }
    }

    /// `(set, binding, storage)` of an external variable.
    pub fn external_binding(&self) -> Result<(u32, u32, bool), AttributeError> {
        const TARGET: &str = "an external variable";
        self.check(&["set", "binding", "storage"], TARGET)?;
        let set = self.find("set").map(Attribute::single_int).transpose()?;
        let binding = self
            .find("binding")
            .ok_or_else(|| self.missing(TARGET, "binding"))?
            .single_int()?;
        let storage = match self.find("storage") {
            Some(attr) => {
                attr.no_args()?;
                true
            }
            None => false,
        };
        Ok((set.unwrap_or(0), binding, storage))
    }

    /// `entry(stage)`/`stage(stage)` plus an optional `workgroup(x, y, z)`.
    pub fn entry_point(&self) -> Result<Option<EntryPoint>, AttributeError> {
        const TARGET: &str = "a function";
        self.check(&["entry", "stage", "workgroup"], TARGET)?;

        let marker = match (self.find("entry"), self.find("stage")) {
            (Some(_), Some(second)) => {
                return Err(second.error(AttributeErrorKind::Duplicate(Name::new("entry"))));
            }
            (Some(attr), None) | (None, Some(attr)) => Some(attr),
            (None, None) => None,
        };
        let workgroup = self.find("workgroup");

        let Some(marker) = marker else {
            return match workgroup {
                Some(attr) => Err(attr.error(AttributeErrorKind::NotAllowed {
                    attribute: attr.name.clone(),
                    target: "a function that is not an entry point",
                })),
                None => Ok(None),
            };
        };

        let stage_name = marker.single_ident()?;
        let stage = ShaderStage::from_name(stage_name)
            .ok_or_else(|| marker.invalid(format!("unknown stage `{stage_name}`")))?;

        let workgroup = match workgroup {
            None => None,
            Some(attr) if stage != ShaderStage::Compute => {
                return Err(attr.error(AttributeErrorKind::NotAllowed {
                    attribute: attr.name.clone(),
                    target: "a non-compute entry point",
                }));
            }
            Some(attr) => Some(workgroup_size(attr)?),
        };

        Ok(Some(EntryPoint { stage, workgroup }))
    }
}

fn workgroup_size(attr: &Attribute) -> Result<[u32; 3], AttributeError> {
    let mut size = [1u32; 3];
    if attr.args.is_empty() || attr.args.len() > 3 {
        return Err(attr.invalid("expected one to three sizes"));
    }
    for (slot, arg) in size.iter_mut().zip(&attr.args) {
        match arg {
            AttributeArg::Int(0) => return Err(attr.invalid("sizes must be positive")),
            AttributeArg::Int(value) => *slot = *value,
            AttributeArg::Ident(_) => return Err(attr.invalid("expected integer sizes")),
        }
    }
    Ok(size)
}
