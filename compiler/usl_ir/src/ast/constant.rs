//! Literal values.

use std::fmt;

use crate::{PrimitiveType, Type};

/// A scalar literal, also the value an option is bound to.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstantValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
}

impl ConstantValue {
    pub fn primitive(self) -> PrimitiveType {
        match self {
            ConstantValue::Bool(_) => PrimitiveType::Bool,
            ConstantValue::Int(_) => PrimitiveType::Int,
            ConstantValue::UInt(_) => PrimitiveType::UInt,
            ConstantValue::Float(_) => PrimitiveType::Float,
        }
    }

    pub fn ty(self) -> Type {
        Type::Primitive(self.primitive())
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ConstantValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Whether printing this value yields a leading minus sign.
    pub fn is_negative(self) -> bool {
        match self {
            ConstantValue::Int(v) => v < 0,
            ConstantValue::Float(v) => v.is_sign_negative(),
            ConstantValue::Bool(_) | ConstantValue::UInt(_) => false,
        }
    }
}

impl From<bool> for ConstantValue {
    fn from(value: bool) -> Self {
        ConstantValue::Bool(value)
    }
}

impl From<i32> for ConstantValue {
    fn from(value: i32) -> Self {
        ConstantValue::Int(value)
    }
}

impl From<u32> for ConstantValue {
    fn from(value: u32) -> Self {
        ConstantValue::UInt(value)
    }
}

impl From<f32> for ConstantValue {
    fn from(value: f32) -> Self {
        ConstantValue::Float(value)
    }
}

/// Literal spelling accepted by both the source language and GLSL.
///
/// Floats use the shortest representation that reads back to the same
/// bits, always with a `.` or an exponent so they never lex as integers.
impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Bool(b) => write!(f, "{b}"),
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::UInt(v) => write!(f, "{v}u"),
            ConstantValue::Float(v) => write!(f, "{v:?}"),
        }
    }
}
