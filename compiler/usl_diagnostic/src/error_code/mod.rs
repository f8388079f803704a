//! Error codes for all compiler diagnostics.
//!
//! Format: E#### where the first digit is the phase:
//! - E0xxx: lexer
//! - E1xxx: parser and attributes
//! - E2xxx: option specialization
//! - E3xxx: stage extraction and reflection
//! - E4xxx: code generation

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Invalid character in source
    E0001,
    /// Malformed number literal
    E0002,
    /// Unterminated block comment
    E0003,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unknown type name
    E1003,
    /// Unknown attribute
    E1004,
    /// Invalid attribute argument
    E1005,
    /// Missing required attribute
    E1006,
    /// Attribute given twice
    E1007,
    /// Attribute not allowed on this declaration
    E1008,
    /// Unresolved library in `include`
    E1009,
    /// Library includes itself
    E1010,
    /// Integer literal outside the `int` range
    E1011,

    // Specialization Errors (E2xxx)
    /// Option used but not bound
    E2001,
    /// Optional block condition is not a compile-time boolean
    E2002,
    /// Bound value does not match the declared option type
    E2003,

    // Extraction Errors (E3xxx)
    /// No entry function for the requested stage
    E3001,
    /// Two interface variables share a location
    E3002,
    /// Two externals share a set/binding pair
    E3003,
    /// Struct declared twice with different fields
    E3004,
    /// Identifier does not name any declaration
    E3005,
    /// Call to an unknown function
    E3006,
    /// Two entry functions for one stage
    E3007,
    /// `optional` block left in an unspecialized tree
    E3008,

    // Codegen Errors (E4xxx)
    /// Construct not representable in the target
    E4001,
    /// Bindings collide after flattening
    E4002,
    /// No entry function to generate
    E4003,
    /// More than one entry function and no fixed stage
    E4004,
    /// External assembler failed
    E4005,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
        }
    }

    /// Pipeline phase that reports this code.
    pub fn phase(self) -> &'static str {
        match self.as_str().as_bytes().get(1) {
            Some(b'0') => "lexer",
            Some(b'1') => "parser",
            Some(b'2') => "specialization",
            Some(b'3') => "extraction",
            _ => "codegen",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
