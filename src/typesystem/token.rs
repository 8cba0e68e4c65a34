use std::fmt;
use std::hash::{Hash, Hasher};

/// Table id for managed types
pub const TABLE_TYPE: u8 = 0x02;
/// Table id for methods
pub const TABLE_METHOD: u8 = 0x06;
/// Table id for properties
pub const TABLE_PROPERTY: u8 = 0x17;
/// Highest row index a token can carry
pub const MAX_ROW: u32 = 0x00FF_FFFF;

/// A token identifying one member of the type model (a type, a method or a property).
///
/// Tokens consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table the member lives in
/// - The low 24 bits (bits 0-23) indicate the row index within that table
///
/// Tokens are handed out by a [`crate::typesystem::TypeRegistry`] and are unique within it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table id and a row index
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & MAX_ROW))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & MAX_ROW
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_from_parts() {
        let token = Token::from_parts(TABLE_METHOD, 5);
        assert_eq!(token.value(), 0x06000005);
        assert_eq!(token.table(), TABLE_METHOD);
        assert_eq!(token.row(), 5);
    }

    #[test]
    fn test_token_row_is_truncated() {
        let token = Token::from_parts(TABLE_TYPE, 0x0100_0001);
        assert_eq!(token.table(), TABLE_TYPE);
        assert_eq!(token.row(), 1);
    }

    #[test]
    fn test_token_is_null() {
        assert!(Token(0).is_null());
        assert!(!Token::from_parts(TABLE_PROPERTY, 1).is_null());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(format!("{}", Token(0x06000001)), "0x06000001");
        assert_eq!(format!("{}", Token(0)), "0x00000000");
    }

    #[test]
    fn test_token_debug() {
        let debug_str = format!("{:?}", Token(0x06000001));
        assert!(debug_str.contains("Token(0x06000001"));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_conversion_and_hash() {
        let token: Token = 0x02000003u32.into();
        let raw: u32 = token.into();
        assert_eq!(raw, 0x02000003);

        let mut set = HashSet::new();
        set.insert(token);
        set.insert(Token(0x02000003));
        assert_eq!(set.len(), 1);
    }
}
