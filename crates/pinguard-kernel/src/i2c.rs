//! 7-bit I2C address classification.
//!
//! Rules are applied in this order, first match wins:
//!
//! | Address | Class |
//! |---|---|
//! | `< 0` | [`AddressFault::Negative`] |
//! | `0x00` | [`AddressFault::ReservedGeneralCall`] |
//! | `0x78..=0x7F` | [`AddressFault::ReservedExtendedAddressing`] |
//! | `> 0x7F` | [`AddressFault::OutOfRange`] |
//! | otherwise | [`AddressClass::Valid`] |

use std::fmt;
use std::ops::RangeInclusive;

use pinguard_types::RejectReason;

/// General-call address; every target on the bus listens to it.
pub const GENERAL_CALL_ADDRESS: i16 = 0x00;

/// Prefix block reserved for 10-bit addressing.
pub const EXTENDED_ADDRESSING: RangeInclusive<i16> = 0x78..=0x7F;

/// Highest address in the 7-bit space.
pub const MAX_7BIT_ADDRESS: i16 = 0x7F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFault {
    Negative,
    ReservedGeneralCall,
    ReservedExtendedAddressing,
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressClass {
    Valid,
    Invalid(AddressFault),
}

impl AddressClass {
    pub fn is_valid(&self) -> bool {
        matches!(self, AddressClass::Valid)
    }
}

impl fmt::Display for AddressFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFault::Negative => write!(f, "negative"),
            AddressFault::ReservedGeneralCall => write!(f, "the reserved general-call address"),
            AddressFault::ReservedExtendedAddressing => write!(f, "reserved for 10-bit addressing"),
            AddressFault::OutOfRange => write!(f, "outside the 7-bit address space"),
        }
    }
}

impl From<AddressFault> for RejectReason {
    fn from(fault: AddressFault) -> Self {
        match fault {
            AddressFault::Negative => RejectReason::I2cAddressNegative,
            AddressFault::ReservedGeneralCall => RejectReason::I2cAddressReservedGeneralCall,
            AddressFault::ReservedExtendedAddressing => RejectReason::I2cAddressReservedExtended,
            AddressFault::OutOfRange => RejectReason::I2cAddressOutOfRange,
        }
    }
}

/// Classify a candidate bus address.
///
/// ```
/// use pinguard_kernel::i2c::{classify, AddressClass, AddressFault};
///
/// assert_eq!(classify(0x3C), AddressClass::Valid);
/// assert_eq!(classify(0x00), AddressClass::Invalid(AddressFault::ReservedGeneralCall));
/// assert_eq!(classify(0x7A), AddressClass::Invalid(AddressFault::ReservedExtendedAddressing));
/// ```
pub fn classify(address: i16) -> AddressClass {
    let fault = if address < 0 {
        AddressFault::Negative
    } else if address == GENERAL_CALL_ADDRESS {
        AddressFault::ReservedGeneralCall
    } else if EXTENDED_ADDRESSING.contains(&address) {
        AddressFault::ReservedExtendedAddressing
    } else if address > MAX_7BIT_ADDRESS {
        AddressFault::OutOfRange
    } else {
        return AddressClass::Valid;
    };
    AddressClass::Invalid(fault)
}
