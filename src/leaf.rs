//! Leaf encoding for allow-list trees.
//!
//! A tree is built from unhashed leaves. A leaf is either a bare address or a
//! row of values encoded against a leaf type descriptor such as
//! `["address", "uint256", "uint256"]`, with either standard ABI encoding
//! (32-byte words) or Solidity packed encoding.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    primitives::{Address, Bytes},
};
use thiserror::Error;

const ADDRESS_TYPE: &str = "address";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LeafEncoding {
    /// Raw 20-byte addresses, no descriptor.
    Address,
    /// `abi.encode`
    Abi,
    /// `abi.encodePacked`
    Packed,
}

impl LeafEncoding {
    pub fn is_packed(&self) -> bool {
        !matches!(self, LeafEncoding::Abi)
    }
}

#[derive(Debug, Error)]
pub enum LeafError {
    #[error("Invalid leaf type {ty}: {source}")]
    InvalidType {
        ty: String,
        source: alloy::dyn_abi::Error,
    },
    #[error("Expected {expected} values, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("Value {index} does not match type {ty}")]
    TypeMismatch { index: usize, ty: String },
    #[error("Cannot coerce {value:?} to {ty}: {source}")]
    Coerce {
        value: String,
        ty: String,
        source: alloy::dyn_abi::Error,
    },
    #[error("Address leaves require an `address` descriptor, found {0:?}")]
    NotAnAddressDescriptor(Vec<String>),
}

/// The unhashed leaves of a tree together with how they were encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSet {
    unhashed_leaves: Vec<Bytes>,
    leaf_type_descriptor: Vec<String>,
    encoding: LeafEncoding,
}

impl LeafSet {
    pub fn addresses(addresses: impl IntoIterator<Item = Address>) -> Self {
        let unhashed_leaves = addresses
            .into_iter()
            .map(|a| Bytes::copy_from_slice(a.as_slice()))
            .collect();

        Self {
            unhashed_leaves,
            leaf_type_descriptor: Vec::new(),
            encoding: LeafEncoding::Address,
        }
    }

    /// Encodes each row against `descriptor`.
    pub fn typed<S: AsRef<str>>(
        descriptor: &[S],
        rows: &[Vec<DynSolValue>],
        encoding: LeafEncoding,
    ) -> Result<Self, LeafError> {
        let types = parse_descriptor(descriptor)?;
        let leaf_type_descriptor: Vec<String> =
            descriptor.iter().map(|s| s.as_ref().to_string()).collect();

        if encoding == LeafEncoding::Address && leaf_type_descriptor != [ADDRESS_TYPE] {
            return Err(LeafError::NotAnAddressDescriptor(leaf_type_descriptor));
        }

        let unhashed_leaves = rows
            .iter()
            .map(|row| encode_leaf(&types, row, encoding))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            unhashed_leaves,
            leaf_type_descriptor,
            encoding,
        })
    }

    /// Like [`LeafSet::typed`], with values given as strings and coerced to
    /// the declared types.
    pub fn typed_from_strings<S: AsRef<str>, V: AsRef<str>>(
        descriptor: &[S],
        rows: &[Vec<V>],
        encoding: LeafEncoding,
    ) -> Result<Self, LeafError> {
        let types = parse_descriptor(descriptor)?;

        let rows = rows
            .iter()
            .map(|row| {
                if row.len() != types.len() {
                    return Err(LeafError::Arity {
                        expected: types.len(),
                        found: row.len(),
                    });
                }

                types
                    .iter()
                    .zip(row)
                    .map(|(ty, value)| {
                        ty.coerce_str(value.as_ref())
                            .map_err(|source| LeafError::Coerce {
                                value: value.as_ref().to_string(),
                                ty: ty.sol_type_name().into_owned(),
                                source,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::typed(descriptor, &rows, encoding)
    }

    pub fn unhashed_leaves(&self) -> &[Bytes] {
        &self.unhashed_leaves
    }

    pub fn leaf_type_descriptor(&self) -> &[String] {
        &self.leaf_type_descriptor
    }

    pub fn encoding(&self) -> LeafEncoding {
        self.encoding
    }

    pub fn packed_encoding(&self) -> bool {
        self.encoding.is_packed()
    }

    pub fn len(&self) -> usize {
        self.unhashed_leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unhashed_leaves.is_empty()
    }

    /// The address carried by the leaf at `index`, if any.
    pub fn address_at(&self, index: usize) -> Option<Address> {
        let leaf = self.unhashed_leaves.get(index)?;
        leaf_to_address(leaf, &self.leaf_type_descriptor, self.packed_encoding())
    }
}

pub fn parse_descriptor<S: AsRef<str>>(descriptor: &[S]) -> Result<Vec<DynSolType>, LeafError> {
    descriptor
        .iter()
        .map(|d| {
            DynSolType::parse(d.as_ref()).map_err(|source| LeafError::InvalidType {
                ty: d.as_ref().to_string(),
                source,
            })
        })
        .collect()
}

pub fn encode_leaf(
    types: &[DynSolType],
    values: &[DynSolValue],
    encoding: LeafEncoding,
) -> Result<Bytes, LeafError> {
    if types.len() != values.len() {
        return Err(LeafError::Arity {
            expected: types.len(),
            found: values.len(),
        });
    }

    for (index, (ty, value)) in types.iter().zip(values).enumerate() {
        if !value.matches(ty) {
            return Err(LeafError::TypeMismatch {
                index,
                ty: ty.sol_type_name().into_owned(),
            });
        }
    }

    let tuple = DynSolValue::Tuple(values.to_vec());
    let encoded = match encoding {
        LeafEncoding::Abi => tuple.abi_encode_params(),
        LeafEncoding::Packed | LeafEncoding::Address => tuple.abi_encode_packed(),
    };

    Ok(encoded.into())
}

/// Recovers the allow-listed address from an unhashed leaf.
///
/// With ABI encoding the address word follows the head words of every earlier
/// type. With packed encoding it follows their packed widths. Returns `None`
/// when the descriptor has no address, a type before the address has no fixed
/// packed width, or the leaf is too short.
pub fn leaf_to_address<S: AsRef<str>>(
    leaf: &[u8],
    descriptor: &[S],
    packed: bool,
) -> Option<Address> {
    if descriptor.is_empty() || (descriptor.len() == 1 && descriptor[0].as_ref() == ADDRESS_TYPE) {
        return Some(bytes_to_address(leaf));
    }

    let position = descriptor.iter().position(|d| d.as_ref() == ADDRESS_TYPE)?;

    if packed {
        let mut start = 0;
        for desc in &descriptor[..position] {
            let ty = DynSolType::parse(desc.as_ref()).ok()?;
            start += packed_width(&ty)?;
        }
        leaf.get(start..start + 20).map(Address::from_slice)
    } else {
        let mut start = 0;
        for desc in &descriptor[..position] {
            let ty = DynSolType::parse(desc.as_ref()).ok()?;
            start += abi_head_width(&ty);
        }
        leaf.get(start..start + 32)
            .map(|word| Address::from_slice(&word[12..]))
    }
}

/// Bytes a type occupies in the head of a standard ABI tuple encoding.
///
/// Dynamic types leave a single offset word. Static arrays and tuples are
/// encoded in place.
fn abi_head_width(ty: &DynSolType) -> usize {
    if ty.is_dynamic() {
        return 32;
    }
    match ty {
        DynSolType::FixedArray(inner, len) => len * abi_head_width(inner),
        DynSolType::Tuple(types) => types.iter().map(abi_head_width).sum(),
        _ => 32,
    }
}

/// Width of a static type under `abi.encodePacked`.
fn packed_width(ty: &DynSolType) -> Option<usize> {
    match ty {
        DynSolType::Address => Some(20),
        DynSolType::Bool => Some(1),
        DynSolType::Int(bits) | DynSolType::Uint(bits) => Some(bits / 8),
        DynSolType::FixedBytes(size) => Some(*size),
        DynSolType::Function => Some(24),
        _ => None,
    }
}

/// Right-aligned conversion: keeps the last 20 bytes, left-pads shorter input.
fn bytes_to_address(bytes: &[u8]) -> Address {
    let mut out = [0u8; 20];
    if bytes.len() >= 20 {
        out.copy_from_slice(&bytes[bytes.len() - 20..]);
    } else {
        out[20 - bytes.len()..].copy_from_slice(bytes);
    }
    Address::from(out)
}

/// `0x000…0n` as an address.
pub fn num_to_address(n: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    Address::from(bytes)
}
