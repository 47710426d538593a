// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rejects non-finite floats anywhere inside a value.
//!
//! `serde_json` quietly turns NaN and infinities into `null`; walking the
//! value with this serializer first lets field insertion refuse them instead.

use std::fmt::Display;

use serde::ser::{self, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum FiniteError {
    #[error("non-finite number {0}")]
    NonFinite(f64),

    #[error("{0}")]
    Custom(String),
}

impl ser::Error for FiniteError {
    fn custom<T: Display>(msg: T) -> Self {
        FiniteError::Custom(msg.to_string())
    }
}

/// Returns the first non-finite float found in `value`.
///
/// Errors raised by `value`'s own `Serialize` impl are ignored here; the
/// JSON conversion that follows reports them.
pub(crate) fn find_non_finite<T: Serialize + ?Sized>(value: &T) -> Option<f64> {
    match value.serialize(FiniteCheck) {
        Err(FiniteError::NonFinite(n)) => Some(n),
        _ => None,
    }
}

#[derive(Clone, Copy)]
struct FiniteCheck;

fn float(n: f64) -> Result<(), FiniteError> {
    if n.is_finite() {
        Ok(())
    } else {
        Err(FiniteError::NonFinite(n))
    }
}

impl Serializer for FiniteCheck {
    type Ok = ();
    type Error = FiniteError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Result<(), FiniteError> {
        float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), FiniteError> {
        float(v)
    }

    fn serialize_bool(self, _: bool) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_char(self, _: char) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), FiniteError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), FiniteError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), FiniteError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), FiniteError> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, FiniteError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, FiniteError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), FiniteError> {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FiniteError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), FiniteError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = FiniteError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), FiniteError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FiniteError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "finite_tests.rs"]
mod tests;
