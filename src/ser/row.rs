use crate::{ser::val_writer::ScalarWriter, PlyError};

use serde::{
    ser::{Impossible, SerializeSeq, SerializeStruct, SerializeTuple},
    Serialize, Serializer,
};

/// Serializes one row struct: each field is one property, in declaration
/// order. Sequences and fixed-size arrays become `uchar`-counted lists.
pub(crate) struct RowSerializer<W: ScalarWriter> {
    pub val_writer: W,
}

impl<W: ScalarWriter> RowSerializer<W> {
    pub fn new(val_writer: W) -> Self {
        Self { val_writer }
    }
}

fn not_a_row() -> PlyError {
    PlyError::UnsupportedType("PLY rows must be structs".to_string())
}

impl<'a, W: ScalarWriter> Serializer for &'a mut RowSerializer<W> {
    type Ok = ();
    type Error = PlyError;

    type SerializeSeq = Impossible<(), PlyError>;
    type SerializeTuple = Impossible<(), PlyError>;
    type SerializeTupleStruct = Impossible<(), PlyError>;
    type SerializeTupleVariant = Impossible<(), PlyError>;
    type SerializeMap = Impossible<(), PlyError>;
    type SerializeStruct = RowStructSerializer<'a, W>;
    type SerializeStructVariant = Impossible<(), PlyError>;

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_i8(self, _v: i8) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_i16(self, _v: i16) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_i32(self, _v: i32) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_i64(self, _v: i64) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_u8(self, _v: u8) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_u16(self, _v: u16) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_u32(self, _v: u32) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_u64(self, _v: u64) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_f32(self, _v: f32) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_f64(self, _v: f64) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_char(self, _v: char) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_str(self, _v: &str) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_some<T>(self, _value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(not_a_row())
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(not_a_row())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(RowStructSerializer { parent: self })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(not_a_row())
    }
}

pub(crate) struct RowStructSerializer<'a, W: ScalarWriter> {
    parent: &'a mut RowSerializer<W>,
}

impl<W: ScalarWriter> SerializeStruct for RowStructSerializer<'_, W> {
    type Ok = ();
    type Error = PlyError;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(PropertySerializer {
            val_writer: &mut self.parent.val_writer,
        })
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.parent.val_writer.write_row_end()
    }
}

struct PropertySerializer<'a, W: ScalarWriter> {
    val_writer: &'a mut W,
}

impl<W: ScalarWriter> PropertySerializer<'_, W> {
    fn unsupported(kind: &str) -> PlyError {
        PlyError::UnsupportedType(kind.to_string())
    }
}

impl<'a, W: ScalarWriter> PropertySerializer<'a, W> {
    fn start_list(self, len: usize) -> Result<ListSerializer<'a, W>, PlyError> {
        let count = u8::try_from(len).map_err(|_| {
            PlyError::UnsupportedType(format!("list of length {len} exceeds a uchar count"))
        })?;
        self.val_writer.write_u8(count)?;
        Ok(ListSerializer {
            val_writer: self.val_writer,
        })
    }
}

impl<'a, W: ScalarWriter> Serializer for PropertySerializer<'a, W> {
    type Ok = ();
    type Error = PlyError;
    type SerializeSeq = ListSerializer<'a, W>;
    type SerializeTuple = ListSerializer<'a, W>;
    type SerializeTupleStruct = Impossible<(), PlyError>;
    type SerializeTupleVariant = Impossible<(), PlyError>;
    type SerializeMap = Impossible<(), PlyError>;
    type SerializeStruct = Impossible<(), PlyError>;
    type SerializeStructVariant = Impossible<(), PlyError>;

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        self.val_writer.write_i8(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        self.val_writer.write_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        self.val_writer.write_i32(v)
    }

    fn serialize_i64(self, _v: i64) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("i64"))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        self.val_writer.write_u8(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        self.val_writer.write_u16(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        self.val_writer.write_u32(v)
    }

    fn serialize_u64(self, _v: u64) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("u64"))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        self.val_writer.write_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        self.val_writer.write_f64(v)
    }

    fn serialize_char(self, _v: char) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("char"))
    }

    fn serialize_str(self, _v: &str) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("str"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("unit_struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Err(Self::unsupported("unit_variant"))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(Self::unsupported("newtype_variant"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        let len = len.ok_or_else(|| Self::unsupported("sequence without known length"))?;
        self.start_list(len)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.start_list(len)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(Self::unsupported("tuple_struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(Self::unsupported("tuple_variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(Self::unsupported("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(Self::unsupported("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(Self::unsupported("struct_variant"))
    }
}

pub(crate) struct ListSerializer<'a, W: ScalarWriter> {
    val_writer: &'a mut W,
}

impl<W: ScalarWriter> SerializeSeq for ListSerializer<'_, W> {
    type Ok = ();
    type Error = PlyError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(PropertySerializer {
            val_writer: &mut *self.val_writer,
        })
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<W: ScalarWriter> SerializeTuple for ListSerializer<'_, W> {
    type Ok = ();
    type Error = PlyError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}
