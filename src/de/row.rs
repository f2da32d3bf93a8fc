use serde::{
    de::{value::BytesDeserializer, DeserializeSeed, MapAccess, SeqAccess, Visitor},
    Deserializer,
};

use crate::{de::val_reader::ScalarReader, PlyError, PropertyDef, PropertyType, ScalarType};

/// Deserializes one PLY row as a map of property name to value, in header
/// order. Properties the target type does not ask for are still consumed.
pub(crate) struct RowDeserializer<'a, S: ScalarReader> {
    pub val_reader: &'a mut S,
    pub properties: &'a [PropertyDef],
}

impl<'de, S: ScalarReader> Deserializer<'de> for RowDeserializer<'_, S> {
    type Error = PlyError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(RowMapAccess {
            val_reader: self.val_reader,
            properties: self.properties,
            current_property: 0,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 i64 u64 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct enum identifier ignored_any
    }
}

struct RowMapAccess<'a, S: ScalarReader> {
    val_reader: &'a mut S,
    properties: &'a [PropertyDef],
    current_property: usize,
}

impl<'de, S: ScalarReader> MapAccess<'de> for RowMapAccess<'_, S> {
    type Error = PlyError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        let Some(prop) = self.properties.get(self.current_property) else {
            return Ok(None);
        };
        seed.deserialize(BytesDeserializer::<PlyError>::new(prop.name.as_bytes()))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let prop = self
            .properties
            .get(self.current_property)
            .ok_or(PlyError::TooManyProperties)?;
        self.current_property += 1;

        seed.deserialize(ValueDeserializer {
            val_reader: &mut *self.val_reader,
            prop: &prop.property_type,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.properties.len() - self.current_property)
    }
}

struct ValueDeserializer<'a, S: ScalarReader> {
    val_reader: &'a mut S,
    prop: &'a PropertyType,
}

impl<'de, S: ScalarReader> Deserializer<'de> for ValueDeserializer<'_, S> {
    type Error = PlyError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.prop {
            PropertyType::Scalar { data_type } => visit_scalar(self.val_reader, *data_type, visitor),
            PropertyType::List { .. } => self.deserialize_seq(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // PLY properties are always present if defined in header
        visitor.visit_some(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let PropertyType::List {
            count_type,
            data_type,
        } = self.prop
        else {
            return Err(PlyError::ExpectedListProperty);
        };

        let count = read_count(self.val_reader, *count_type)?;

        visitor.visit_seq(ListSeqAccess {
            val_reader: self.val_reader,
            remaining: count,
            data_type: *data_type,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 f32 f64 i128 i64 u128 u64 char str string
        bytes byte_buf unit unit_struct newtype_struct tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

fn read_count<S: ScalarReader>(val_reader: &mut S, count_type: ScalarType) -> Result<usize, PlyError> {
    let count = match count_type {
        ScalarType::I8 => i64::from(val_reader.read_i8()?),
        ScalarType::U8 => i64::from(val_reader.read_u8()?),
        ScalarType::I16 => i64::from(val_reader.read_i16()?),
        ScalarType::U16 => i64::from(val_reader.read_u16()?),
        ScalarType::I32 => i64::from(val_reader.read_i32()?),
        ScalarType::U32 => i64::from(val_reader.read_u32()?),
        ScalarType::F32 | ScalarType::F64 => {
            return Err(PlyError::UnsupportedType(format!(
                "list count of type {}",
                count_type.name()
            )))
        }
    };
    usize::try_from(count).map_err(|_| PlyError::Serde(format!("negative list length {count}")))
}

fn visit_scalar<'de, S, V>(
    val_reader: &mut S,
    data_type: ScalarType,
    visitor: V,
) -> Result<V::Value, PlyError>
where
    S: ScalarReader,
    V: Visitor<'de>,
{
    match data_type {
        ScalarType::I8 => visitor.visit_i8(val_reader.read_i8()?),
        ScalarType::U8 => visitor.visit_u8(val_reader.read_u8()?),
        ScalarType::I16 => visitor.visit_i16(val_reader.read_i16()?),
        ScalarType::U16 => visitor.visit_u16(val_reader.read_u16()?),
        ScalarType::I32 => visitor.visit_i32(val_reader.read_i32()?),
        ScalarType::U32 => visitor.visit_u32(val_reader.read_u32()?),
        ScalarType::F32 => visitor.visit_f32(val_reader.read_f32()?),
        ScalarType::F64 => visitor.visit_f64(val_reader.read_f64()?),
    }
}

struct ListSeqAccess<'a, S> {
    val_reader: &'a mut S,
    data_type: ScalarType,
    remaining: usize,
}

impl<'de, S: ScalarReader> SeqAccess<'de> for ListSeqAccess<'_, S> {
    type Error = PlyError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        seed.deserialize(ScalarDeserializer {
            reader: &mut *self.val_reader,
            data_type: self.data_type,
        })
        .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct ScalarDeserializer<'a, S> {
    reader: &'a mut S,
    data_type: ScalarType,
}

impl<'de, S: ScalarReader> Deserializer<'de> for ScalarDeserializer<'_, S> {
    type Error = PlyError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visit_scalar(self.reader, self.data_type, visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 f32 f64 i128 i64 u128 u64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}
