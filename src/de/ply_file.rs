use std::io::BufRead;

use byteorder::{BigEndian, LittleEndian};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::trace;

use crate::de::row::RowDeserializer;
use crate::de::val_reader::{AsciiValReader, BinValReader, ScalarReader};
use crate::{ElementDef, PlyError, PlyFormat, PlyHeader};

/// Upper bound on rows reserved up front from a header count.
pub(crate) const PREALLOC_LIMIT: usize = 1 << 20;

/// Sequential cursor over the elements of a PLY stream, in file order.
pub struct PlyFileReader<R> {
    reader: R,
    header: PlyHeader,
    current_element: usize,
}

impl<R: BufRead> PlyFileReader<R> {
    pub fn new(mut reader: R) -> Result<Self, PlyError> {
        let header = PlyHeader::parse(&mut reader)?;
        Ok(Self {
            reader,
            header,
            current_element: 0,
        })
    }

    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    /// Definition of the element the next call to [`Self::next_element`] reads.
    pub fn peek_element(&self) -> Option<&ElementDef> {
        self.header.elements.get(self.current_element)
    }

    /// Reads every row of the current element as `T` and advances.
    pub fn next_element<T: DeserializeOwned>(&mut self) -> Result<Vec<T>, PlyError> {
        let Some(elem_def) = self.header.elements.get(self.current_element) else {
            return Err(PlyError::Serde("no elements left to read".to_string()));
        };
        self.current_element += 1;
        trace!(element = %elem_def.name, rows = elem_def.count, "reading element");

        match self.header.format {
            PlyFormat::Ascii => read_rows(&mut AsciiValReader::new(&mut self.reader), elem_def),
            PlyFormat::BinaryLittleEndian => read_rows(
                &mut BinValReader::<_, LittleEndian>::new(&mut self.reader),
                elem_def,
            ),
            PlyFormat::BinaryBigEndian => read_rows(
                &mut BinValReader::<_, BigEndian>::new(&mut self.reader),
                elem_def,
            ),
        }
    }

    /// Consumes the current element without keeping its rows.
    pub fn skip_element(&mut self) -> Result<(), PlyError> {
        self.next_element::<IgnoredAny>()?;
        Ok(())
    }
}

fn read_rows<T, S>(val_reader: &mut S, elem_def: &ElementDef) -> Result<Vec<T>, PlyError>
where
    T: DeserializeOwned,
    S: ScalarReader,
{
    let mut rows = Vec::with_capacity(elem_def.count.min(PREALLOC_LIMIT));
    for row in 0..elem_def.count {
        let value = T::deserialize(RowDeserializer {
            val_reader: &mut *val_reader,
            properties: &elem_def.properties,
        })
        .and_then(|value| {
            val_reader.read_row_end()?;
            Ok(value)
        })
        .map_err(|e| e.in_record(&elem_def.name, row))?;
        rows.push(value);
    }
    Ok(rows)
}
