//! Inverted index, the worked example from `original_source/mapreduce/
//! examples/inverted_index`: emits `(word, sentence_id)` per token, reduces
//! by joining the sentence ids that contain each word.

use crate::mapreduce::{Mapper, RecordSink, Reducer, UserData};

pub const MAPPER_NAME: &str = "inverted_index.mapper";
pub const REDUCER_NAME: &str = "inverted_index.reducer";

#[derive(Default)]
pub struct InvertedIndexMapper;

impl Mapper for InvertedIndexMapper {
    fn map(&mut self, key: &[u8], value: &[u8], _user_data: Option<&UserData>, sink: &mut RecordSink) {
        let text = String::from_utf8_lossy(value);
        for word in text.split_whitespace() {
            sink.emit_intermediate(word.as_bytes().to_vec(), key.to_vec());
        }
    }
}

#[derive(Default)]
pub struct InvertedIndexReducer;

impl Reducer for InvertedIndexReducer {
    fn reduce(
        &mut self,
        key: &[u8],
        values: &[Vec<u8>],
        _user_data: Option<&UserData>,
        sink: &mut RecordSink,
    ) {
        let joined = values
            .iter()
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        sink.emit(key.to_vec(), joined);
    }
}

pub fn register() {
    crate::mapreduce::registry::register_mapper(MAPPER_NAME, || Box::new(InvertedIndexMapper));
    crate::mapreduce::registry::register_reducer(REDUCER_NAME, || Box::new(InvertedIndexReducer));
}
