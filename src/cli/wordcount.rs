//! Word count, the worked example from `original_source/mapreduce/examples/
//! wordcount`: emits `(word, "1")` per token, reduces by summing.

use crate::mapreduce::{Mapper, RecordSink, Reducer, UserData};

pub const MAPPER_NAME: &str = "wordcount.mapper";
pub const REDUCER_NAME: &str = "wordcount.reducer";

#[derive(Default)]
pub struct WordCountMapper;

impl Mapper for WordCountMapper {
    fn map(&mut self, _key: &[u8], value: &[u8], _user_data: Option<&UserData>, sink: &mut RecordSink) {
        let text = String::from_utf8_lossy(value);
        for word in text.split_whitespace() {
            sink.emit_intermediate(word.as_bytes().to_vec(), b"1".to_vec());
        }
    }
}

#[derive(Default)]
pub struct WordCountReducer;

impl Reducer for WordCountReducer {
    fn reduce(
        &mut self,
        key: &[u8],
        values: &[Vec<u8>],
        _user_data: Option<&UserData>,
        sink: &mut RecordSink,
    ) {
        let total: u64 = values
            .iter()
            .filter_map(|v| std::str::from_utf8(v).ok()?.parse::<u64>().ok())
            .sum();
        sink.emit(key.to_vec(), total.to_string());
    }
}

pub fn register() {
    crate::mapreduce::registry::register_mapper(MAPPER_NAME, || Box::new(WordCountMapper));
    crate::mapreduce::registry::register_reducer(REDUCER_NAME, || Box::new(WordCountReducer));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapper_splits_on_whitespace() {
        let mut mapper = WordCountMapper;
        let mut sink = RecordSink::new();
        mapper.map(b"0", b"the cat sat", None, &mut sink);
        let records = sink.into_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].key, b"the");
        assert_eq!(records[0].value, b"1");
    }

    #[test]
    fn reducer_sums_counts() {
        let mut reducer = WordCountReducer;
        let mut sink = RecordSink::new();
        reducer.reduce(b"the", &[b"1".to_vec(), b"1".to_vec()], None, &mut sink);
        let records = sink.into_records();
        assert_eq!(records[0].value, b"2");
    }
}
