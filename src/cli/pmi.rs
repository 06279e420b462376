//! Normalized pointwise mutual information between adjacent word pairs, the
//! worked example from `original_source/mapreduce/examples/pmi`. Two
//! MapReduce passes: the first counts single-word frequencies, the second
//! counts pair frequencies and turns them into NPMI scores using the first
//! pass's output as user data — the specification's sole worked example of
//! the user-data side channel (spec.md §4.5).

use std::collections::HashMap;

use crate::mapreduce::{Mapper, RecordSink, Reducer, UserData};

pub const WORD_COUNT_MAPPER_NAME: &str = "pmi.word_count_mapper";
pub const WORD_COUNT_REDUCER_NAME: &str = "pmi.word_count_reducer";
pub const PAIR_MAPPER_NAME: &str = "pmi.pair_mapper";
pub const PAIR_REDUCER_NAME: &str = "pmi.pair_reducer";

/// User data for [`PairReducer`]: single-word counts from the first pass
/// plus the total number of sentences in the dataset.
pub struct PmiContext {
    pub word_counts: HashMap<String, u64>,
    pub sentence_count: u64,
}

#[derive(Default)]
pub struct WordCountMapper;

impl Mapper for WordCountMapper {
    fn map(&mut self, _key: &[u8], value: &[u8], _user_data: Option<&UserData>, sink: &mut RecordSink) {
        let text = String::from_utf8_lossy(value);
        for word in text.split_whitespace() {
            sink.emit_intermediate(word.to_lowercase().into_bytes(), b"1".to_vec());
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

#[derive(Default)]
pub struct PairMapper;

impl Mapper for PairMapper {
    fn map(&mut self, _key: &[u8], value: &[u8], _user_data: Option<&UserData>, sink: &mut RecordSink) {
        let text = String::from_utf8_lossy(value);
        let words: Vec<String> = text.split_whitespace().map(|w| w.to_lowercase()).collect();
        for pair in words.windows(2) {
            let key = format!("{} {}", pair[0], pair[1]);
            sink.emit_intermediate(key.into_bytes(), b"1".to_vec());
        }
    }
}

#[derive(Default)]
pub struct PairReducer;

impl Reducer for PairReducer {
    fn reduce(
        &mut self,
        key: &[u8],
        values: &[Vec<u8>],
        user_data: Option<&UserData>,
        sink: &mut RecordSink,
    ) {
        let context = user_data
            .and_then(|data| data.downcast_ref::<PmiContext>())
            .expect("pmi.pair_reducer requires a PmiContext user-data value");

        let occurrences: u64 = values
            .iter()
            .filter_map(|v| std::str::from_utf8(v).ok()?.parse::<u64>().ok())
            .sum();

        let key_str = String::from_utf8_lossy(key);
        let mut words = key_str.split_whitespace();
        let first = words.next().unwrap_or_default();
        let second = words.next().unwrap_or_default();

        let total = context.sentence_count as f64;
        let joint_prob = occurrences as f64 / total;
        let first_prob = *context.word_counts.get(first).unwrap_or(&0) as f64 / total;
        let second_prob = *context.word_counts.get(second).unwrap_or(&0) as f64 / total;
        let pmi = (joint_prob / (first_prob * second_prob)).log10();
        let npmi = pmi / -joint_prob.log10();
        sink.emit(key.to_vec(), npmi.to_string());
    }
}

pub fn register() {
    crate::mapreduce::registry::register_mapper(WORD_COUNT_MAPPER_NAME, || Box::new(WordCountMapper));
    crate::mapreduce::registry::register_reducer(WORD_COUNT_REDUCER_NAME, || Box::new(WordCountReducer));
    crate::mapreduce::registry::register_mapper(PAIR_MAPPER_NAME, || Box::new(PairMapper));
    crate::mapreduce::registry::register_reducer(PAIR_REDUCER_NAME, || Box::new(PairReducer));
}
