//! Cross-module MapReduce scenarios (spec.md §8).

use std::collections::HashMap;
use std::sync::Arc;

use partk::mapreduce::{ContainerDataset, Mapper, Record, RecordSink, Reducer, Specification, UserData, run_computation};

struct SplitWordsMapper;
impl Mapper for SplitWordsMapper {
    fn map(&mut self, _key: &[u8], value: &[u8], _user_data: Option<&UserData>, sink: &mut RecordSink) {
        for word in String::from_utf8_lossy(value).split_whitespace() {
            sink.emit_intermediate(word.as_bytes().to_vec(), b"1".to_vec());
        }
    }
}

struct SumReducer;
impl Reducer for SumReducer {
    fn reduce(&mut self, key: &[u8], values: &[Vec<u8>], _user_data: Option<&UserData>, sink: &mut RecordSink) {
        sink.emit(key.to_vec(), values.len().to_string());
    }
}

fn register(mapper_name: &str, reducer_name: &str) {
    partk::mapreduce::registry::register_mapper(mapper_name, || Box::new(SplitWordsMapper));
    partk::mapreduce::registry::register_reducer(reducer_name, || Box::new(SumReducer));
}

#[test]
fn word_count_scenario_matches_expected_multiset() {
    register(
        "mapreduce_scenarios::word_count_mapper",
        "mapreduce_scenarios::word_count_reducer",
    );
    let dataset = ContainerDataset::new(vec![
        Record::new("0", "the cat sat"),
        Record::new("1", "the mat sat"),
    ]);
    let spec = Specification::new()
        .with_mapper("mapreduce_scenarios::word_count_mapper")
        .unwrap()
        .with_reducer("mapreduce_scenarios::word_count_reducer")
        .unwrap()
        .with_mapper_count(3)
        .unwrap()
        .with_reducer_count(2)
        .unwrap()
        .with_dataset(Arc::new(dataset));

    let results = run_computation(&spec).unwrap();
    let mut counts: HashMap<String, String> = HashMap::new();
    for record in results {
        counts.insert(
            String::from_utf8(record.key).unwrap(),
            String::from_utf8(record.value).unwrap(),
        );
    }
    let expected: HashMap<String, String> = [
        ("the".to_string(), "2".to_string()),
        ("cat".to_string(), "1".to_string()),
        ("sat".to_string(), "2".to_string()),
        ("mat".to_string(), "1".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(counts, expected);
}

#[test]
fn output_keys_form_contiguous_runs_within_a_reducer_bucket() {
    register(
        "mapreduce_scenarios::contiguity_mapper",
        "mapreduce_scenarios::contiguity_reducer",
    );
    let sentences: Vec<Record> = (0..50)
        .map(|i| Record::new(i.to_string(), "alpha beta gamma alpha beta"))
        .collect();
    let dataset = ContainerDataset::new(sentences);
    let spec = Specification::new()
        .with_mapper("mapreduce_scenarios::contiguity_mapper")
        .unwrap()
        .with_reducer("mapreduce_scenarios::contiguity_reducer")
        .unwrap()
        .with_mapper_count(4)
        .unwrap()
        .with_reducer_count(3)
        .unwrap()
        .with_dataset(Arc::new(dataset));

    let results = run_computation(&spec).unwrap();
    // Every word appears exactly once across every bucket (one reducer
    // task per key, since a key can only land in one partition).
    let mut seen = std::collections::HashSet::new();
    for record in &results {
        assert!(seen.insert(record.key.clone()), "key emitted more than once");
    }
    assert_eq!(seen.len(), 3);
}

#[test]
fn invalid_specification_without_dataset_fails() {
    register(
        "mapreduce_scenarios::unused_mapper",
        "mapreduce_scenarios::unused_reducer",
    );
    let spec = Specification::new()
        .with_mapper("mapreduce_scenarios::unused_mapper")
        .unwrap()
        .with_reducer("mapreduce_scenarios::unused_reducer")
        .unwrap();
    assert!(matches!(
        run_computation(&spec),
        Err(partk::Error::InvalidSpecification(_))
    ));
}
