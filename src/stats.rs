use crate::LoadError;
use log::info;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, io::Read, path::Path};

/// Column holding the counter name in an SST statistics dump
pub const NAME_COLUMN: &str = "StatisticName";
/// Column holding the accumulated counter value (`Sum.u64` before normalization)
pub const VALUE_COLUMN: &str = "Sum_u64";

/// One counter row of the statistics dump, in emission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterObservation {
    pub name: String,
    pub value: u64,
}

impl CounterObservation {
    pub fn new(name: &str, value: u64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// SST writes headers like ` Sum.u64`, normalize them to `Sum_u64`
pub fn normalize_column(name: &str) -> String {
    name.trim().replace('.', "_")
}

/// Parse an SST CSV statistics dump, keeping row order
pub fn read_stats<R: Read>(reader: R) -> Result<Vec<CounterObservation>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_column).collect();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    let name_index = column(NAME_COLUMN)?;
    let value_index = column(VALUE_COLUMN)?;

    let mut observations = vec![];
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let name = record.get(name_index).unwrap_or("").trim();
        let raw_value = record.get(value_index).unwrap_or("").trim();
        let value = raw_value
            .parse::<u64>()
            .map_err(|_| LoadError::MalformedValue {
                line,
                name: name.to_string(),
                value: raw_value.to_string(),
            })?;
        observations.push(CounterObservation::new(name, value));
    }
    Ok(observations)
}

pub fn load_stats<P: AsRef<Path>>(path: P) -> Result<Vec<CounterObservation>, LoadError> {
    let path = path.as_ref();
    let observations = read_stats(BufReader::new(File::open(path)?))?;
    info!(
        "Loaded {} counters from {}",
        observations.len(),
        path.display()
    );
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SST_DUMP: &str = "\
ComponentName, StatisticName, StatisticSubId, StatisticType, SimTime, Rank, Sum.u64, SumSQ.u64, Count.u64, Min.u64, Max.u64
cpu, total_bytes_write, , Accumulator, 1000, 0, 8192, 67108864, 1024, 8, 8
cpu, cycles, , Accumulator, 1000, 0, 3400, 11560000, 1, 3400, 3400
l1cache, CacheHits, , Accumulator, 1000, 0, 77, 77, 77, 1, 1
cpu, config_time, , Accumulator, 1000, 0, 1000000, 1000000000000, 1, 1000000, 1000000
";

    #[test]
    fn normalizes_sst_headers() {
        assert_eq!(normalize_column(" Sum.u64 "), "Sum_u64");
        assert_eq!(normalize_column("StatisticName"), "StatisticName");
    }

    #[test]
    fn reads_sst_dump_in_order() {
        let observations = read_stats(SST_DUMP.as_bytes()).unwrap();
        assert_eq!(
            observations,
            vec![
                CounterObservation::new("total_bytes_write", 8192),
                CounterObservation::new("cycles", 3400),
                CounterObservation::new("CacheHits", 77),
                CounterObservation::new("config_time", 1000000),
            ]
        );
    }

    #[test]
    fn header_only_dump_is_empty() {
        let dump = "StatisticName,Sum.u64\n";
        assert!(read_stats(dump.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn missing_value_column() {
        let dump = "StatisticName,Count.u64\ncycles,3\n";
        match read_stats(dump.as_bytes()) {
            Err(LoadError::MissingColumn(column)) => assert_eq!(column, VALUE_COLUMN),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_value_is_fatal() {
        let dump = "StatisticName,Sum.u64\ncycles,12\ncycles,lots\n";
        match read_stats(dump.as_bytes()) {
            Err(LoadError::MalformedValue { line, name, value }) => {
                assert_eq!(line, 3);
                assert_eq!(name, "cycles");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn negative_value_is_fatal() {
        let dump = "StatisticName,Sum.u64\ncycles,-1\n";
        assert!(matches!(
            read_stats(dump.as_bytes()),
            Err(LoadError::MalformedValue { .. })
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dump = "StatisticName,Sum.u64\ncycles\n";
        assert!(matches!(read_stats(dump.as_bytes()), Err(LoadError::Csv(_))));
    }
}
