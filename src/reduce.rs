use crate::{CounterObservation, ReduceError, is_gather_scatter};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

/// Picoseconds per second, SST runs with a 1ps timebase
pub const PS_PER_SECOND: f64 = 1.0e12;

/// Transition of the per-configuration state machine triggered by a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Bytes written during the configuration
    ByteCounter,
    /// Cycles spent in the configuration
    CycleCounter,
    /// End of the configuration, carries its time in picoseconds
    BoundaryCounter,
}

/// Counter names that drive the reducer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterNames {
    pub bytes: String,
    pub cycles: String,
    pub boundary: String,
}

impl Default for CounterNames {
    fn default() -> Self {
        Self {
            bytes: "total_bytes_write".to_string(),
            cycles: "cycles".to_string(),
            boundary: "config_time".to_string(),
        }
    }
}

impl CounterNames {
    pub fn classify(&self, name: &str) -> Option<Transition> {
        let name = name.trim();
        if name == self.bytes {
            Some(Transition::ByteCounter)
        } else if name == self.cycles {
            Some(Transition::CycleCounter)
        } else if name == self.boundary {
            Some(Transition::BoundaryCounter)
        } else {
            None
        }
    }
}

/// How the boundary counter value maps to a configuration's elapsed time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingConvention {
    /// The value already is the elapsed time of this configuration
    #[default]
    PerConfig,
    /// The value is an absolute clock, the previous boundary is subtracted
    Cumulative,
}

#[derive(Debug, Clone, Default)]
pub struct ReduceOptions {
    pub counter_names: CounterNames,
    pub timing: TimingConvention,
}

/// Metrics of one completed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub config: usize,
    pub bytes: u64,
    pub time_seconds: f64,
    pub bandwidth_mbps: f64,
    pub cycles: u64,
}

/// MB/s for `bytes` moved in `seconds`; zero for non-positive durations
pub fn bandwidth_mbps(bytes: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        (bytes as f64 / 1.0e6) / seconds
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    byte_count: u64,
    cycle_count: u64,
}

/// Single-pass segmentation of a counter stream into configurations
///
/// The stream carries no configuration keys: every counter belongs to the
/// configuration in progress, and the boundary counter closes it.
#[derive(Debug)]
pub struct Reducer<'a> {
    kernels: &'a [String],
    options: ReduceOptions,
    config_index: usize,
    accumulator: Accumulator,
    // end of the previous configuration in ps, only used for cumulative timing
    previous_end: u64,
}

impl<'a> Reducer<'a> {
    pub fn new(kernels: &'a [String], options: ReduceOptions) -> Self {
        Self {
            kernels,
            options,
            config_index: 0,
            accumulator: Accumulator::default(),
            previous_end: 0,
        }
    }

    /// Number of configurations completed so far
    pub fn completed(&self) -> usize {
        self.config_index
    }

    fn kernel(&self) -> Result<&str, ReduceError> {
        self.kernels
            .get(self.config_index)
            .map(String::as_str)
            .ok_or(ReduceError::KernelIndex {
                index: self.config_index,
                len: self.kernels.len(),
            })
    }

    /// Feed one observation, returns the row when it closes a configuration
    pub fn observe(
        &mut self,
        observation: &CounterObservation,
    ) -> Result<Option<OutputRow>, ReduceError> {
        let value = observation.value;
        match self.options.counter_names.classify(&observation.name) {
            Some(Transition::ByteCounter) => {
                // must use the index of the configuration still in progress
                self.accumulator.byte_count = if is_gather_scatter(self.kernel()?) {
                    value.checked_mul(2).ok_or(ReduceError::ByteOverflow {
                        index: self.config_index,
                        value,
                    })?
                } else {
                    value
                };
                Ok(None)
            }
            Some(Transition::CycleCounter) => {
                self.accumulator.cycle_count = value;
                Ok(None)
            }
            Some(Transition::BoundaryCounter) => self.close(value).map(Some),
            None => {
                trace!("Ignoring counter {}", observation.name.trim());
                Ok(None)
            }
        }
    }

    fn close(&mut self, end: u64) -> Result<OutputRow, ReduceError> {
        // a row without a kernel label means the inputs disagree
        self.kernel()?;

        let time_seconds = match self.options.timing {
            TimingConvention::PerConfig => end as f64 / PS_PER_SECOND,
            TimingConvention::Cumulative => {
                (end as f64 - self.previous_end as f64) / PS_PER_SECOND
            }
        };
        self.previous_end = end;

        let Accumulator {
            byte_count,
            cycle_count,
        } = std::mem::take(&mut self.accumulator);
        let row = OutputRow {
            config: self.config_index,
            bytes: byte_count,
            time_seconds,
            bandwidth_mbps: bandwidth_mbps(byte_count, time_seconds),
            cycles: cycle_count,
        };
        debug!("Configuration {} completed: {:?}", self.config_index, row);

        self.config_index += 1;
        Ok(row)
    }

    /// Consume the reducer, returns the number of completed configurations
    pub fn finish(self) -> usize {
        if self.config_index != self.kernels.len() {
            warn!(
                "Found {} configurations in the counters but {} patterns",
                self.config_index,
                self.kernels.len()
            );
        }
        self.config_index
    }
}

/// Reduce a whole counter stream, calling `on_row` as each row completes
pub fn reduce_with<F: FnMut(&OutputRow)>(
    observations: &[CounterObservation],
    kernels: &[String],
    options: ReduceOptions,
    mut on_row: F,
) -> Result<Vec<OutputRow>, ReduceError> {
    let mut reducer = Reducer::new(kernels, options);
    let rows = observations
        .iter()
        .try_fold(vec![], |mut rows, observation| {
            if let Some(row) = reducer.observe(observation)? {
                on_row(&row);
                rows.push(row);
            }
            Ok::<_, ReduceError>(rows)
        })?;
    reducer.finish();
    Ok(rows)
}

pub fn reduce(
    observations: &[CounterObservation],
    kernels: &[String],
    options: ReduceOptions,
) -> Result<Vec<OutputRow>, ReduceError> {
    reduce_with(observations, kernels, options, |_| {})
}
