//! Samples parsed from recommender output

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One invocation's metric values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// 0-based iteration that produced this sample
    pub iteration: usize,
    pub metrics: BTreeMap<String, f64>,
    /// Wall-clock time of the invocation as seen by the runner.
    /// Diagnostic only; never summarized.
    #[serde(with = "serde_duration")]
    pub wall_time: Duration,
}

impl Sample {
    /// Parse one invocation's stdout.
    ///
    /// The output must be a single JSON object carrying every `required`
    /// metric as a number. Other numeric top-level fields are kept as extra
    /// metrics; anything else is ignored.
    pub fn parse(
        iteration: usize,
        stdout: &[u8],
        required: &[String],
        wall_time: Duration,
    ) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(stdout).map_err(|_| ParseError::NotUtf8)?;
        let value: serde_json::Value = serde_json::from_str(text.trim())
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        let object = value.as_object().ok_or(ParseError::NotAnObject)?;

        let mut metrics = BTreeMap::new();
        for name in required {
            let field = object
                .get(name)
                .ok_or_else(|| ParseError::MissingMetric(name.clone()))?;
            let number = field
                .as_f64()
                .ok_or_else(|| ParseError::NonNumeric(name.clone()))?;
            metrics.insert(name.clone(), number);
        }

        for (name, field) in object {
            if metrics.contains_key(name) {
                continue;
            }
            if let Some(number) = field.as_f64() {
                metrics.insert(name.clone(), number);
            }
        }

        Ok(Self {
            iteration,
            metrics,
            wall_time,
        })
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied()
    }
}

/// Ordered samples of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<Sample>,
    attempted: usize,
    dropped: usize,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully parsed iteration
    pub fn push(&mut self, sample: Sample) {
        self.attempted += 1;
        self.samples.push(sample);
    }

    /// Record an iteration whose output was rejected
    pub fn record_dropped(&mut self) {
        self.attempted += 1;
        self.dropped += 1;
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterations that reached the parse step
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Values of one metric in iteration order
    pub fn values(&self, metric: &str) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.get(metric)).collect()
    }

    /// Every metric name seen in at least one sample
    pub fn metric_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .samples
            .iter()
            .flat_map(|s| s.metrics.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Metric name to ordered values
    pub fn by_metric(&self) -> BTreeMap<String, Vec<f64>> {
        let mut out: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for sample in &self.samples {
            for (name, value) in &sample.metrics {
                out.entry(name.clone()).or_default().push(*value);
            }
        }
        out
    }
}

mod serde_duration {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<String> {
        vec![
            "query_time".to_string(),
            "memory_usage".to_string(),
            "groq_latency".to_string(),
        ]
    }

    fn parse(output: &str) -> Result<Sample, ParseError> {
        Sample::parse(0, output.as_bytes(), &required(), Duration::from_millis(3))
    }

    #[test]
    fn test_parse_well_formed_output() {
        let sample = parse("{\"query_time\": 10, \"memory_usage\": 5, \"groq_latency\": 2}\n").unwrap();
        assert_eq!(sample.get("query_time"), Some(10.0));
        assert_eq!(sample.get("memory_usage"), Some(5.0));
        assert_eq!(sample.get("groq_latency"), Some(2.0));
        assert_eq!(sample.metrics.len(), 3);
    }

    #[test]
    fn test_parse_keeps_extra_numeric_fields() {
        let sample = parse(
            r#"{"query_time": 1.5, "memory_usage": 5, "groq_latency": 2, "rerank_time": 0.25, "model": "bge"}"#,
        )
        .unwrap();
        assert_eq!(sample.get("rerank_time"), Some(0.25));
        assert_eq!(sample.get("model"), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse("Loading index..."), Err(ParseError::InvalidJson(_))));
        assert!(matches!(parse(""), Err(ParseError::InvalidJson(_))));
        assert_eq!(parse("[1, 2]"), Err(ParseError::NotAnObject));
    }

    #[test]
    fn test_parse_rejects_missing_or_non_numeric_metric() {
        assert_eq!(
            parse(r#"{"query_time": 1, "memory_usage": 5}"#),
            Err(ParseError::MissingMetric("groq_latency".to_string()))
        );
        assert_eq!(
            parse(r#"{"query_time": "fast", "memory_usage": 5, "groq_latency": 2}"#),
            Err(ParseError::NonNumeric("query_time".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        let result = Sample::parse(0, &[0xff, 0xfe, b'{'], &required(), Duration::ZERO);
        assert_eq!(result, Err(ParseError::NotUtf8));
    }

    #[test]
    fn test_sample_set_counters_and_views() {
        let mut set = SampleSet::new();
        set.push(Sample::parse(0, br#"{"query_time": 1, "memory_usage": 5, "groq_latency": 2}"#, &required(), Duration::ZERO).unwrap());
        set.record_dropped();
        set.push(Sample::parse(2, br#"{"query_time": 3, "memory_usage": 6, "groq_latency": 4, "cache_hits": 1}"#, &required(), Duration::ZERO).unwrap());

        assert_eq!(set.len(), 2);
        assert_eq!(set.attempted(), 3);
        assert_eq!(set.dropped(), 1);
        assert_eq!(set.values("query_time"), vec![1.0, 3.0]);
        assert_eq!(set.values("cache_hits"), vec![1.0]);
        assert_eq!(
            set.metric_names(),
            vec!["cache_hits", "groq_latency", "memory_usage", "query_time"]
        );
        assert_eq!(set.by_metric()["memory_usage"], vec![5.0, 6.0]);
    }

    #[test]
    fn test_wall_time_deserialization_rejects_invalid_seconds() {
        let sample: Sample = serde_json::from_str(
            r#"{"iteration": 1, "metrics": {"query_time": 2.0}, "wall_time": 0.5}"#,
        )
        .unwrap();
        assert_eq!(sample.wall_time, Duration::from_millis(500));

        let negative = serde_json::from_str::<Sample>(
            r#"{"iteration": 1, "metrics": {}, "wall_time": -1.0}"#,
        );
        assert!(negative.is_err());
    }
}
