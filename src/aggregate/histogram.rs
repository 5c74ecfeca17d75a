use crate::data::model::VehicleRecord;

/// A histogram interval. Upper bounds are inclusive; the last bucket is
/// unbounded above, and anything below the first bound lands in the first
/// bucket, so the buckets partition the whole number line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub label: &'static str,
    pub upper: Option<f64>,
}

impl Bucket {
    pub const fn upto(label: &'static str, upper: f64) -> Self {
        Bucket {
            label,
            upper: Some(upper),
        }
    }

    pub const fn open(label: &'static str) -> Self {
        Bucket { label, upper: None }
    }
}

/// Electric-range buckets, in miles.
pub const RANGE_BUCKETS: [Bucket; 8] = [
    Bucket::upto("0-50", 50.0),
    Bucket::upto("51-100", 100.0),
    Bucket::upto("101-150", 150.0),
    Bucket::upto("151-200", 200.0),
    Bucket::upto("201-250", 250.0),
    Bucket::upto("251-300", 300.0),
    Bucket::upto("301-350", 350.0),
    Bucket::open("351+"),
];

/// Index of the bucket `value` falls in.
pub fn bucket_index(buckets: &[Bucket], value: f64) -> usize {
    buckets
        .iter()
        .position(|b| b.upper.map_or(true, |upper| value <= upper))
        .unwrap_or(buckets.len().saturating_sub(1))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub labels: Vec<&'static str>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Number of values that were bucketed.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Count records per bucket. Records without a value are left out of
/// every bucket; empty buckets are still reported.
pub fn histogram<M>(records: &[VehicleRecord], buckets: &[Bucket], metric: M) -> Histogram
where
    M: Fn(&VehicleRecord) -> Option<f64>,
{
    let mut counts = vec![0usize; buckets.len()];
    if !buckets.is_empty() {
        for value in records.iter().filter_map(&metric) {
            counts[bucket_index(buckets, value)] += 1;
        }
    }
    Histogram {
        labels: buckets.iter().map(|b| b.label).collect(),
        counts,
    }
}
