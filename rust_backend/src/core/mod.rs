//! Core domain models for the dealer dashboard.
//!
//! Defines the record snapshots fed into aggregations and the bucket types
//! the aggregations produce.

pub mod domain;

pub use domain::{
    AgeBucketCount, AgeRange, BucketSpan, CategoryShare, DateField, LevelSeries, PartitionError,
    TimeBucket, TimestampedRecord, WeekBucket,
};
