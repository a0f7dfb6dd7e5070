pub mod closure_aggregator;
