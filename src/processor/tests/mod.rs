//! Integration tests for the processor module
//!
//! Tests the complete merge pipeline on temporary station data trees.
