/// Safe numeric conversion helpers.
///
/// Index normalisation and checked integer conversions used by the
/// evaluator's indexing, slicing and builtin code paths.
pub mod num;
