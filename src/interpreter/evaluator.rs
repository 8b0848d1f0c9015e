/// Interpreter state and dispatch.
///
/// Declares the `Interpreter` struct, the expression/statement dispatch, the
/// scoped block-execution contract and the collection cadence.
pub mod core;
/// Binary operators, numeric promotion and operator-overload dispatch.
pub mod binary;
/// Unary operators.
pub mod unary;
/// Calls, user functions, method binding, class instantiation and member
/// access.
pub mod call;
/// Indexing, slicing and assignment targets.
pub mod indexing;
/// Statement execution: declarations, control flow, exceptions and module
/// statements.
pub mod statement;
