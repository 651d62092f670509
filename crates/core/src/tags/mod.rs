//! Virtual tag balances: budgeting sub-allocations of account funds.

pub mod allocator;
pub mod rules;
pub mod types;

pub use allocator::{TagBalanceAllocator, TagBalanceStore};
pub use rules::{RemovalPlan, plan_assign, plan_remove, summarize};
pub use types::{
    AllocationResult, Tag, TagBalance, TagBalanceValidation, TagOperation, TagOperationKind,
};
