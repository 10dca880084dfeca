#![deny(missing_docs)]
#![doc = "Interactive measurement protocol: queryable sessions, tree-linked privacy accounting, and composition strategies."]

mod compose;
mod measurement;
mod query;
mod queryable;

pub use compose::{
    make_concurrent_filter, make_concurrent_odometer, make_odometer_to_filter,
    make_sequential_filter,
};
pub use measurement::{InteractiveMeasurement, Measurement, Odometer};
pub use query::{Answer, DescendantChange, Query, Spec};
pub use queryable::Queryable;
